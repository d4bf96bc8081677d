//! Key/value media behind [`LocalNoteStore`](super::LocalNoteStore).

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

pub trait SnapshotBacking: Send + Sync {
    /// `Ok(None)` when nothing was ever written under `key`.
    fn read(&self, key: &str) -> io::Result<Option<String>>;

    /// Replace the whole value stored under `key`.
    fn write(&self, key: &str, value: &str) -> io::Result<()>;
}

/// One `<key>.json` file per key inside `dir`.
pub struct FileBacking {
    dir: PathBuf,
}

impl FileBacking {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl SnapshotBacking for FileBacking {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)
    }
}

/// Process-local backing, used by tests and throwaway boards.
#[derive(Default)]
pub struct MemoryBacking {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBacking {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `key` with a raw value (which need not be valid JSON).
    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.entries.lock().insert(key.to_string(), value.to_string());
        self
    }
}

impl SnapshotBacking for MemoryBacking {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_backing_round_trip() {
        let dir = tempdir().unwrap();
        let backing = FileBacking::new(dir.path().join("nested"));

        assert_eq!(backing.read("notes").unwrap(), None);

        backing.write("notes", "[1]").unwrap();
        backing.write("notes", "[2]").unwrap();

        assert_eq!(backing.read("notes").unwrap().as_deref(), Some("[2]"));
        assert!(dir.path().join("nested/notes.json").exists());
        assert!(!dir.path().join("nested/.notes.json.tmp").exists());
    }

    #[test]
    fn test_memory_backing_keys_are_independent() {
        let backing = MemoryBacking::new().with_entry("a", "1");
        backing.write("b", "2").unwrap();

        assert_eq!(backing.read("a").unwrap().as_deref(), Some("1"));
        assert_eq!(backing.read("b").unwrap().as_deref(), Some("2"));
        assert_eq!(backing.read("c").unwrap(), None);
    }
}
