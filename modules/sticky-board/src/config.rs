use std::env;
use std::path::PathBuf;

/// Environment variable names - single source of truth
pub mod env_vars {
    /// When set, the board talks to this notes server instead of local storage.
    pub const API_URL: &str = "STICKY_API_URL";
    pub const DATA_DIR: &str = "STICKY_DATA_DIR";
    pub const STORAGE_KEY: &str = "STICKY_STORAGE_KEY";
}

/// Default values
pub mod defaults {
    pub const APP_DIR: &str = "sticky-notes";
    pub const FALLBACK_DATA_DIR: &str = "./.sticky";
    pub const STORAGE_KEY: &str = crate::store::local::DEFAULT_STORAGE_KEY;
}

/// Where the board keeps its notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Remote { api_url: String },
    Local { data_dir: PathBuf, storage_key: String },
}

/// Platform data dir (`~/.local/share/sticky-notes` on Linux), or a dot
/// directory in the working directory when the platform has none.
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(defaults::APP_DIR))
        .unwrap_or_else(|| PathBuf::from(defaults::FALLBACK_DATA_DIR))
}

impl Backend {
    /// Explicit values win over the environment, which wins over defaults.
    pub fn resolve(api_url: Option<String>, data_dir: Option<PathBuf>) -> Self {
        let api_url = api_url
            .or_else(|| env::var(env_vars::API_URL).ok())
            .filter(|u| !u.trim().is_empty());

        if let Some(api_url) = api_url {
            return Backend::Remote { api_url };
        }

        let data_dir = data_dir
            .or_else(|| env::var(env_vars::DATA_DIR).ok().map(PathBuf::from))
            .unwrap_or_else(default_data_dir);
        let storage_key = env::var(env_vars::STORAGE_KEY)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .unwrap_or_else(|| defaults::STORAGE_KEY.to_string());

        Backend::Local { data_dir, storage_key }
    }

    pub fn describe(&self) -> String {
        match self {
            Backend::Remote { api_url } => format!("server at {}", api_url),
            Backend::Local { data_dir, storage_key } => {
                format!("local storage '{}' in {}", storage_key, data_dir.display())
            }
        }
    }
}
