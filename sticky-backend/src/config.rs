use std::env;
use std::path::{Path, PathBuf};

/// Environment variable names - single source of truth
pub mod env_vars {
    pub const PORT: &str = "PORT";
    pub const BIND_ADDRESS: &str = "BIND_ADDRESS";
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// Directory with the built browser front end (index.html, app.js, ...).
    pub const PUBLIC_DIR: &str = "STICKY_PUBLIC_DIR";
}

/// Default values
pub mod defaults {
    pub const PORT: u16 = 3000;
    pub const BIND_ADDRESS: &str = "0.0.0.0";
    pub const DATABASE_URL: &str = "./.db/sticky.db";
    pub const PUBLIC_DIR: &str = "public";
}

/// Returns the absolute path to the sticky-backend directory.
/// Uses CARGO_MANIFEST_DIR at compile time, so it always resolves
/// to sticky-backend/ regardless of the working directory at runtime.
pub fn backend_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub bind_address: String,
    pub database_url: String,
    /// Static front end to serve at `/`, if the directory exists.
    pub public_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        let port = match env::var(env_vars::PORT) {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                log::warn!("Invalid {} '{}', using {}", env_vars::PORT, raw, defaults::PORT);
                defaults::PORT
            }),
            Err(_) => defaults::PORT,
        };

        let public_dir = env::var(env_vars::PUBLIC_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| backend_dir().join(defaults::PUBLIC_DIR));

        Self {
            port,
            bind_address: env::var(env_vars::BIND_ADDRESS)
                .unwrap_or_else(|_| defaults::BIND_ADDRESS.to_string()),
            database_url: env::var(env_vars::DATABASE_URL)
                .unwrap_or_else(|_| defaults::DATABASE_URL.to_string()),
            public_dir: existing_dir(&public_dir),
        }
    }
}

fn existing_dir(path: &Path) -> Option<PathBuf> {
    path.is_dir().then(|| path.to_path_buf())
}
