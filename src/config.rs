use std::env;
use std::str::FromStr;
use log::warn;

/// Longest accepted admin session, one year.
pub const MAX_SESSION_TTL_SECS: i64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    File,
    Postgres,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "file" | "json" => Ok(StorageBackend::File),
            "postgres" | "postgresql" | "db" => Ok(StorageBackend::Postgres),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub storage_backend: StorageBackend,
    pub data_file: String,
    pub database_url: Option<String>,
    pub uploads_dir: String,
    pub public_dir: String,
    pub admin_password: String,
    pub admin_password_hash: Option<String>,
    pub session_secret: String,
    pub session_ttl_secs: i64,
    pub max_upload_bytes: usize,
    pub cookie_secure: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            storage_backend: StorageBackend::File,
            data_file: "./data.json".to_string(),
            database_url: None,
            uploads_dir: "./uploads".to_string(),
            public_dir: "./public".to_string(),
            admin_password: "admin123".to_string(),
            admin_password_hash: None,
            session_secret: "nas-secret-key-123".to_string(),
            session_ttl_secs: 3600,
            max_upload_bytes: 50 * 1024 * 1024,
            cookie_secure: false,
        }
    }
}

impl Config {
    /// Reads the process environment (after `.env` has been loaded by the caller).
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            bind_addr: non_empty("BIND_ADDR").unwrap_or(defaults.bind_addr),
            storage_backend: parsed(&non_empty, "STORAGE_BACKEND", defaults.storage_backend),
            data_file: non_empty("DATA_FILE").unwrap_or(defaults.data_file),
            database_url: non_empty("DATABASE_URL"),
            uploads_dir: non_empty("UPLOADS_DIR").unwrap_or(defaults.uploads_dir),
            public_dir: non_empty("PUBLIC_DIR").unwrap_or(defaults.public_dir),
            admin_password: non_empty("ADMIN_PASSWORD").unwrap_or(defaults.admin_password),
            admin_password_hash: non_empty("ADMIN_PASSWORD_HASH"),
            session_secret: non_empty("SESSION_SECRET").unwrap_or(defaults.session_secret),
            session_ttl_secs: session_ttl(&non_empty, defaults.session_ttl_secs),
            max_upload_bytes: parsed(&non_empty, "MAX_UPLOAD_BYTES", defaults.max_upload_bytes),
            cookie_secure: parsed(&non_empty, "COOKIE_SECURE", defaults.cookie_secure),
        }
    }
}

fn parsed<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid value {:?} for {}", raw, key);
            default
        }),
        None => default,
    }
}

fn session_ttl<F>(lookup: &F, default: i64) -> i64
where
    F: Fn(&str) -> Option<String>,
{
    let ttl = parsed(lookup, "SESSION_TTL_SECS", default);
    if (1..=MAX_SESSION_TTL_SECS).contains(&ttl) {
        ttl
    } else {
        warn!("SESSION_TTL_SECS must be between 1 and {}, using {}", MAX_SESSION_TTL_SECS, default);
        default
    }
}
