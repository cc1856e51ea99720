//! Application configuration.
//!
//! # Responsibility
//! - Resolve settings from defaults, an optional JSON file and `TASKBOARD_*` variables.
//! - Normalize values before any component consumes them.
//!
//! # Invariants
//! - Later sources override earlier ones: defaults, file, environment, explicit overrides.
//! - `store_url` never ends with `/`; `log_level` is always a supported level name.

use crate::logging::{default_log_level, normalize_level};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_STORE_URL: &str = "TASKBOARD_STORE_URL";
pub const ENV_CACHE_PATH: &str = "TASKBOARD_CACHE_PATH";
pub const ENV_LOG_LEVEL: &str = "TASKBOARD_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "TASKBOARD_LOG_DIR";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CACHE_FILE: &str = "session.sqlite3";
const DEFAULT_DATA_DIR: &str = ".taskboard";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid configuration: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

/// Resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL of the document store; required for any remote operation.
    pub store_url: Option<String>,
    pub timeout_secs: u64,
    pub cache_path: PathBuf,
    pub log_level: String,
    /// Absolute log directory; `None` logs to stderr.
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    store_url: Option<String>,
    timeout_secs: Option<u64>,
    cache_path: Option<PathBuf>,
    log_level: Option<String>,
    log_dir: Option<PathBuf>,
}

/// Values that win over every other source, e.g. command-line flags.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub store_url: Option<String>,
    pub cache_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            cache_path: default_cache_path(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Resolves configuration from all sources using the process environment.
    pub fn load(file: Option<&Path>, overrides: ConfigOverrides) -> ConfigResult<Self> {
        Self::load_with(file, |key| std::env::var(key).ok(), overrides)
    }

    /// Same as [`AppConfig::load`] with an injectable environment lookup.
    pub fn load_with<F>(
        file: Option<&Path>,
        env: F,
        overrides: ConfigOverrides,
    ) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(path) = file {
            config.apply_file(read_file(path)?);
        }
        config.apply_env(env);
        config.apply_overrides(overrides);
        config.normalize()?;
        Ok(config)
    }

    /// Request timeout for the HTTP store.
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }

    /// Store URL, or an error naming how to provide one.
    pub fn require_store_url(&self) -> ConfigResult<&str> {
        self.store_url.as_deref().ok_or_else(|| {
            ConfigError::Invalid(format!(
                "store URL is not configured; set `store_url`, {ENV_STORE_URL} or --store-url"
            ))
        })
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(value) = file.store_url {
            self.store_url = Some(value);
        }
        if let Some(value) = file.timeout_secs {
            self.timeout_secs = value;
        }
        if let Some(value) = file.cache_path {
            self.cache_path = value;
        }
        if let Some(value) = file.log_level {
            self.log_level = value;
        }
        if let Some(value) = file.log_dir {
            self.log_dir = Some(value);
        }
    }

    fn apply_env<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| env(key).filter(|value| !value.trim().is_empty());
        if let Some(value) = non_blank(ENV_STORE_URL) {
            self.store_url = Some(value);
        }
        if let Some(value) = non_blank(ENV_CACHE_PATH) {
            self.cache_path = PathBuf::from(value);
        }
        if let Some(value) = non_blank(ENV_LOG_LEVEL) {
            self.log_level = value;
        }
        if let Some(value) = non_blank(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(value));
        }
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(value) = overrides.store_url {
            self.store_url = Some(value);
        }
        if let Some(value) = overrides.cache_path {
            self.cache_path = value;
        }
        if let Some(value) = overrides.log_level {
            self.log_level = value;
        }
        if let Some(value) = overrides.log_dir {
            self.log_dir = Some(value);
        }
    }

    fn normalize(&mut self) -> ConfigResult<()> {
        self.store_url = self
            .store_url
            .take()
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        self.log_level = normalize_level(&self.log_level)
            .map_err(ConfigError::Invalid)?
            .to_string();
        if let Some(dir) = self.log_dir.take() {
            self.log_dir = Some(absolutize(dir)?);
        }
        Ok(())
    }
}

fn read_file(path: &Path) -> ConfigResult<FileConfig> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn absolutize(path: PathBuf) -> ConfigResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = std::env::current_dir().map_err(|err| {
        ConfigError::Invalid(format!("cannot resolve `{}`: {err}", path.display()))
    })?;
    Ok(cwd.join(path))
}

fn default_cache_path() -> PathBuf {
    let base = std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    base.join(DEFAULT_DATA_DIR).join(DEFAULT_CACHE_FILE)
}
