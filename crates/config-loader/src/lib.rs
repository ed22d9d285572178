use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, instrument};

pub mod env_file;

pub const SCRIPT_PATH_KEY: &str = "script_path";
pub const LOG_DIR_KEY: &str = "log_dir";
pub const DEFAULT_LOG_DIR: &str = "./logs";
pub const DEFAULT_ENV_FILE: &str = ".env";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Required setting SCRIPT_PATH is not set")]
    MissingScriptPath,

    #[error("Setting {key} must not be empty")]
    EmptyValue { key: String },

    #[error("Failed to read env file: {path} - {message}")]
    EnvFileRead { path: String, message: String },

    #[error("Failed to parse env file {path} at line {line}: {message}")]
    EnvFileParse {
        path: String,
        line: usize,
        message: String,
    },

    #[error("Failed to create log directory {path}: {message}")]
    LogDirCreateFailed { path: String, message: String },
}

/// Process-wide settings, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub script_path: PathBuf,
    pub log_dir: PathBuf,
}

impl Settings {
    /// Ensures the log directory exists before the service accepts requests.
    pub fn prepare_log_dir(&self) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.log_dir).map_err(|e| ConfigError::LogDirCreateFailed {
            path: self.log_dir.to_string_lossy().to_string(),
            message: e.to_string(),
        })
    }
}

/// Resolves [`Settings`] from the process environment layered over an
/// optional dotenv file. Keys are matched case-insensitively and the
/// environment wins over the file.
pub struct SettingsLoader {
    env_file: PathBuf,
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsLoader {
    pub fn new() -> Self {
        Self {
            env_file: PathBuf::from(DEFAULT_ENV_FILE),
        }
    }

    pub fn with_env_file<P: Into<PathBuf>>(env_file: P) -> Self {
        Self {
            env_file: env_file.into(),
        }
    }

    pub fn env_file(&self) -> &Path {
        &self.env_file
    }

    #[instrument(skip(self))]
    pub fn load(&self) -> Result<Settings, ConfigError> {
        self.load_from(std::env::vars())
    }

    #[instrument(skip(self, vars))]
    pub fn load_from<I>(&self, vars: I) -> Result<Settings, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut merged: HashMap<String, String> = HashMap::new();

        for (key, value) in env_file::read_env_file(&self.env_file)? {
            merged.insert(key.to_lowercase(), value);
        }
        for (key, value) in vars {
            merged.insert(key.to_lowercase(), value);
        }

        let script_path = match merged.remove(SCRIPT_PATH_KEY) {
            None => return Err(ConfigError::MissingScriptPath),
            Some(v) if v.trim().is_empty() => {
                return Err(ConfigError::EmptyValue {
                    key: "SCRIPT_PATH".to_string(),
                })
            }
            Some(v) => PathBuf::from(v),
        };

        let log_dir = match merged.remove(LOG_DIR_KEY) {
            Some(v) if v.trim().is_empty() => {
                return Err(ConfigError::EmptyValue {
                    key: "LOG_DIR".to_string(),
                })
            }
            Some(v) => PathBuf::from(v),
            None => PathBuf::from(DEFAULT_LOG_DIR),
        };

        debug!(
            "Resolved settings: script_path={:?}, log_dir={:?}",
            script_path, log_dir
        );

        Ok(Settings {
            script_path,
            log_dir,
        })
    }
}
