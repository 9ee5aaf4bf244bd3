// Configuration loading and parsing (config/raffle.toml).

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

use crate::animator::DrawDuration;

/// Shipped default, written to `config/raffle.toml` when that file is missing.
pub const DEFAULT_CONFIG: &str = include_str!("../defaults/raffle.toml");

const CONFIG_FILE: &str = "raffle.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub draw: DrawConfig,
    pub db_path: PathBuf,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DrawConfig {
    pub duration_secs: u32,
    pub draw_interval_ms: u64,
    pub idle_interval_ms: u64,
}

impl DrawConfig {
    pub fn duration(&self) -> DrawDuration {
        DrawDuration::clamped(self.duration_secs)
    }

    pub fn draw_interval(&self) -> Duration {
        Duration::from_millis(self.draw_interval_ms)
    }

    pub fn idle_interval(&self) -> Duration {
        Duration::from_millis(self.idle_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UiConfig {
    pub notice_secs: u64,
    pub placeholder: String,
}

impl UiConfig {
    pub fn notice_duration(&self) -> Duration {
        Duration::from_secs(self.notice_secs)
    }
}

// ---------------------------------------------------------------------------
// raffle.toml
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ConfigFile {
    draw: DrawConfig,
    #[serde(default)]
    database: DatabaseSection,
    ui: UiConfig,
}

#[derive(Debug, Default, Deserialize)]
struct DatabaseSection {
    path: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load `config/raffle.toml` relative to `base_dir` without creating it.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let file: ConfigFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    let db_path = match file.database.path {
        Some(path) => path,
        None => default_db_path()?,
    };

    let config = Config {
        draw: file.draw,
        db_path,
        ui: file.ui,
    };

    validate(&config)?;

    Ok(config)
}

/// Write the shipped default to `config/raffle.toml` under `base_dir` if no
/// file exists there yet. Returns the path written, if any.
pub fn ensure_config_files(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let config_dir = base_dir.join("config");
    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let target = config_dir.join(CONFIG_FILE);
    match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
    {
        Ok(mut dest) => {
            std::io::Write::write_all(&mut dest, DEFAULT_CONFIG.as_bytes()).map_err(|e| {
                ConfigError::DefaultsCopyError {
                    message: format!("failed to write {}: {e}", target.display()),
                }
            })?;
            Ok(Some(target))
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(None),
        Err(e) => Err(ConfigError::DefaultsCopyError {
            message: format!("failed to create {}: {e}", target.display()),
        }),
    }
}

/// Convenience wrapper: loads config relative to the current working directory,
/// writing the default file first if needed.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

/// `raffle.db` in the platform data directory.
pub fn default_db_path() -> Result<PathBuf, ConfigError> {
    let dirs = ProjectDirs::from("", "", "raffle").ok_or_else(|| ConfigError::ValidationError {
        field: "database.path".into(),
        message: "no home directory found; set a path explicitly".into(),
    })?;
    Ok(dirs.data_dir().join("raffle.db"))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let secs = config.draw.duration_secs;
    if !(DrawDuration::MIN..=DrawDuration::MAX).contains(&secs) {
        return Err(ConfigError::ValidationError {
            field: "draw.duration_secs".into(),
            message: format!(
                "must be between {} and {} inclusive, got {secs}",
                DrawDuration::MIN,
                DrawDuration::MAX
            ),
        });
    }

    let interval_fields: &[(&str, u64)] = &[
        ("draw.draw_interval_ms", config.draw.draw_interval_ms),
        ("draw.idle_interval_ms", config.draw.idle_interval_ms),
        ("ui.notice_secs", config.ui.notice_secs),
    ];
    for (name, val) in interval_fields {
        if *val == 0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must be > 0".into(),
            });
        }
    }

    if config.db_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "database.path".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
