// Configuration loading and parsing (club.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::lineup::{CompatibilityRule, Mode};

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
// club.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire club.toml file.
#[derive(Debug, Clone, Deserialize)]
struct ClubFile {
    club: ClubConfig,
    feed: FeedConfig,
    cache: CacheSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClubConfig {
    pub name: String,
    /// Roster size selected on startup when there is no cached board.
    pub default_mode: Mode,
    /// Which players a formation slot admits; see `CompatibilityRule`.
    #[serde(default)]
    pub compatibility: CompatibilityRule,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Local CSV export of the roster sheet.
    #[serde(default)]
    pub players_csv: Option<String>,
    /// Published-sheet JSON row endpoint. Takes precedence over the CSV
    /// when both are set; the CSV then serves as the offline fallback.
    #[serde(default)]
    pub sheet_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct CacheSection {
    db_path: String,
}

/// The assembled runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub club: ClubConfig,
    pub feed: FeedConfig,
    pub db_path: String,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/club.toml` relative to the
/// given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy
/// defaults. Prefer `load_config()` which handles default initialization.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let club_path = base_dir.join("config").join("club.toml");
    let club_text = read_file(&club_path)?;
    let club_file: ClubFile = toml::from_str(&club_text).map_err(|e| ConfigError::ParseError {
        path: club_path.clone(),
        source: e,
    })?;

    let config = Config {
        club: club_file.club,
        feed: club_file.feed,
        db_path: club_file.cache.db_path,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut copied = Vec::new();

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };

        // Skip .example template files
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                // File already exists in config/, skip it
            }
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Convenience wrapper: loads config relative to the current working
/// directory, copying default config files into place first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
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
    if config.club.name.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "club.name".into(),
            message: "must not be empty".into(),
        });
    }

    let has_csv = config
        .feed
        .players_csv
        .as_deref()
        .is_some_and(|p| !p.trim().is_empty());
    let has_url = config
        .feed
        .sheet_url
        .as_deref()
        .is_some_and(|u| !u.trim().is_empty());
    if !has_csv && !has_url {
        return Err(ConfigError::ValidationError {
            field: "feed".into(),
            message: "set feed.players_csv or feed.sheet_url".into(),
        });
    }

    if has_url {
        let url = config.feed.sheet_url.as_deref().unwrap_or_default();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::ValidationError {
                field: "feed.sheet_url".into(),
                message: format!("must be an http(s) URL, got `{url}`"),
            });
        }
    }

    if config.db_path.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "cache.db_path".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
