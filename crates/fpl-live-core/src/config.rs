// Configuration loading and parsing (fpl-live.toml).

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Name of the single configuration file under `config/` and `defaults/`.
pub const CONFIG_FILE: &str = "fpl-live.toml";

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
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub relay: RelayConfig,
    pub upstream: UpstreamConfig,
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Where the relay listens and which route it serves.
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    pub bind: String,
    pub port: u16,
    pub route: String,
}

/// The third-party API the relay forwards to.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL; the requested sub-path is appended verbatim.
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Base URL of the relay, e.g. `http://127.0.0.1:8787`.
    pub relay_url: String,
    pub poll_interval_secs: u64,
    pub search_limit: usize,
    pub photo_base_url: String,
    /// Display names used to fill empty selection slots on first load.
    pub default_players: Vec<String>,
    /// Start the relay inside the dashboard process.
    #[serde(default)]
    pub embedded_relay: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    /// SQLite file holding the persisted selection. When omitted the
    /// platform data directory is used.
    pub db_path: Option<String>,
}

impl Config {
    /// Full URL of the relay route, e.g. `http://127.0.0.1:8787/api/fpl`.
    pub fn relay_endpoint(&self) -> String {
        format!(
            "{}{}",
            self.dashboard.relay_url.trim_end_matches('/'),
            self.relay.route
        )
    }

    /// Resolve the SQLite path, falling back to the per-user data directory.
    pub fn db_path(&self) -> PathBuf {
        if let Some(path) = self.storage.db_path.as_deref().filter(|p| !p.is_empty()) {
            return PathBuf::from(path);
        }
        match directories::ProjectDirs::from("", "", "fpl-live") {
            Some(dirs) => dirs.data_dir().join("fpl-live.db"),
            None => PathBuf::from("fpl-live.db"),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/fpl-live.toml` relative to `base_dir`.
///
/// Does not copy defaults; prefer `load_config()`.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let config = parse_config(&text).map_err(|source| ConfigError::ParseError {
        path: path.clone(),
        source,
    })?;

    validate(&config)?;
    Ok(config)
}

/// Parse a config document without validating it.
pub fn parse_config(text: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(text)
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

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    let mut copied = Vec::new();
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
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
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

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_string(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.relay.port == 0 {
        return Err(invalid("relay.port", "must be greater than 0"));
    }
    if !config.relay.route.starts_with('/') {
        return Err(invalid(
            "relay.route",
            format!("must start with '/', got {:?}", config.relay.route),
        ));
    }

    let urls: &[(&str, &str)] = &[
        ("upstream.base_url", &config.upstream.base_url),
        ("dashboard.relay_url", &config.dashboard.relay_url),
        ("dashboard.photo_base_url", &config.dashboard.photo_base_url),
    ];
    for (name, val) in urls {
        if val.trim().is_empty() {
            return Err(invalid(name, "must not be empty"));
        }
    }

    let positive: &[(&str, u64)] = &[
        ("upstream.timeout_secs", config.upstream.timeout_secs),
        ("dashboard.poll_interval_secs", config.dashboard.poll_interval_secs),
        ("dashboard.search_limit", config.dashboard.search_limit as u64),
    ];
    for (name, val) in positive {
        if *val == 0 {
            return Err(invalid(name, "must be > 0"));
        }
    }

    let defaults = &config.dashboard.default_players;
    if defaults.len() != 2 {
        return Err(invalid(
            "dashboard.default_players",
            format!("must name exactly 2 players, got {}", defaults.len()),
        ));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
