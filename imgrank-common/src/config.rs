//! Configuration loading and settings resolution
//!
//! Each setting is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Levels 1 and 2 arrive together as [`Overrides`] (the binary fills them
//! from clap, which reads both the argument and its environment variable).

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default folder holding the images to rank
pub const DEFAULT_IMAGE_FOLDER: &str = "./extracted_images/Images";
/// Default SQLite database file
pub const DEFAULT_DATABASE: &str = "ranking.db";
/// Default listen host
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default listen port
pub const DEFAULT_PORT: u16 = 5000;

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct TomlConfig {
    pub image_folder: Option<PathBuf>,
    pub database: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub image_folder: Option<PathBuf>,
    pub database: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Fully resolved runtime settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub image_folder: PathBuf,
    pub database: PathBuf,
    pub host: String,
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            image_folder: PathBuf::from(DEFAULT_IMAGE_FOLDER),
            database: PathBuf::from(DEFAULT_DATABASE),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Settings {
    /// Merge overrides over the config file over compiled defaults
    pub fn resolve(overrides: Overrides, file: TomlConfig) -> Self {
        let defaults = Settings::default();
        Self {
            image_folder: overrides
                .image_folder
                .or(file.image_folder)
                .unwrap_or(defaults.image_folder),
            database: overrides
                .database
                .or(file.database)
                .unwrap_or(defaults.database),
            host: overrides.host.or(file.host).unwrap_or(defaults.host),
            port: overrides.port.or(file.port).unwrap_or(defaults.port),
        }
    }

    /// `host:port` string suitable for `TcpListener::bind`
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Load the TOML config file
///
/// An explicitly requested file must exist and parse. Without one, the
/// platform locations are tried and a missing file falls back to an empty
/// config so startup can continue on defaults.
pub fn load_config_file(explicit: Option<&Path>) -> Result<TomlConfig> {
    if let Some(path) = explicit {
        return parse_config_file(path);
    }

    match default_config_path() {
        Some(path) => {
            info!("Loading config file: {}", path.display());
            parse_config_file(&path)
        }
        None => {
            warn!("No config file found, using defaults");
            Ok(TomlConfig::default())
        }
    }
}

fn parse_config_file(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read {}: {}", path.display(), e))
    })?;
    parse_config_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Parse config file contents
pub fn parse_config_str(content: &str) -> std::result::Result<TomlConfig, toml::de::Error> {
    toml::from_str(content)
}

/// First existing config file among the platform locations
fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("imgrank").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/imgrank/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}
