use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use subsentry_bridge::config::Config;
use tokio::{
    fs::{OpenOptions, create_dir_all, read_to_string},
    io::AsyncWriteExt,
};

/// Environment variable that overrides `api.base_url` when set and non-empty.
pub const API_URL_ENV: &str = "SUBSENTRY_API_URL";

/// Errors that can occur while loading or resolving application configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to determine the user's configuration directory. This usually
    /// occurs when required environment variables are missing (e.g., `$HOME`
    /// on Unix or `%APPDATA%` on Windows).
    #[error("failed to obtain user's directories")]
    DirectoriesNotFound,
    /// An I/O error occurred while reading or writing the configuration file.
    #[error("failed to read config: {0}")]
    IoError(#[from] std::io::Error),
    /// The configuration file contains invalid TOML or does not match the expected structure.
    #[error("failed to deserialize config: {0}")]
    DeserializeError(#[from] toml::de::Error),
    /// Failed to serialize the configuration to TOML (e.g., when saving changes).
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

/// Location of `config.toml` in the platform configuration directory.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    match ProjectDirs::from("dev", "subsentry", "subsentry") {
        Some(dirs) => Ok(dirs.config_dir().join("config.toml")),
        None => Err(ConfigError::DirectoriesNotFound),
    }
}

/// Apply the base URL override. An empty value counts as unset.
pub fn apply_env_override(mut config: Config, api_url: Option<String>) -> Config {
    if let Some(url) = api_url.filter(|url| !url.trim().is_empty()) {
        log::info!("Using API base URL from {API_URL_ENV}: {url}");
        config.api.base_url = url;
    }
    config
}

/// Loads the application configuration from disk and applies environment
/// overrides. Returns the config along with the path it was read from.
pub async fn load_config() -> Result<(Config, PathBuf), ConfigError> {
    let config_path = default_config_path()?;
    let config = load_config_from(&config_path).await?;
    let config = apply_env_override(config, std::env::var(API_URL_ENV).ok());
    Ok((config, config_path))
}

/// Reads `config_path`, writing the defaults there first if it does not exist.
pub async fn load_config_from(config_path: &Path) -> Result<Config, ConfigError> {
    log::info!("Loading configuration from {config_path:?}");
    if config_path.exists() {
        let contents = read_to_string(config_path).await?;
        let config: Config = toml::from_str(&contents)?;
        return Ok(config);
    }

    let config = Config::default();
    if let Some(parent) = config_path.parent() {
        create_dir_all(parent).await?;
    }

    let contents = toml::to_string_pretty(&config)?;
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(config_path)
        .await?;
    file.write_all(contents.as_bytes()).await?;
    file.sync_all().await?;

    Ok(config)
}

/// Saves the configuration to `config_path` as pretty-printed TOML,
/// overwriting any existing file.
pub async fn save_config(config: &Config, config_path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = config_path.parent() {
        create_dir_all(parent).await?;
    }

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(config_path)
        .await?;

    let contents = toml::to_string_pretty(&config)?;
    file.write_all(contents.as_bytes()).await?;
    file.sync_all().await?;

    Ok(())
}
