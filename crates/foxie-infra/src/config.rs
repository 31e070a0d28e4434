//! Configuration loader for Foxie.
//!
//! Reads `foxie.toml` from the data directory (`~/.foxie/` by default) and
//! deserializes it into [`AppConfig`]. Falls back to sensible defaults when
//! the file is missing or malformed. Credentials never live in the file:
//! they are read from the environment into [`Secrets`].

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use foxie_types::config::{AppConfig, Environment};

use crate::storage::cloudinary::CloudinaryCredentials;

/// File name of the configuration file inside the data directory.
pub const CONFIG_FILE: &str = "foxie.toml";

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "FOXIE_DATA_DIR";

/// Environment variable overriding `environment` from the file.
pub const ENVIRONMENT_ENV: &str = "FOXIE_ENV";

/// Resolve the data directory: `FOXIE_DATA_DIR`, else `~/.foxie`, else `./.foxie`.
pub fn resolve_data_dir() -> PathBuf {
    data_dir_from(std::env::var(DATA_DIR_ENV).ok(), dirs::home_dir())
}

fn data_dir_from(explicit: Option<String>, home: Option<PathBuf>) -> PathBuf {
    match explicit.filter(|dir| !dir.trim().is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => home.unwrap_or_else(|| PathBuf::from(".")).join(".foxie"),
    }
}

/// Load configuration from `{data_dir}/foxie.toml`.
///
/// - If the file does not exist, returns [`AppConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - `FOXIE_ENV=production` forces the production environment either way.
pub async fn load_app_config(data_dir: &Path) -> AppConfig {
    let mut config = read_config_file(data_dir).await;
    if let Some(environment) = std::env::var(ENVIRONMENT_ENV)
        .ok()
        .and_then(|v| parse_environment(&v))
    {
        config.environment = environment;
    }
    config
}

async fn read_config_file(data_dir: &Path) -> AppConfig {
    let config_path = data_dir.join(CONFIG_FILE);

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No {CONFIG_FILE} found at {}, using defaults", config_path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            AppConfig::default()
        }
    }
}

fn parse_environment(value: &str) -> Option<Environment> {
    match value.trim().to_lowercase().as_str() {
        "production" | "prod" => Some(Environment::Production),
        "development" | "dev" => Some(Environment::Development),
        _ => None,
    }
}

/// Credentials for the external services, read from the environment.
pub struct Secrets {
    pub openai_api_key: Option<SecretString>,
    pub cloudinary: Option<CloudinaryCredentials>,
}

impl Secrets {
    /// Read `OPENAI_API_KEY` and the three `CLOUDINARY_*` variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Cloudinary credentials are only usable when all three parts are set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let cloudinary = match (
            get("CLOUDINARY_CLOUD_NAME"),
            get("CLOUDINARY_API_KEY"),
            get("CLOUDINARY_API_SECRET"),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(CloudinaryCredentials {
                cloud_name,
                api_key: SecretString::from(api_key),
                api_secret: SecretString::from(api_secret),
            }),
            _ => None,
        };

        Self {
            openai_api_key: get("OPENAI_API_KEY").map(SecretString::from),
            cloudinary,
        }
    }
}
