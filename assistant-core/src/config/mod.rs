use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{info, warn};

use crate::error::AppError;
use crate::gateway::FallbackMode;

/// Global configuration instance
static CONFIG: OnceCell<RwLock<AppConfig>> = OnceCell::new();

const APP_DIR: &str = "email-assistant";
const API_URL_ENV: &str = "EMAIL_ASSISTANT_API_URL";
const API_MODE_ENV: &str = "EMAIL_ASSISTANT_API_MODE";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub credentials: CredentialsConfig,
}

/// Remote service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL the endpoint paths are appended to
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Whether transport failures are masked with fallback payloads
    #[serde(default)]
    pub mode: FallbackMode,
}

/// Credential storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Keyring service name the bearer token is stored under
    #[serde(default = "default_service")]
    pub service: String,
}

fn default_base_url() -> String {
    if cfg!(debug_assertions) {
        "http://localhost:8081".to_string()
    } else {
        "https://your-production-api.com".to_string()
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_service() -> String {
    APP_DIR.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            mode: FallbackMode::default(),
        }
    }
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            service: default_service(),
        }
    }
}

impl AppConfig {
    /// Apply environment overrides on top of file values
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api.base_url = url;
            }
        }
        if let Ok(mode) = std::env::var(API_MODE_ENV) {
            match mode.parse::<FallbackMode>() {
                Ok(m) => self.api.mode = m,
                Err(e) => warn!("Ignoring {}: {}", API_MODE_ENV, e),
            }
        }
        self
    }
}

/// Get default config paths
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join(APP_DIR).join("config.toml"));
    }

    if let Some(home_dir) = dirs::home_dir() {
        paths.push(home_dir.join(".config").join(APP_DIR).join("config.toml"));
    }

    paths
}

/// Initialize configuration from default paths
pub fn init_config() -> Result<(), AppError> {
    info!("Initializing configuration from default paths");

    for path in default_config_paths() {
        if path.exists() {
            info!("Found config at: {:?}", path);
            return init_config_from_path(&path);
        }
    }

    info!("No config file found, using defaults");
    set_config(AppConfig::default().with_env_overrides())
}

/// Initialize configuration from a specific path
pub fn init_config_from_path(path: &Path) -> Result<(), AppError> {
    let config = load_config(path)?;
    set_config(config.with_env_overrides())
}

/// Read and parse a config file without touching the global instance
pub fn load_config(path: &Path) -> Result<AppConfig, AppError> {
    info!("Loading configuration from: {:?}", path);

    let content = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("Failed to read config: {}", e)))?;

    toml::from_str(&content).map_err(|e| AppError::Config(format!("Failed to parse config: {}", e)))
}

/// Current configuration, or defaults when none was initialized
pub fn get_config() -> Result<AppConfig, AppError> {
    match CONFIG.get() {
        Some(lock) => lock
            .read()
            .map(|c| c.clone())
            .map_err(|e| AppError::Config(format!("Failed to lock config: {}", e))),
        None => Ok(AppConfig::default().with_env_overrides()),
    }
}

fn set_config(config: AppConfig) -> Result<(), AppError> {
    match CONFIG.get() {
        Some(lock) => {
            let mut guard = lock
                .write()
                .map_err(|e| AppError::Config(format!("Failed to lock config: {}", e)))?;
            *guard = config;
        }
        None => {
            CONFIG.set(RwLock::new(config)).ok();
        }
    }
    Ok(())
}

/// Check if configuration is initialized
pub fn is_initialized() -> bool {
    CONFIG.get().is_some()
}
