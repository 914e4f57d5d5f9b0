use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Failed to read config: {0}")]
    ReadError(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub const SUPPORTED_PROVIDERS: [&str; 2] = ["megapay", "simulated"];

/// Main configuration for Mkopo
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MkopoConfig {
    /// Payment gateway used for the STK push
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Eligibility screen behaviour
    #[serde(default)]
    pub eligibility: EligibilityConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Payment gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Provider: "megapay" or "simulated"
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Base URL of the MegaPay API; `/initiatestk` is appended
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Merchant API key. Never written back to disk.
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// Merchant account email registered with MegaPay
    #[serde(default)]
    pub email: Option<String>,

    /// Client-side timeout for the STK push request (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: default_base_url(),
            api_key: None,
            email: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl GatewayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityConfig {
    /// Pause shown as "Verifying your details..." before the selection screen (ms)
    #[serde(default = "default_verification_delay_ms")]
    pub verification_delay_ms: u64,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            verification_delay_ms: default_verification_delay_ms(),
        }
    }
}

impl EligibilityConfig {
    pub fn verification_delay(&self) -> Duration {
        Duration::from_millis(self.verification_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "pretty", "json", "compact"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_provider() -> String {
    "megapay".to_string()
}
fn default_base_url() -> String {
    "https://megapay.co.ke/backend/v1".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_verification_delay_ms() -> u64 {
    2500
}
fn default_log_level() -> String {
    "warn".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

impl MkopoConfig {
    /// Reject values the rest of the application cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let provider = self.gateway.provider.to_lowercase();
        if !SUPPORTED_PROVIDERS.contains(&provider.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid gateway provider: {}. Must be one of: {}",
                self.gateway.provider,
                SUPPORTED_PROVIDERS.join(", ")
            )));
        }

        if self.gateway.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "gateway.timeout_secs must be > 0".to_string(),
            ));
        }

        if provider == "megapay" && self.gateway.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "gateway.base_url cannot be empty".to_string(),
            ));
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    other
                )))
            }
        }

        match self.logging.format.as_str() {
            "pretty" | "json" | "compact" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log format: {}. Must be one of: pretty, json, compact",
                    other
                )))
            }
        }

        Ok(())
    }
}

/// Configuration loader with environment overrides
pub struct ConfigManager {
    config: MkopoConfig,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration with the following precedence:
    /// 1. Environment variables (.env file)
    /// 2. Config file (.mkopo.toml)
    /// 3. Sensible defaults
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_dotenv();

        let (config, config_path) = Self::load_config_file()?;
        Self::finish(config, config_path)
    }

    /// Load a specific config file, still honouring environment overrides.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let config = Self::read_toml_file(path)?;
        Self::finish(config, Some(path.to_path_buf()))
    }

    fn finish(config: MkopoConfig, config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config = Self::apply_env_overrides(config);
        config.validate()?;

        info!(
            config_file = %config_path
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "NONE (using defaults)".to_string()),
            provider = %config.gateway.provider,
            base_url = %config.gateway.base_url,
            api_key_set = config.gateway.api_key.is_some(),
            "configuration loaded"
        );

        Ok(Self {
            config,
            config_path,
        })
    }

    /// Load .env file if it exists
    fn load_dotenv() {
        if Path::new(".env").exists() {
            if let Err(e) = dotenv::from_filename(".env") {
                warn!("Failed to load .env file: {}", e);
            } else {
                info!("Loaded .env file from current directory");
            }
            return;
        }

        if let Some(home) = dirs::home_dir() {
            let home_env = home.join(".mkopo.env");
            if home_env.exists() {
                if let Err(e) = dotenv::from_path(&home_env) {
                    warn!("Failed to load .mkopo.env: {}", e);
                } else {
                    info!("Loaded .mkopo.env from home directory");
                }
            }
        }
    }

    /// Find and load config file
    /// Search order:
    /// 1. ./.mkopo.toml (current directory)
    /// 2. ~/.mkopo/config.toml (user config)
    /// 3. Use defaults
    fn load_config_file() -> Result<(MkopoConfig, Option<PathBuf>), ConfigError> {
        let local_config = Path::new(".mkopo.toml");
        if local_config.exists() {
            let config = Self::read_toml_file(local_config)?;
            return Ok((config, Some(local_config.to_path_buf())));
        }

        if let Some(user_config) = Self::user_config_path() {
            if user_config.exists() {
                let config = Self::read_toml_file(&user_config)?;
                return Ok((config, Some(user_config)));
            }
        }

        info!("No config file found, using defaults");
        Ok((MkopoConfig::default(), None))
    }

    /// `~/.mkopo/config.toml`, if a home directory can be determined
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".mkopo").join("config.toml"))
    }

    fn read_toml_file(path: &Path) -> Result<MkopoConfig, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    fn apply_env_overrides(config: MkopoConfig) -> MkopoConfig {
        Self::apply_overrides_from(config, |key| std::env::var(key).ok())
    }

    fn apply_overrides_from<F>(mut config: MkopoConfig, var: F) -> MkopoConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        // Gateway
        if let Some(provider) = var("MKOPO_GATEWAY_PROVIDER") {
            config.gateway.provider = provider;
        }
        if let Some(url) = var("MKOPO_MEGAPAY_BASE_URL") {
            config.gateway.base_url = url;
        }
        if let Some(key) = var("MKOPO_MEGAPAY_API_KEY") {
            config.gateway.api_key = Some(SecretString::from(key));
        }
        if let Some(email) = var("MKOPO_MEGAPAY_EMAIL") {
            config.gateway.email = Some(email);
        }
        if let Some(timeout) = var("MKOPO_GATEWAY_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(secs) => config.gateway.timeout_secs = secs,
                Err(e) => warn!(
                    "Ignoring MKOPO_GATEWAY_TIMEOUT_SECS={:?}: {}",
                    timeout, e
                ),
            }
        }

        // Eligibility
        if let Some(delay) = var("MKOPO_VERIFICATION_DELAY_MS") {
            match delay.parse::<u64>() {
                Ok(ms) => config.eligibility.verification_delay_ms = ms,
                Err(e) => warn!(
                    "Ignoring MKOPO_VERIFICATION_DELAY_MS={:?}: {}",
                    delay, e
                ),
            }
        }

        // Logging
        if let Some(level) = var("MKOPO_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Some(format) = var("MKOPO_LOG_FORMAT") {
            config.logging.format = format;
        }

        config
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &MkopoConfig {
        &self.config
    }

    /// Get the path to the config file that was loaded, if any
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Create a default config file
    pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        let config = MkopoConfig::default();
        let toml_str =
            toml::to_string_pretty(&config).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::ReadError(e.to_string()))?;
        }

        std::fs::write(path, toml_str).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = MkopoConfig::default();
        assert_eq!(config.gateway.provider, "megapay");
        assert_eq!(config.gateway.base_url, "https://megapay.co.ke/backend/v1");
        assert_eq!(config.gateway.timeout(), Duration::from_secs(30));
        assert_eq!(
            config.eligibility.verification_delay(),
            Duration::from_millis(2500)
        );
        assert!(config.gateway.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let config = MkopoConfig::default();

        let mut bad_provider = config.clone();
        bad_provider.gateway.provider = "paypal".to_string();
        assert!(bad_provider.validate().is_err());

        let mut zero_timeout = config.clone();
        zero_timeout.gateway.timeout_secs = 0;
        assert!(zero_timeout.validate().is_err());

        let mut bad_level = config.clone();
        bad_level.logging.level = "loud".to_string();
        assert!(bad_level.validate().is_err());

        let mut bad_format = config;
        bad_format.logging.format = "xml".to_string();
        assert!(bad_format.validate().is_err());
    }

    #[test]
    fn test_provider_name_is_case_insensitive() {
        let mut config = MkopoConfig::default();
        config.gateway.provider = "Simulated".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let config = ConfigManager::apply_overrides_from(
            MkopoConfig::default(),
            env(&[
                ("MKOPO_GATEWAY_PROVIDER", "simulated"),
                ("MKOPO_MEGAPAY_API_KEY", "key-123"),
                ("MKOPO_MEGAPAY_EMAIL", "ops@example.co.ke"),
                ("MKOPO_GATEWAY_TIMEOUT_SECS", "5"),
                ("MKOPO_VERIFICATION_DELAY_MS", "0"),
                ("MKOPO_LOG_FORMAT", "json"),
            ]),
        );

        assert_eq!(config.gateway.provider, "simulated");
        assert_eq!(
            config.gateway.api_key.as_ref().map(|k| k.expose_secret()),
            Some("key-123")
        );
        assert_eq!(config.gateway.email.as_deref(), Some("ops@example.co.ke"));
        assert_eq!(config.gateway.timeout_secs, 5);
        assert_eq!(config.eligibility.verification_delay_ms, 0);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_unparsable_numbers_are_ignored() {
        let config = ConfigManager::apply_overrides_from(
            MkopoConfig::default(),
            env(&[
                ("MKOPO_GATEWAY_TIMEOUT_SECS", "soon"),
                ("MKOPO_VERIFICATION_DELAY_MS", "-5"),
            ]),
        );
        assert_eq!(config.gateway.timeout_secs, 30);
        assert_eq!(config.eligibility.verification_delay_ms, 2_500);
    }
}
