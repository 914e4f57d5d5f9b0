pub mod config_manager;
pub mod error;
pub mod fees;
pub mod flow;
pub mod format;
pub mod phone;
pub mod types;
pub mod validation;

pub use config_manager::{
    ConfigError, ConfigManager, EligibilityConfig, GatewayConfig, LoggingConfig, MkopoConfig,
};
pub use error::*;
pub use fees::*;
pub use flow::*;
pub use format::*;
pub use phone::*;
pub use types::*;
pub use validation::*;
