use mkopo_core::config_manager::SUPPORTED_PROVIDERS;
use mkopo_core::GatewayConfig;
use std::sync::Arc;

use crate::error::{PaymentError, PaymentResult};
use crate::megapay::{MegaPayConfig, MegaPayProvider};
use crate::provider::StkPushProvider;
use crate::simulated::SimulatedProvider;

/// Factory for creating STK push providers based on configuration
pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider from the gateway section of the configuration
    pub fn create_from_config(config: &GatewayConfig) -> PaymentResult<Arc<dyn StkPushProvider>> {
        let provider_name = config.provider.to_lowercase();

        match provider_name.as_str() {
            "megapay" => Self::create_megapay_provider(config),
            "simulated" => Ok(Arc::new(SimulatedProvider::with_latency(
                std::time::Duration::from_millis(800),
            ))),
            _ => Err(PaymentError::Configuration(format!(
                "Unsupported gateway provider: {}. Available providers: {}",
                provider_name,
                Self::supported_providers().join(", ")
            ))),
        }
    }

    fn create_megapay_provider(config: &GatewayConfig) -> PaymentResult<Arc<dyn StkPushProvider>> {
        let api_key = config.api_key.as_ref().ok_or_else(|| {
            PaymentError::Configuration(
                "MegaPay API key not found. Set 'gateway.api_key' in config \
                 or MKOPO_MEGAPAY_API_KEY environment variable"
                    .to_string(),
            )
        })?;
        let email = config.email.clone().ok_or_else(|| {
            PaymentError::Configuration(
                "MegaPay merchant email not found. Set 'gateway.email' in config \
                 or MKOPO_MEGAPAY_EMAIL environment variable"
                    .to_string(),
            )
        })?;

        let megapay_config = MegaPayConfig {
            base_url: config.base_url.clone(),
            api_key: api_key.clone(),
            email,
            timeout: config.timeout(),
        };

        Ok(Arc::new(MegaPayProvider::new(megapay_config)?))
    }

    /// Get a list of supported providers
    pub fn supported_providers() -> Vec<&'static str> {
        SUPPORTED_PROVIDERS.to_vec()
    }
}
