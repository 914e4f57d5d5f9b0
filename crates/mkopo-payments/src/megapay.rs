use async_trait::async_trait;
use reqwest::{header, Client};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{PaymentError, PaymentResult};
use crate::provider::{StkPushProvider, StkPushReceipt, StkPushRequest};
use crate::response::{classify, Classification};

const MEGAPAY_API_BASE: &str = "https://megapay.co.ke/backend/v1";
const INITIATE_PATH: &str = "initiatestk";

/// Configuration for the MegaPay provider
#[derive(Debug, Clone)]
pub struct MegaPayConfig {
    /// API base, without the trailing `/initiatestk`
    pub base_url: String,
    /// Merchant API key
    pub api_key: SecretString,
    /// Merchant account email
    pub email: String,
    /// Client-side bound on the whole request
    pub timeout: Duration,
}

impl MegaPayConfig {
    pub fn new(api_key: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            base_url: MEGAPAY_API_BASE.to_string(),
            api_key: SecretString::from(api_key.into()),
            email: email.into(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// MegaPay STK push provider
pub struct MegaPayProvider {
    config: MegaPayConfig,
    endpoint: String,
    client: Client,
}

impl MegaPayProvider {
    pub fn new(config: MegaPayConfig) -> PaymentResult<Self> {
        if config.api_key.expose_secret().trim().is_empty() {
            return Err(PaymentError::Configuration(
                "MegaPay API key is required. Set MKOPO_MEGAPAY_API_KEY.".to_string(),
            ));
        }
        if config.email.trim().is_empty() {
            return Err(PaymentError::Configuration(
                "MegaPay merchant email is required. Set MKOPO_MEGAPAY_EMAIL.".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaymentError::Configuration(format!("Failed to create HTTP client: {e}")))?;

        let endpoint = format!("{}/{}", config.base_url.trim_end_matches('/'), INITIATE_PATH);

        Ok(Self {
            config,
            endpoint,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn transport_error(err: reqwest::Error) -> PaymentError {
    if err.is_timeout() {
        PaymentError::Timeout
    } else {
        PaymentError::Network(err.to_string())
    }
}

#[async_trait]
impl StkPushProvider for MegaPayProvider {
    async fn initiate(&self, request: &StkPushRequest) -> PaymentResult<StkPushReceipt> {
        let payload = InitiateStkRequest {
            api_key: self.config.api_key.expose_secret(),
            email: &self.config.email,
            amount: request.amount.to_string(),
            msisdn: request.msisdn.as_str(),
            reference: &request.reference,
        };

        info!(
            endpoint = %self.endpoint,
            msisdn = %request.msisdn,
            amount = request.amount,
            reference = %request.reference,
            "initiating MegaPay STK push"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(header::ACCEPT, "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "MegaPay rejected the request");
            return Err(PaymentError::HttpStatus(status.as_u16()));
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                PaymentError::Timeout
            } else {
                PaymentError::InvalidResponse(e.to_string())
            }
        })?;
        debug!(response = %body, "MegaPay response");

        match classify(&body) {
            Classification::Accepted { transaction_id } => Ok(StkPushReceipt {
                transaction_id,
                raw: body,
            }),
            Classification::Rejected { message } => {
                warn!(%message, "MegaPay declined the STK push");
                Err(PaymentError::Rejected(message))
            }
        }
    }

    fn provider_name(&self) -> &str {
        "megapay"
    }
}

// MegaPay API request types

#[derive(Debug, Serialize)]
struct InitiateStkRequest<'a> {
    api_key: &'a str,
    email: &'a str,
    /// MegaPay expects the amount as a string
    amount: String,
    msisdn: &'a str,
    reference: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_creation_requires_api_key() {
        let config = MegaPayConfig::new("", "merchant@example.co.ke");
        assert!(matches!(
            MegaPayProvider::new(config),
            Err(PaymentError::Configuration(_))
        ));
    }

    #[test]
    fn test_provider_creation_requires_email() {
        let config = MegaPayConfig::new("key", " ");
        assert!(MegaPayProvider::new(config).is_err());
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let mut config = MegaPayConfig::new("key", "merchant@example.co.ke");
        assert_eq!(
            MegaPayProvider::new(config.clone()).unwrap().endpoint(),
            "https://megapay.co.ke/backend/v1/initiatestk"
        );

        config.base_url = "http://localhost:8080/v1/".to_string();
        assert_eq!(
            MegaPayProvider::new(config).unwrap().endpoint(),
            "http://localhost:8080/v1/initiatestk"
        );
    }

    #[test]
    fn test_payload_shape() {
        let payload = InitiateStkRequest {
            api_key: "k",
            email: "m@example.co.ke",
            amount: 250.to_string(),
            msisdn: "254712345678",
            reference: "LOAN-1-12345678-7500",
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "api_key": "k",
                "email": "m@example.co.ke",
                "amount": "250",
                "msisdn": "254712345678",
                "reference": "LOAN-1-12345678-7500",
            })
        );
    }
}
