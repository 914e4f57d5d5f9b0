use async_trait::async_trait;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::error::PaymentResult;
use crate::provider::{StkPushProvider, StkPushReceipt, StkPushRequest};

/// Offline provider that accepts every request without contacting a gateway.
/// Used for demos and `--dry-run`.
#[derive(Debug, Clone, Default)]
pub struct SimulatedProvider {
    latency: Duration,
}

impl SimulatedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pause before answering, so spinners have something to show.
    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl StkPushProvider for SimulatedProvider {
    async fn initiate(&self, request: &StkPushRequest) -> PaymentResult<StkPushReceipt> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let transaction_id = format!("SIM-{}", Uuid::new_v4().simple());
        info!(
            msisdn = %request.msisdn,
            amount = request.amount,
            reference = %request.reference,
            %transaction_id,
            "simulated STK push accepted"
        );

        Ok(StkPushReceipt {
            raw: serde_json::json!({
                "success": true,
                "message": "Simulated STK push accepted",
                "transaction_request_id": transaction_id,
            }),
            transaction_id,
        })
    }

    fn provider_name(&self) -> &str {
        "simulated"
    }
}
