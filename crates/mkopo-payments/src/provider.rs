use async_trait::async_trait;
use mkopo_core::Msisdn;
use serde::{Deserialize, Serialize};

use crate::error::PaymentResult;

/// One M-Pesa STK push: prompt `msisdn` to pay `amount` shillings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StkPushRequest {
    pub msisdn: Msisdn,
    /// Whole shillings; for loan applications this is the transaction fee.
    pub amount: u32,
    /// Merchant reference echoed back by the gateway.
    pub reference: String,
}

/// Gateway acknowledgement that the prompt was sent. It does not mean the
/// customer has paid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StkPushReceipt {
    /// Gateway request id; empty when the response carried none.
    pub transaction_id: String,
    /// Response body as returned by the gateway
    pub raw: serde_json::Value,
}

/// Main trait for STK push gateways
#[async_trait]
pub trait StkPushProvider: Send + Sync {
    /// Send the push request. Called at most once per user action.
    async fn initiate(&self, request: &StkPushRequest) -> PaymentResult<StkPushReceipt>;

    /// Get the name of this provider
    fn provider_name(&self) -> &str;
}
