use mkopo_core::{normalize_msisdn, LoanOption, Msisdn, UserData};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{PaymentError, PaymentResult};
use crate::provider::{StkPushProvider, StkPushRequest};

/// Result of a fee request the gateway accepted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentOutcome {
    pub loan: LoanOption,
    pub transaction_id: String,
    pub msisdn: Msisdn,
    pub reference: String,
}

/// Merchant reference sent with every push: `LOAN-<epoch ms>-<id>-<amount>`.
pub fn build_reference(id_number: &str, amount: u32, timestamp_ms: i64) -> String {
    format!("LOAN-{timestamp_ms}-{id_number}-{amount}")
}

/// Turns a loan selection into a single STK push for its transaction fee.
#[derive(Clone)]
pub struct PaymentService {
    provider: Arc<dyn StkPushProvider>,
}

impl PaymentService {
    pub fn new(provider: Arc<dyn StkPushProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    pub async fn initiate(
        &self,
        user: &UserData,
        selected: Option<LoanOption>,
    ) -> PaymentResult<PaymentOutcome> {
        let loan = selected.ok_or(PaymentError::NoLoanSelected)?;
        let msisdn = normalize_msisdn(&user.phone_number)?;
        let reference = build_reference(
            &user.id_number,
            loan.amount,
            chrono::Utc::now().timestamp_millis(),
        );

        let request = StkPushRequest {
            msisdn: msisdn.clone(),
            amount: loan.fee,
            reference: reference.clone(),
        };

        info!(
            provider = self.provider.provider_name(),
            loan_amount = loan.amount,
            fee = loan.fee,
            %reference,
            "requesting transaction fee"
        );

        let receipt = self.provider.initiate(&request).await.map_err(|e| {
            warn!(error = %e, %reference, "fee request failed");
            e
        })?;

        Ok(PaymentOutcome {
            loan,
            transaction_id: receipt.transaction_id,
            msisdn,
            reference,
        })
    }
}
