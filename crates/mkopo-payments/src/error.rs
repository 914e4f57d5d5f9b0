use mkopo_core::PhoneError;
use thiserror::Error;

/// Failures of the fee payment request. The display text is what the
/// applicant sees under "Payment failed".
#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Please select a loan amount")]
    NoLoanSelected,

    #[error(transparent)]
    InvalidPhone(#[from] PhoneError),

    #[error("HTTP error! status: {0}")]
    HttpStatus(u16),

    #[error("Request timed out. Please check your connection.")]
    Timeout,

    #[error("Network error. Please check your internet connection.")]
    Network(String),

    #[error("Failed to parse gateway response: {0}")]
    InvalidResponse(String),

    /// The gateway answered but did not accept the request.
    #[error("{0}")]
    Rejected(String),

    #[error("Gateway configuration error: {0}")]
    Configuration(String),
}

impl PaymentError {
    /// Errors raised before anything was sent to the gateway.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            PaymentError::NoLoanSelected
                | PaymentError::InvalidPhone(_)
                | PaymentError::Configuration(_)
        )
    }
}

pub type PaymentResult<T> = Result<T, PaymentError>;
