pub mod error;
pub mod factory;
pub mod megapay;
pub mod provider;
pub mod response;
pub mod service;
pub mod simulated;

pub use error::{PaymentError, PaymentResult};
pub use factory::ProviderFactory;
pub use megapay::{MegaPayConfig, MegaPayProvider};
pub use provider::*;
pub use service::{build_reference, PaymentOutcome, PaymentService};
pub use simulated::SimulatedProvider;
