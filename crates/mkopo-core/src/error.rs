use thiserror::Error;

use crate::config_manager::ConfigError;
use crate::flow::FlowError;
use crate::phone::PhoneError;
use crate::validation::FormErrors;

#[derive(Error, Debug)]
pub enum MkopoError {
    #[error(transparent)]
    Validation(#[from] FormErrors),

    #[error(transparent)]
    Phone(#[from] PhoneError),

    #[error(transparent)]
    Flow(#[from] FlowError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Unknown loan amount: Ksh {0}")]
    UnknownLoanAmount(u32),

    #[error("Ksh {amount} is outside the offered range of Ksh {min} to Ksh {max}")]
    AmountOutOfRange { amount: u32, min: u32, max: u32 },
}

pub type Result<T> = std::result::Result<T, MkopoError>;
