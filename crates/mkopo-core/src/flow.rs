use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::types::{LoanOption, Step, UserData};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error("Cannot {action} while on the {from} step")]
    InvalidTransition { from: Step, action: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FlowState {
    Check,
    Select {
        user: UserData,
    },
    GetCash {
        user: UserData,
        loan: LoanOption,
        transaction_id: String,
    },
}

/// In-memory application flow: which screen is showing and what has been
/// collected so far. The records a screen needs are always present when that
/// screen is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanFlow {
    state: FlowState,
}

impl Default for LoanFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl LoanFlow {
    pub fn new() -> Self {
        Self {
            state: FlowState::Check,
        }
    }

    pub fn step(&self) -> Step {
        match self.state {
            FlowState::Check => Step::Check,
            FlowState::Select { .. } => Step::Select,
            FlowState::GetCash { .. } => Step::GetCash,
        }
    }

    pub fn user_data(&self) -> Option<&UserData> {
        match &self.state {
            FlowState::Check => None,
            FlowState::Select { user } | FlowState::GetCash { user, .. } => Some(user),
        }
    }

    pub fn selected_loan(&self) -> Option<LoanOption> {
        match &self.state {
            FlowState::GetCash { loan, .. } => Some(*loan),
            _ => None,
        }
    }

    /// Gateway reference for the fee request; empty when the gateway did not
    /// return one.
    pub fn transaction_id(&self) -> Option<&str> {
        match &self.state {
            FlowState::GetCash { transaction_id, .. } => Some(transaction_id),
            _ => None,
        }
    }

    pub fn submit_eligibility(&mut self, user: UserData) -> Result<(), FlowError> {
        if self.state != FlowState::Check {
            return Err(FlowError::InvalidTransition {
                from: self.step(),
                action: "submit the eligibility form",
            });
        }
        info!(loan_type = %user.loan_type, "eligibility confirmed");
        self.state = FlowState::Select { user };
        Ok(())
    }

    pub fn payment_initiated(
        &mut self,
        loan: LoanOption,
        transaction_id: impl Into<String>,
    ) -> Result<(), FlowError> {
        match std::mem::replace(&mut self.state, FlowState::Check) {
            FlowState::Select { user } => {
                let transaction_id = transaction_id.into();
                info!(
                    amount = loan.amount,
                    fee = loan.fee,
                    transaction_id = %transaction_id,
                    "payment initiated"
                );
                self.state = FlowState::GetCash {
                    user,
                    loan,
                    transaction_id,
                };
                Ok(())
            }
            other => {
                self.state = other;
                Err(FlowError::InvalidTransition {
                    from: self.step(),
                    action: "confirm a payment",
                })
            }
        }
    }

    pub fn start_over(&mut self) {
        debug!(from = ?self.step(), "flow reset");
        self.state = FlowState::Check;
    }

    pub fn step_indicator(&self) -> Vec<StepIndicatorEntry> {
        step_indicator(self.step())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Completed,
    Active,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepIndicatorEntry {
    pub step: Step,
    pub status: StepStatus,
    /// Labels of the current and earlier steps are highlighted.
    pub highlighted: bool,
    /// State of the connector drawn after this step; `None` for the last one.
    pub connector_filled: Option<bool>,
}

pub fn step_indicator(current: Step) -> Vec<StepIndicatorEntry> {
    let last = Step::ALL.len() - 1;
    Step::ALL
        .iter()
        .enumerate()
        .map(|(i, &step)| {
            let status = if current > step {
                StepStatus::Completed
            } else if current == step {
                StepStatus::Active
            } else {
                StepStatus::Pending
            };
            StepIndicatorEntry {
                step,
                status,
                highlighted: current >= step,
                connector_filled: (i < last).then_some(current > step),
            }
        })
        .collect()
}
