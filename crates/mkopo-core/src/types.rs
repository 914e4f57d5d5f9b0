use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Repayment term shown on the confirmation screen.
pub const REPAYMENT_TERM: &str = "2 months";

/// Flat interest rate, in percent, over the repayment term.
pub const INTEREST_RATE_PERCENT: u32 = 10;

/// Smallest principal advertised on the eligibility screen.
pub const MIN_LOAN_AMOUNT: u32 = 1_500;

/// Largest principal advertised on the eligibility screen.
pub const MAX_LOAN_AMOUNT: u32 = 60_000;

/// Loan products offered in the eligibility form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoanType {
    Personal,
    Business,
    Emergency,
    Education,
    Medical,
    SalaryAdvance,
}

impl LoanType {
    pub const ALL: [LoanType; 6] = [
        LoanType::Personal,
        LoanType::Business,
        LoanType::Emergency,
        LoanType::Education,
        LoanType::Medical,
        LoanType::SalaryAdvance,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            LoanType::Personal => "Personal Loan",
            LoanType::Business => "Business Loan",
            LoanType::Emergency => "Emergency Loan",
            LoanType::Education => "Education Loan",
            LoanType::Medical => "Medical Loan",
            LoanType::SalaryAdvance => "Salary Advance",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            LoanType::Personal => "personal",
            LoanType::Business => "business",
            LoanType::Emergency => "emergency",
            LoanType::Education => "education",
            LoanType::Medical => "medical",
            LoanType::SalaryAdvance => "salary-advance",
        }
    }
}

impl fmt::Display for LoanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LoanType {
    type Err = String;

    /// Accepts the display label ("Personal Loan") or the slug ("personal",
    /// "salary_advance"), ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        LoanType::ALL
            .into_iter()
            .find(|t| t.slug() == wanted || t.label().to_lowercase() == wanted)
            .ok_or_else(|| format!("Unknown loan type: {}", s.trim()))
    }
}

/// Details collected by the eligibility form once every field has passed
/// validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    pub full_name: String,
    /// Local form as typed by the user, e.g. `0712345678`.
    pub phone_number: String,
    pub id_number: String,
    pub loan_type: LoanType,
}

/// A selectable principal together with the transaction fee charged via
/// STK push before disbursement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoanOption {
    pub amount: u32,
    pub fee: u32,
}

/// The three screens of the application flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Step {
    Check = 1,
    Select = 2,
    GetCash = 3,
}

impl Step {
    pub const ALL: [Step; 3] = [Step::Check, Step::Select, Step::GetCash];

    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn label(&self) -> &'static str {
        match self {
            Step::Check => "Check",
            Step::Select => "Select",
            Step::GetCash => "Get Cash",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<u8> for Step {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Step::Check),
            2 => Ok(Step::Select),
            3 => Ok(Step::GetCash),
            other => Err(other),
        }
    }
}
