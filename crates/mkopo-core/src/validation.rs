use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::types::{LoanType, UserData};

const FULL_NAME_MIN: usize = 3;
const FULL_NAME_MAX: usize = 100;

lazy_static! {
    static ref FULL_NAME_REGEX: Regex = Regex::new(r"^[a-zA-Z\s]+$").unwrap();
    static ref LOCAL_PHONE_REGEX: Regex = Regex::new(r"^(07|01)[0-9]{8}$").unwrap();
    static ref ID_NUMBER_REGEX: Regex = Regex::new(r"^[0-9]{7,8}$").unwrap();
}

/// Inputs of the eligibility form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    FullName,
    PhoneNumber,
    IdNumber,
    LoanType,
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FormField::FullName => "Full name",
            FormField::PhoneNumber => "Phone number",
            FormField::IdNumber => "ID number",
            FormField::LoanType => "Loan type",
        };
        f.write_str(label)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must be at least {min} characters")]
    TooShort {
        field: FormField,
        min: usize,
        actual: usize,
    },

    #[error("{field} must be less than {max} characters")]
    TooLong {
        field: FormField,
        max: usize,
        actual: usize,
    },

    #[error("{field} can only contain letters and spaces")]
    InvalidCharacters { field: FormField },

    #[error("{hint}")]
    InvalidFormat {
        field: FormField,
        hint: &'static str,
    },

    #[error("{hint}")]
    RequiredField {
        field: FormField,
        hint: &'static str,
    },
}

impl ValidationError {
    pub fn field(&self) -> FormField {
        match self {
            ValidationError::TooShort { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::InvalidCharacters { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::RequiredField { field, .. } => *field,
        }
    }
}

/// Every rule violation found in one submission, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormErrors(Vec<ValidationError>);

impl FormErrors {
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    /// The message shown under a field: its first failing rule.
    pub fn for_field(&self, field: FormField) -> Option<&ValidationError> {
        self.0.iter().find(|e| e.field() == field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for FormErrors {}

/// Per-field rules of the eligibility form.
pub struct FieldValidator;

impl FieldValidator {
    pub fn validate_full_name(name: &str) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let length = name.chars().count();

        if length < FULL_NAME_MIN {
            errors.push(ValidationError::TooShort {
                field: FormField::FullName,
                min: FULL_NAME_MIN,
                actual: length,
            });
        }
        if length > FULL_NAME_MAX {
            errors.push(ValidationError::TooLong {
                field: FormField::FullName,
                max: FULL_NAME_MAX,
                actual: length,
            });
        }
        if !FULL_NAME_REGEX.is_match(name) {
            errors.push(ValidationError::InvalidCharacters {
                field: FormField::FullName,
            });
        }

        errors
    }

    pub fn validate_phone_number(phone: &str) -> Result<(), ValidationError> {
        if LOCAL_PHONE_REGEX.is_match(phone) {
            Ok(())
        } else {
            Err(ValidationError::InvalidFormat {
                field: FormField::PhoneNumber,
                hint: "Enter a valid Kenyan phone number (e.g., 0712345678)",
            })
        }
    }

    pub fn validate_id_number(id_number: &str) -> Result<(), ValidationError> {
        if ID_NUMBER_REGEX.is_match(id_number) {
            Ok(())
        } else {
            Err(ValidationError::InvalidFormat {
                field: FormField::IdNumber,
                hint: "Enter a valid ID number (7-8 digits)",
            })
        }
    }

    pub fn validate_loan_type(loan_type: &str) -> Result<LoanType, ValidationError> {
        loan_type
            .parse::<LoanType>()
            .map_err(|_| ValidationError::RequiredField {
                field: FormField::LoanType,
                hint: "Please select a loan type",
            })
    }
}

/// Raw, unvalidated values of the eligibility form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityForm {
    pub full_name: String,
    pub phone_number: String,
    pub id_number: String,
    pub loan_type: String,
}

impl EligibilityForm {
    /// Checks every field and returns the submitted details, or all
    /// violations at once so each input can show its own message.
    pub fn validate(&self) -> Result<UserData, FormErrors> {
        let mut errors = FieldValidator::validate_full_name(&self.full_name);

        if let Err(e) = FieldValidator::validate_phone_number(&self.phone_number) {
            errors.push(e);
        }
        if let Err(e) = FieldValidator::validate_id_number(&self.id_number) {
            errors.push(e);
        }
        let loan_type = match FieldValidator::validate_loan_type(&self.loan_type) {
            Ok(t) => Some(t),
            Err(e) => {
                errors.push(e);
                None
            }
        };

        match loan_type {
            Some(loan_type) if errors.is_empty() => Ok(UserData {
                full_name: self.full_name.clone(),
                phone_number: self.phone_number.clone(),
                id_number: self.id_number.clone(),
                loan_type,
            }),
            _ => Err(FormErrors(errors)),
        }
    }
}
