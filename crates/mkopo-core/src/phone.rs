use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const COUNTRY_CODE: &str = "254";

lazy_static! {
    static ref SEPARATORS: Regex = Regex::new(r"\s+|-").unwrap();
    static ref MSISDN_REGEX: Regex = Regex::new(r"^254[17][0-9]{8}$").unwrap();
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    #[error("Invalid phone number format. Please use a valid Kenyan phone number.")]
    InvalidFormat { raw: String, normalized: String },
}

/// A Kenyan mobile number in the international form M-Pesa expects,
/// `254` followed by `7` or `1` and eight more digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Msisdn(String);

impl Msisdn {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Msisdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Msisdn {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize_msisdn(s)
    }
}

impl TryFrom<String> for Msisdn {
    type Error = PhoneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        normalize_msisdn(&value)
    }
}

impl From<Msisdn> for String {
    fn from(value: Msisdn) -> Self {
        value.0
    }
}

/// Rewrites a phone number as typed by the user into `254XXXXXXXXX`.
///
/// Whitespace and hyphens are dropped first. Then exactly one rewrite applies:
/// a leading `0` becomes `254`, a leading `+254` loses its `+`, and a bare
/// nine digit number starting with `7` gets `254` in front. Anything else is
/// checked as-is.
pub fn normalize_msisdn(raw: &str) -> Result<Msisdn, PhoneError> {
    let stripped = SEPARATORS.replace_all(raw, "");

    let normalized = if let Some(rest) = stripped.strip_prefix('0') {
        format!("{COUNTRY_CODE}{rest}")
    } else if stripped.starts_with("+254") {
        stripped[1..].to_string()
    } else if stripped.starts_with('7') && stripped.len() == 9 {
        format!("{COUNTRY_CODE}{stripped}")
    } else {
        stripped.to_string()
    };

    if MSISDN_REGEX.is_match(&normalized) {
        Ok(Msisdn(normalized))
    } else {
        Err(PhoneError::InvalidFormat {
            raw: raw.to_string(),
            normalized,
        })
    }
}
