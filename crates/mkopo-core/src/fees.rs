use crate::error::{MkopoError, Result};
use crate::types::{LoanOption, MAX_LOAN_AMOUNT, MIN_LOAN_AMOUNT};

/// Principals offered on the selection screen and the STK push fee charged
/// for each, ascending by amount.
pub const LOAN_OPTIONS: [LoanOption; 12] = [
    LoanOption { amount: 1_500, fee: 100 },
    LoanOption { amount: 3_000, fee: 150 },
    LoanOption { amount: 5_000, fee: 200 },
    LoanOption { amount: 7_500, fee: 250 },
    LoanOption { amount: 10_000, fee: 300 },
    LoanOption { amount: 15_000, fee: 400 },
    LoanOption { amount: 20_000, fee: 500 },
    LoanOption { amount: 25_000, fee: 600 },
    LoanOption { amount: 30_000, fee: 700 },
    LoanOption { amount: 40_000, fee: 850 },
    LoanOption { amount: 50_000, fee: 1_000 },
    LoanOption { amount: 60_000, fee: 1_200 },
];

pub fn loan_options() -> &'static [LoanOption] {
    &LOAN_OPTIONS
}

pub fn find_option(amount: u32) -> Option<LoanOption> {
    LOAN_OPTIONS.iter().copied().find(|o| o.amount == amount)
}

/// Like [`find_option`], for amounts that must be on offer.
pub fn select_option(amount: u32) -> Result<LoanOption> {
    if !within_advertised_range(amount) {
        return Err(MkopoError::AmountOutOfRange {
            amount,
            min: MIN_LOAN_AMOUNT,
            max: MAX_LOAN_AMOUNT,
        });
    }
    find_option(amount).ok_or(MkopoError::UnknownLoanAmount(amount))
}

pub fn fee_for(amount: u32) -> Option<u32> {
    find_option(amount).map(|o| o.fee)
}

/// Whether `amount` lies inside the advertised range, whether or not it is
/// one of the offered principals.
pub fn within_advertised_range(amount: u32) -> bool {
    (MIN_LOAN_AMOUNT..=MAX_LOAN_AMOUNT).contains(&amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_strictly_ascending() {
        assert!(LOAN_OPTIONS.windows(2).all(|w| w[0].amount < w[1].amount));
        assert!(LOAN_OPTIONS.windows(2).all(|w| w[0].fee <= w[1].fee));
    }

    #[test]
    fn test_table_spans_advertised_range() {
        assert_eq!(LOAN_OPTIONS.first().map(|o| o.amount), Some(MIN_LOAN_AMOUNT));
        assert_eq!(LOAN_OPTIONS.last().map(|o| o.amount), Some(MAX_LOAN_AMOUNT));
        assert!(LOAN_OPTIONS.iter().all(|o| within_advertised_range(o.amount)));
    }

    #[test]
    fn test_lookup_is_exact() {
        assert_eq!(fee_for(1_500), Some(100));
        assert_eq!(fee_for(60_000), Some(1_200));
        assert_eq!(find_option(10_000), Some(LoanOption { amount: 10_000, fee: 300 }));
        assert_eq!(fee_for(1_501), None);
        assert_eq!(fee_for(0), None);
        assert!(within_advertised_range(1_501));
        assert!(matches!(
            select_option(1_501),
            Err(MkopoError::UnknownLoanAmount(1_501))
        ));
        assert_eq!(select_option(3_000).unwrap().fee, 150);
        assert!(matches!(
            select_option(100_000),
            Err(MkopoError::AmountOutOfRange { amount: 100_000, .. })
        ));
        assert!(!within_advertised_range(60_001));
    }
}
