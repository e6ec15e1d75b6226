//! Common validation utilities.

use chrono::{NaiveDate, Utc};
use validator::ValidationError;

/// Maximum donor name length in characters.
pub const MAX_DONOR_NAME_LENGTH: usize = 100;

/// Maximum length for contact, address, acknowledger-name fields.
pub const MAX_SHORT_TEXT_LENGTH: usize = 200;

/// Maximum note length in characters.
pub const MAX_NOTE_LENGTH: usize = 1000;

/// Validates that a gift amount is non-negative.
///
/// Amounts are whole currency units; negative values are a contract
/// violation and never reach the aggregation engine.
pub fn validate_amount(amount: i64) -> Result<(), ValidationError> {
    if amount >= 0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("amount_range");
        err.message = Some("Amount must be non-negative".into());
        Err(err)
    }
}

/// Validates that a gift date is not in the future.
pub fn validate_gift_date(date: &NaiveDate) -> Result<(), ValidationError> {
    let today = Utc::now().date_naive();
    if *date <= today {
        Ok(())
    } else {
        let mut err = ValidationError::new("gift_date_future");
        err.message = Some("Gift date cannot be in the future".into());
        Err(err)
    }
}

/// Validates a donor display name (non-blank, bounded length).
pub fn validate_donor_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        let mut err = ValidationError::new("donor_name_blank");
        err.message = Some("Donor name must not be blank".into());
        return Err(err);
    }
    if trimmed.chars().count() > MAX_DONOR_NAME_LENGTH {
        let mut err = ValidationError::new("donor_name_length");
        err.message = Some("Donor name is too long".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_validate_amount_zero_and_positive() {
        assert!(validate_amount(0).is_ok());
        assert!(validate_amount(50_000).is_ok());
        assert!(validate_amount(i64::MAX).is_ok());
    }

    #[test]
    fn test_validate_amount_negative() {
        let err = validate_amount(-1).unwrap_err();
        assert_eq!(err.code, "amount_range");
    }

    #[test]
    fn test_validate_gift_date_today_ok() {
        let today = Utc::now().date_naive();
        assert!(validate_gift_date(&today).is_ok());
    }

    #[test]
    fn test_validate_gift_date_past_ok() {
        let past = Utc::now().date_naive() - Duration::days(365);
        assert!(validate_gift_date(&past).is_ok());
    }

    #[test]
    fn test_validate_gift_date_future_rejected() {
        let tomorrow = Utc::now().date_naive() + Duration::days(1);
        let err = validate_gift_date(&tomorrow).unwrap_err();
        assert_eq!(err.code, "gift_date_future");
    }

    #[test]
    fn test_validate_donor_name_ok() {
        assert!(validate_donor_name("Kim Minsoo").is_ok());
    }

    #[test]
    fn test_validate_donor_name_blank() {
        assert!(validate_donor_name("").is_err());
        assert!(validate_donor_name("   ").is_err());
    }

    #[test]
    fn test_validate_donor_name_too_long() {
        let long = "a".repeat(MAX_DONOR_NAME_LENGTH + 1);
        let err = validate_donor_name(&long).unwrap_err();
        assert_eq!(err.code, "donor_name_length");
    }

    #[test]
    fn test_validate_donor_name_at_limit() {
        let exact = "a".repeat(MAX_DONOR_NAME_LENGTH);
        assert!(validate_donor_name(&exact).is_ok());
    }
}
