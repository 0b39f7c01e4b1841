use thiserror::Error;

/// Errors raised by the tracker library
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Reading or writing a storage document or export file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A storage document could not be parsed or serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("PDF error: {0}")]
    Pdf(String),

    /// Input failed the presence checks
    #[error("Validation error: {0}")]
    Validation(String),

    /// No bet with the given id
    #[error("Bet not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, TrackerError>;

impl From<printpdf::Error> for TrackerError {
    fn from(e: printpdf::Error) -> Self {
        TrackerError::Pdf(format!("{:?}", e))
    }
}

/// Largest accepted stake. Keeps stake × odds and the running totals far
/// inside the range of `Decimal`.
pub const MAX_STAKE: rust_decimal::Decimal = rust_decimal::Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Largest accepted decimal odds
pub const MAX_ODDS: rust_decimal::Decimal = rust_decimal::Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Stake must be strictly positive and at most `MAX_STAKE`
pub fn validate_amount(amount: rust_decimal::Decimal) -> Result<()> {
    if amount <= rust_decimal::Decimal::ZERO {
        return Err(TrackerError::Validation(format!(
            "Stake must be positive, got {}",
            amount
        )));
    }
    if amount > MAX_STAKE {
        return Err(TrackerError::Validation(format!(
            "Stake must be at most {}, got {}",
            MAX_STAKE, amount
        )));
    }
    Ok(())
}

/// Decimal odds must be strictly positive and at most `MAX_ODDS`
pub fn validate_odds(odds: rust_decimal::Decimal) -> Result<()> {
    if odds <= rust_decimal::Decimal::ZERO {
        return Err(TrackerError::Validation(format!(
            "Odds must be positive, got {}",
            odds
        )));
    }
    if odds > MAX_ODDS {
        return Err(TrackerError::Validation(format!(
            "Odds must be at most {}, got {}",
            MAX_ODDS, odds
        )));
    }
    Ok(())
}

pub fn validate_category(category: &str) -> Result<()> {
    if category.trim().is_empty() {
        return Err(TrackerError::Validation(
            "Category is required".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(dec!(10)).is_ok());
        assert!(validate_amount(dec!(0)).is_err());
        assert!(validate_amount(dec!(-5)).is_err());
        assert!(validate_amount(MAX_STAKE).is_ok());
        assert!(matches!(
            validate_amount(dec!(50000000000000000000000000000)),
            Err(TrackerError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_odds() {
        assert!(validate_odds(dec!(1.85)).is_ok());
        assert!(validate_odds(dec!(0)).is_err());
        assert!(validate_odds(MAX_ODDS).is_ok());
        assert!(validate_odds(MAX_ODDS + dec!(0.01)).is_err());
    }

    #[test]
    fn test_validate_category() {
        assert!(validate_category("gols").is_ok());
        assert!(validate_category("   ").is_err());
    }

    #[test]
    fn test_error_messages() {
        let err = TrackerError::NotFound("abc".to_string());
        assert_eq!(err.to_string(), "Bet not found: abc");
    }
}
