use bigdecimal::BigDecimal;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("amount {0:?} is not a valid decimal")]
    InvalidAmount(String),
    #[error("amount {0:?} is negative")]
    NegativeAmount(String),
    #[error("currency {0:?} is not a three-letter uppercase code")]
    InvalidCurrency(String),
}

/// Normalize a monetary value to 2 decimal places. `with_scale` truncates
/// excess digits and extends shorter values with zeros.
pub fn normalize_scale(value: &BigDecimal) -> BigDecimal {
    value.with_scale(2)
}

/// Parse a wire amount string into a normalized monetary value.
/// Rejects non-decimal input and negative amounts.
pub fn parse_amount(raw: &str) -> Result<BigDecimal, MoneyError> {
    let value: BigDecimal = raw
        .trim()
        .parse()
        .map_err(|_| MoneyError::InvalidAmount(raw.to_string()))?;
    if value < BigDecimal::from(0) {
        return Err(MoneyError::NegativeAmount(raw.to_string()));
    }
    Ok(normalize_scale(&value))
}

/// Currency codes travel as ISO-4217 style three-letter uppercase strings.
pub fn validate_currency(raw: &str) -> Result<(), MoneyError> {
    if raw.len() == 3 && raw.bytes().all(|b| b.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(MoneyError::InvalidCurrency(raw.to_string()))
    }
}
