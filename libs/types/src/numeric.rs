//! Decimal bid amounts
//!
//! Amounts are `rust_decimal::Decimal` so the strictly-lower comparison is
//! exact. Clients send plain JSON numbers or numeric strings.

use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;
use std::str::FromStr;

/// Why a submitted amount could not be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountError {
    /// Not a number, or a non-positive one too large to represent
    Invalid,
    /// A positive number outside what `Decimal` can hold exactly
    OutOfRange,
}

/// Parse a submitted amount.
///
/// Accepts JSON numbers (including exponent notation) and strings holding a
/// number. Sign is not checked here.
pub fn parse_amount(raw: &Value) -> Result<Decimal, AmountError> {
    match raw {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s.trim()),
        _ => Err(AmountError::Invalid),
    }
}

fn parse_decimal(text: &str) -> Result<Decimal, AmountError> {
    if text.is_empty() {
        return Err(AmountError::Invalid);
    }
    // f64 tells whether the text is numeric at all, whatever its magnitude
    let approx = text.parse::<f64>().ok().filter(|f| f.is_finite());
    let parsed = Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok();

    match (parsed, approx) {
        // Too many decimal places rounded a positive amount down to zero
        (Some(amount), Some(f)) if amount.is_zero() && f > 0.0 => Err(AmountError::OutOfRange),
        (Some(amount), _) => Ok(amount),
        (None, Some(f)) if f > 0.0 => Err(AmountError::OutOfRange),
        (None, _) => Err(AmountError::Invalid),
    }
}

/// A bid amount must be strictly positive.
pub fn is_valid_amount(amount: Decimal) -> bool {
    amount > Decimal::ZERO
}

/// Render an amount with two decimals, as shown to bidders.
pub fn format_amount(amount: &Decimal) -> String {
    format!(
        "{:.2}",
        amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}
