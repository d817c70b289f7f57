//! Fixed-point conversion between decimal strings and base units.

use alloy_primitives::U256;

use crate::AmountError;

/// Decimal places of the native currency.
pub const BASE_UNIT_DECIMALS: usize = 18;

/// Parse a positive decimal ether amount (e.g. `"0.5"`) into base units.
pub fn parse_ether(input: &str) -> Result<U256, AmountError> {
    parse_units(input, BASE_UNIT_DECIMALS)
}

/// Parse a positive decimal amount scaled by `10^decimals`.
///
/// Accepts `digits[.digits]` with an optional leading `-` (which is then
/// rejected as non-positive). Exponents, signs other than `-`, separators
/// and surrounding text are not numeric. Trailing fractional zeros beyond
/// `decimals` are tolerated; significant digits beyond it are not.
pub fn parse_units(input: &str, decimals: usize) -> Result<U256, AmountError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }

    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
        return Err(AmountError::NotNumeric(trimmed.to_string()));
    }

    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > decimals {
        return Err(AmountError::TooManyDecimals { max: decimals });
    }

    let mut scaled = String::with_capacity(whole.len() + decimals);
    scaled.push_str(whole);
    scaled.push_str(fraction);
    scaled.extend(std::iter::repeat_n('0', decimals - fraction.len()));
    let scaled = scaled.trim_start_matches('0');

    let value = if scaled.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(scaled, 10).map_err(|_| AmountError::Overflow)?
    };

    if negative || value.is_zero() {
        return Err(AmountError::NotPositive);
    }
    Ok(value)
}

/// Format base units as decimal ether, always with a fractional part (`"1.0"`).
pub fn format_ether(value: U256) -> String {
    format_units(value, BASE_UNIT_DECIMALS)
}

/// Format `value / 10^decimals` with trailing zeros trimmed.
pub fn format_units(value: U256, decimals: usize) -> String {
    let digits = value.to_string();
    let (whole, fraction) = if digits.len() > decimals {
        let (w, f) = digits.split_at(digits.len() - decimals);
        (w.to_string(), f.to_string())
    } else {
        ("0".to_string(), format!("{digits:0>decimals$}"))
    };

    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        format!("{whole}.0")
    } else {
        format!("{whole}.{fraction}")
    }
}
