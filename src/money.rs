//! Fixed-point money helpers.
//!
//! Every stored amount is a [`Decimal`] rounded to cents. Percentages
//! (tax, commission) are kept as plain percent values, so `10` means 10%.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{BillingError, Result};

pub const CENTS: u32 = 2;

/// Largest amount accepted from the command line (one trillion).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Round to cents, half away from zero.
pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CENTS, RoundingStrategy::MidpointAwayFromZero)
}

/// Truncate to cents. Used where a remainder is carried elsewhere.
pub fn truncate_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CENTS, RoundingStrategy::ToZero)
}

/// `value × percent / 100`, rounded to cents.
pub fn percent_of(value: Decimal, percent: Decimal) -> Result<Decimal> {
    let scaled = value.checked_mul(percent).ok_or(BillingError::AmountOverflow)?;
    Ok(round_cents(scaled / Decimal::ONE_HUNDRED))
}

/// True when the amount carries fractions of a cent.
pub fn has_sub_cents(value: Decimal) -> bool {
    value.normalize().scale() > CENTS
}

/// Lenient parse for form-style input: anything non-numeric becomes zero.
pub fn coerce_amount(input: &str) -> Decimal {
    Decimal::from_str(input.trim()).unwrap_or(Decimal::ZERO)
}

/// Strict parse for command-line amounts.
pub fn parse_amount(input: &str) -> Result<Decimal> {
    let value =
        Decimal::from_str(input.trim()).map_err(|_| BillingError::InvalidAmount(input.to_string()))?;
    if value.abs() > MAX_AMOUNT {
        return Err(BillingError::AmountTooLarge(input.to_string()));
    }
    Ok(value)
}

/// Insert thousands separators into a plain integer string: `-1250` → `-1,250`.
pub fn group_thousands(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 + 1);
    out.push_str(sign);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format with two decimals and thousands separators: `1234.5` → `1,234.50`.
pub fn format_amount(value: Decimal) -> String {
    let rounded = round_cents(value);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let grouped = group_thousands(whole);

    if negative {
        format!("-{grouped}.{frac}")
    } else {
        format!("{grouped}.{frac}")
    }
}

/// Currency symbol plus [`format_amount`].
pub fn format_money(value: Decimal, currency_symbol: &str) -> String {
    format!("{currency_symbol}{}", format_amount(value))
}
