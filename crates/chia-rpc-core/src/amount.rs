//! Conversion between mojos (the chain's base unit) and XCH (display unit).
//!
//! All arithmetic goes through [`rust_decimal::Decimal`]; no value ever
//! passes through binary floating point, so `0.1` XCH is exactly
//! `100_000_000_000` mojos.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::CoreError;

/// Fractional digits of the display unit.
pub const DISPLAY_DECIMALS: u32 = 12;

/// Mojos in one XCH.
pub const MOJO_PER_XCH: u64 = 1_000_000_000_000;

/// Convert a display amount into mojos.
///
/// Values with more than 12 fractional digits are rounded to the nearest
/// mojo, midpoints away from zero.
pub fn to_base_units(display: Decimal) -> Result<u64, CoreError> {
    if display.is_zero() {
        return Ok(0);
    }
    if display.is_sign_negative() {
        return Err(CoreError::InvalidAmount(format!(
            "amount must not be negative: {display}"
        )));
    }

    let scaled = display
        .checked_mul(Decimal::from(MOJO_PER_XCH))
        .ok_or_else(|| CoreError::InvalidAmount(format!("amount out of range: {display}")))?;
    scaled
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .ok_or_else(|| CoreError::InvalidAmount(format!("amount out of range: {display}")))
}

/// Convert mojos into a display amount, exact to 12 fractional digits and
/// stripped of trailing zeros.
pub fn to_display_units(base: u64) -> Decimal {
    Decimal::from_i128_with_scale(i128::from(base), DISPLAY_DECIMALS).normalize()
}

/// Parse a display amount typed by a user, e.g. `"1.25"`.
///
/// Text that cannot be represented exactly is rejected rather than rounded.
pub fn parse_display_amount(text: &str) -> Result<Decimal, CoreError> {
    let text = text.trim();
    Decimal::from_str_exact(text)
        .map_err(|e| CoreError::InvalidAmount(format!("malformed amount `{text}`: {e}")))
}
