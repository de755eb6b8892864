//! Fixed-precision formatting of upstream quote fields.
//!
//! Upstream prices arrive as plain decimal strings whose precision depends on the
//! instrument class (index points, currency-quoted contracts, ...). The helpers here
//! infer a common precision for a price quadruple and render every numeric field at
//! that precision without going through floating point.
//!
//! None of the functions fail: a field that does not parse as a decimal is rendered
//! as zero at the requested precision.
use std::str::FromStr;

use log::debug;
use rust_decimal::{Decimal, RoundingStrategy};

/// Precision used for volumes, percentages and prices that carry no extra digits.
pub const DEFAULT_PRECISION: u32 = 2;
/// Upper bound for inferred price precision. Index quotes report four digits.
pub const MAX_PRICE_PRECISION: u32 = 4;

const HUNDRED_MILLION: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);
const TEN_MILLION: Decimal = Decimal::from_parts(10_000_000, 0, 0, false, 0);
const TEN_THOUSAND: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);
const THOUSAND: Decimal = Decimal::from_parts(1_000, 0, 0, false, 0);

/// Parse an upstream field as a decimal, ignoring surrounding whitespace.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw.trim()).ok()
}

/// Count the significant fractional digits of a numeric-looking field.
///
/// Trailing zeros do not count (`"3148.0"` has none). Returns `None` for empty or
/// non-numeric input so callers can skip it.
pub fn fractional_digits(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    parse_decimal(raw)?;
    let digits = match raw.split_once('.') {
        Some((_, fraction)) => fraction.trim_end_matches('0').len() as u32,
        None => 0,
    };
    Some(digits)
}

/// Infer the display precision shared by all price fields of one record.
///
/// The result is the largest number of significant fractional digits across the
/// numeric inputs, never below [`DEFAULT_PRECISION`] nor above [`MAX_PRICE_PRECISION`].
pub fn infer_precision(open: &str, previous_close: &str, price: &str, high: &str, low: &str) -> u32 {
    [open, previous_close, price, high, low]
        .into_iter()
        .filter_map(fractional_digits)
        .max()
        .unwrap_or(DEFAULT_PRECISION)
        .clamp(DEFAULT_PRECISION, MAX_PRICE_PRECISION)
}

/// Render a decimal with exactly `precision` fractional digits.
///
/// Negative values always keep their minus sign; with `signed` a zero or positive value
/// additionally gets an explicit `+`. Midpoints round away from zero and a rounded zero
/// never carries a minus.
pub fn format_decimal(value: Decimal, precision: u32, signed: bool) -> String {
    let mut rounded = value.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(precision);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    if signed && !rounded.is_sign_negative() {
        format!("+{}", rounded)
    } else {
        rounded.to_string()
    }
}

/// Parse `raw` and render it at `precision`, falling back to zero on malformed input.
pub fn format_fixed(raw: &str, precision: u32, signed: bool) -> String {
    let value = parse_decimal(raw).unwrap_or_else(|| {
        if !raw.trim().is_empty() {
            debug!("Malformed numeric field {:?}, rendering as zero", raw);
        }
        Decimal::ZERO
    });
    format_decimal(value, precision, signed)
}

/// Render a traded volume at two decimals, scaled to `万` / `亿` units when large.
pub fn format_volume(raw: &str) -> String {
    let value = parse_decimal(raw).unwrap_or(Decimal::ZERO);
    if value > TEN_MILLION {
        format!("{}亿", format_decimal(value / HUNDRED_MILLION, DEFAULT_PRECISION, false))
    } else if value > THOUSAND {
        format!("{}万", format_decimal(value / TEN_THOUSAND, DEFAULT_PRECISION, false))
    } else {
        format_decimal(value, DEFAULT_PRECISION, false)
    }
}

/// Round a price difference to the record precision, normalising negative zero.
pub fn round_change(change: Decimal, precision: u32) -> Decimal {
    let mut rounded = change.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded
}

/// Price difference `price - base`, or zero when it does not fit a `Decimal`.
pub fn price_change(price: Decimal, base: Decimal) -> Decimal {
    price.checked_sub(base).unwrap_or_else(|| {
        debug!("Change of {} against {} overflows, rendering as zero", price, base);
        Decimal::ZERO
    })
}

/// Percentage of `change` relative to `base`, with an explicit `+`/`-` sign.
///
/// The sign follows `change`; a zero `base` or a result that overflows yields `+0.00`.
pub fn format_percent(change: Decimal, base: Decimal) -> String {
    let magnitude = change
        .abs()
        .checked_div(base.abs())
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED));
    let percent = match magnitude {
        Some(magnitude) if change.is_sign_negative() => -magnitude,
        Some(magnitude) => magnitude,
        None => {
            if !base.is_zero() {
                debug!("Percent of {} against {} overflows, rendering as zero", change, base);
            }
            Decimal::ZERO
        }
    };
    format_decimal(percent, DEFAULT_PRECISION, true)
}
