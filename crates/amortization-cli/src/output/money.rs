use num_format::{Locale, ToFormattedString as _};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Round half away from zero to `dp` places and pin the scale, so 6.5 prints as 6.50.
fn fixed(amount: Decimal, dp: u32) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    rounded
}

/// Format a cash amount with currency symbol, two decimal places and
/// thousands separators (en locale, i.e. $1,264.14).
pub fn format_money(amount: Decimal, symbol: &str) -> String {
    let rounded = fixed(amount, 2);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let abs = rounded.abs();
    let integer_part = abs
        .trunc()
        .to_i128()
        .unwrap_or_default()
        .to_formatted_string(&Locale::en);
    let cents = (abs.fract() * Decimal::ONE_HUNDRED).to_u32().unwrap_or_default();
    format!("{sign}{symbol}{integer_part}.{cents:02}")
}

/// Percentage with two decimal places, e.g. 6.50%.
pub fn format_percent(percent: Decimal) -> String {
    format!("{}%", fixed(percent, 2))
}

/// Year count without trailing zeros: 30, or 1.5 for partial years.
pub fn format_years(years: Decimal) -> String {
    let n = years.normalize();
    let unit = if n == Decimal::ONE { "year" } else { "years" };
    format!("{n} {unit}")
}
