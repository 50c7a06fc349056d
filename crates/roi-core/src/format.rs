//! Display formatting shared by the results summary and the PDF report.
//!
//! The output matches `en-US` number formatting: currency is a whole-dollar
//! amount with a `$` prefix, plain numbers are rounded and thousands-grouped,
//! percentages carry one decimal place.

use crate::units::Fraction;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// `$1,875`, `-$250`. Halves round away from zero.
pub fn format_currency(value: Decimal) -> String {
    let whole = value
        .abs()
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    format!("{}${}", sign(value), group_thousands(whole))
}

/// `1,234` after rounding half up, the way `Math.round` does.
pub fn format_number(value: Decimal) -> String {
    let rounded = crate::round_half_up(value);
    format!("{}{}", sign(value), group_thousands(rounded.abs()))
}

/// `5.0%` for `Fraction(0.05)`.
pub fn format_percent(value: Fraction) -> String {
    let tenths = crate::arith::mul(value.value().abs(), Decimal::ONE_THOUSAND)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u128()
        .unwrap_or(u128::MAX);
    format!(
        "{}{}.{}%",
        sign(value.value()),
        group_digits(tenths / 10),
        tenths % 10
    )
}

/// `38 hrs`.
pub fn format_hours(hours: Decimal) -> String {
    format!("{} hrs", format_number(hours))
}

fn sign(value: Decimal) -> &'static str {
    if value.is_sign_negative() && !value.is_zero() {
        "-"
    } else {
        ""
    }
}

fn group_thousands(whole: Decimal) -> String {
    group_digits(whole.trunc().to_u128().unwrap_or(0))
}

fn group_digits(n: u128) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
