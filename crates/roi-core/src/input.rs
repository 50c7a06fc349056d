//! Numeric input handling: lenient text parsing and clamping.
//!
//! Raw input never produces an error. Text that does not start with a number
//! falls back to the lower bound, anything out of range pins to the nearest
//! bound.

use crate::arith;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Valid range of a numeric input, with an optional slider step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRange {
    pub min: Decimal,
    pub max: Decimal,
    #[serde(default)]
    pub step: Option<Decimal>,
}

impl InputRange {
    pub fn new(min: Decimal, max: Decimal) -> Self {
        Self {
            min,
            max,
            step: None,
        }
    }

    /// True when `min <= max` and any step is strictly positive.
    pub fn is_valid(&self) -> bool {
        self.min <= self.max && self.step.map_or(true, |s| s > Decimal::ZERO)
    }

    pub fn contains(&self, value: Decimal) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: Decimal) -> Decimal {
        clamp(value, self.min, self.max)
    }

    /// Parse free text the way a numeric form field does: read the leading
    /// number, treat missing/zero as the lower bound, then clamp.
    pub fn parse(&self, text: &str) -> Decimal {
        match parse_leading_number(text) {
            Some(v) if !v.is_zero() => self.clamp(v),
            _ => self.min,
        }
    }

    /// Move `value` onto the slider grid `min + k * step`, then clamp.
    pub fn align(&self, value: Decimal) -> Decimal {
        let clamped = self.clamp(value);
        match self.step {
            Some(step) if step > Decimal::ZERO => {
                let k = crate::round_half_up(arith::div(arith::sub(clamped, self.min), step));
                self.clamp(arith::add(self.min, arith::mul(k, step)))
            }
            _ => clamped,
        }
    }
}

/// Pin `value` into `[min, max]`.
pub fn clamp<T: PartialOrd>(value: T, min: T, max: T) -> T {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Convert a decimal to a count, saturating at the `u64` bounds.
pub fn to_count(value: Decimal) -> u64 {
    if value <= Decimal::ZERO {
        return 0;
    }
    value.trunc().to_u64().unwrap_or(u64::MAX)
}

/// Read the longest numeric prefix of `text` (`-12.5kg` reads as `-12.5`,
/// `1e1` as `10`).
///
/// Returns `None` when the text does not start with a number. A prefix too
/// large for a `Decimal` saturates at the matching bound.
pub fn parse_leading_number(text: &str) -> Option<Decimal> {
    let chars: Vec<char> = text.trim_start().chars().collect();
    let mut pos = 0;
    let negative = match chars.first() {
        Some('-') => {
            pos = 1;
            true
        }
        Some('+') => {
            pos = 1;
            false
        }
        _ => false,
    };

    let mut int_part = String::new();
    let mut frac_part = String::new();
    while let Some(c) = chars.get(pos).filter(|c| c.is_ascii_digit()) {
        int_part.push(*c);
        pos += 1;
    }
    if chars.get(pos) == Some(&'.') {
        pos += 1;
        while let Some(c) = chars.get(pos).filter(|c| c.is_ascii_digit()) {
            frac_part.push(*c);
            pos += 1;
        }
    }
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }

    let literal = format!(
        "{}{}.{}",
        if negative { "-" } else { "" },
        if int_part.is_empty() { "0" } else { &int_part },
        if frac_part.is_empty() { "0" } else { &frac_part }
    );
    let mantissa = match Decimal::from_str(&literal) {
        Ok(v) => v,
        Err(_) if negative => return Some(Decimal::MIN),
        Err(_) => return Some(Decimal::MAX),
    };
    Some(apply_exponent(mantissa, read_exponent(&chars[pos..])))
}

/// `e[+-]digits` at the start of `rest`, as `parseFloat` accepts it.
fn read_exponent(rest: &[char]) -> i64 {
    if !matches!(rest.first(), Some('e' | 'E')) {
        return 0;
    }
    let (sign, digits_at) = match rest.get(1) {
        Some('-') => (-1, 2),
        Some('+') => (1, 2),
        _ => (1, 1),
    };
    let digits: String = rest[digits_at.min(rest.len())..]
        .iter()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return 0;
    }
    sign * digits.parse::<i64>().unwrap_or(i64::MAX)
}

fn apply_exponent(mantissa: Decimal, exp: i64) -> Decimal {
    if exp == 0 || mantissa.is_zero() {
        return mantissa;
    }
    let magnitude = exp.unsigned_abs().min(29) as u32;
    let factor = match 10i128.checked_pow(magnitude) {
        Some(f) if magnitude <= 28 => Decimal::from_i128_with_scale(f, 0),
        _ if exp > 0 => {
            return if mantissa.is_sign_negative() {
                Decimal::MIN
            } else {
                Decimal::MAX
            }
        }
        _ => return Decimal::ZERO,
    };
    if exp > 0 {
        arith::mul(mantissa, factor)
    } else {
        arith::div(mantissa, factor)
    }
}
