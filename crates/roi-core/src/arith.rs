//! Total decimal arithmetic.
//!
//! Calculators must never panic, whatever numbers they are handed. These
//! helpers saturate at the `Decimal` bounds on overflow and treat division by
//! zero as zero.

use rust_decimal::Decimal;

fn saturated(negative: bool) -> Decimal {
    if negative {
        Decimal::MIN
    } else {
        Decimal::MAX
    }
}

pub fn add(a: Decimal, b: Decimal) -> Decimal {
    a.checked_add(b)
        .unwrap_or_else(|| saturated(a.is_sign_negative()))
}

pub fn sub(a: Decimal, b: Decimal) -> Decimal {
    a.checked_sub(b)
        .unwrap_or_else(|| saturated(a.is_sign_negative()))
}

pub fn mul(a: Decimal, b: Decimal) -> Decimal {
    a.checked_mul(b)
        .unwrap_or_else(|| saturated(a.is_sign_negative() != b.is_sign_negative()))
}

/// `a / b`, or zero when `b` is zero.
pub fn div(a: Decimal, b: Decimal) -> Decimal {
    if b.is_zero() {
        return Decimal::ZERO;
    }
    a.checked_div(b)
        .unwrap_or_else(|| saturated(a.is_sign_negative() != b.is_sign_negative()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_saturates() {
        assert_eq!(mul(Decimal::MAX, Decimal::from(2)), Decimal::MAX);
        assert_eq!(mul(Decimal::MAX, Decimal::from(-2)), Decimal::MIN);
        assert_eq!(add(Decimal::MAX, Decimal::ONE), Decimal::MAX);
        assert_eq!(sub(Decimal::MIN, Decimal::ONE), Decimal::MIN);
    }

    #[test]
    fn division_by_zero_is_zero() {
        assert_eq!(div(Decimal::ONE, Decimal::ZERO), Decimal::ZERO);
        assert_eq!(div(Decimal::from(9000), Decimal::from(30000)), Decimal::new(3, 1));
    }
}
