//! Rate units.
//!
//! Percentages (`0..=100`) only exist at the input boundary and in display
//! strings. Every calculation works on [`Fraction`]s (`0..=1`), and the two
//! never convert into each other implicitly.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A rate expressed on the `0..=100` scale, e.g. `Percent(25)` for 25%.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Percent(pub Decimal);

/// A rate expressed on the `0..=1` scale, e.g. `Fraction(0.25)` for 25%.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Fraction(pub Decimal);

impl Percent {
    /// Build a percentage from an integer number of percent.
    pub fn from_int(percent: i64) -> Self {
        Self(Decimal::from(percent))
    }

    /// Raw value on the `0..=100` scale.
    pub fn value(self) -> Decimal {
        self.0
    }

    /// Convert to the `0..=1` scale.
    pub fn to_fraction(self) -> Fraction {
        Fraction(self.0 / Decimal::ONE_HUNDRED)
    }
}

impl Fraction {
    pub const ZERO: Fraction = Fraction(Decimal::ZERO);
    pub const ONE: Fraction = Fraction(Decimal::ONE);

    /// Raw value on the `0..=1` scale.
    pub fn value(self) -> Decimal {
        self.0
    }

    /// `1 - self`, the share that remains after applying this rate.
    pub fn complement(self) -> Fraction {
        Fraction(Decimal::ONE - self.0)
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0.normalize())
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_to_fraction_and_back() {
        let p = Percent::from_int(5);
        assert_eq!(p.to_fraction(), Fraction(Decimal::new(5, 2)));
    }

    #[test]
    fn complement_of_reduction() {
        let f = Fraction(Decimal::new(3, 1));
        assert_eq!(f.complement(), Fraction(Decimal::new(7, 1)));
        assert_eq!(Fraction::ONE.complement(), Fraction::ZERO);
    }

    #[test]
    fn display_is_normalized() {
        assert_eq!(Percent(Decimal::new(2500, 2)).to_string(), "25%");
        assert_eq!(Fraction(Decimal::new(350, 4)).to_string(), "0.035");
    }
}
