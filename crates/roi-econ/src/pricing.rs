//! Plan pricing: usage count to monthly subscription price.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One bracket of a price table. `up_to: None` marks the unbounded top tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTier {
    #[serde(default)]
    pub up_to: Option<u64>,
    pub price: Decimal,
}

/// Errors produced when validating a price table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("price table has no tiers")]
    Empty,
    /// Thresholds must be strictly ascending.
    #[error("tier threshold {next} does not exceed previous threshold {previous}")]
    NotAscending { previous: u64, next: u64 },
    /// Only the last tier may omit its threshold.
    #[error("unbounded tier must be the last one")]
    UnboundedNotLast,
    #[error("negative tier price {0}")]
    NegativePrice(Decimal),
    /// A bigger plan never costs less.
    #[error("tier price {next} is lower than previous price {previous}")]
    PriceDecreases { previous: Decimal, next: Decimal },
}

/// Ordered ceiling lookup from usage to price.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PriceTier>", into = "Vec<PriceTier>")]
pub struct PriceTable {
    tiers: Vec<PriceTier>,
}

impl PriceTable {
    /// Validate and wrap a list of tiers.
    pub fn new(tiers: Vec<PriceTier>) -> Result<Self, PricingError> {
        if tiers.is_empty() {
            return Err(PricingError::Empty);
        }
        let last = tiers.len() - 1;
        let mut previous: Option<&PriceTier> = None;
        for (i, tier) in tiers.iter().enumerate() {
            if tier.price < Decimal::ZERO {
                return Err(PricingError::NegativePrice(tier.price));
            }
            if tier.up_to.is_none() && i != last {
                return Err(PricingError::UnboundedNotLast);
            }
            if let Some(prev) = previous {
                if let (Some(p), Some(n)) = (prev.up_to, tier.up_to) {
                    if n <= p {
                        return Err(PricingError::NotAscending {
                            previous: p,
                            next: n,
                        });
                    }
                }
                if tier.price < prev.price {
                    return Err(PricingError::PriceDecreases {
                        previous: prev.price,
                        next: tier.price,
                    });
                }
            }
            previous = Some(tier);
        }
        Ok(Self { tiers })
    }

    pub fn tiers(&self) -> &[PriceTier] {
        &self.tiers
    }

    /// Price of the first tier whose threshold covers `usage`; above every
    /// threshold, the price of the last tier.
    pub fn resolve(&self, usage: u64) -> Decimal {
        self.tiers
            .iter()
            .find(|t| t.up_to.map_or(true, |limit| usage <= limit))
            .or_else(|| self.tiers.last())
            .map(|t| t.price)
            .unwrap_or(Decimal::ZERO)
    }
}

impl TryFrom<Vec<PriceTier>> for PriceTable {
    type Error = PricingError;

    fn try_from(tiers: Vec<PriceTier>) -> Result<Self, Self::Error> {
        Self::new(tiers)
    }
}

impl From<PriceTable> for Vec<PriceTier> {
    fn from(table: PriceTable) -> Self {
        table.tiers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tier(up_to: Option<u64>, price: i64) -> PriceTier {
        PriceTier {
            up_to,
            price: Decimal::from(price),
        }
    }

    fn customer_table() -> PriceTable {
        PriceTable::new(vec![
            tier(Some(1500), 139),
            tier(Some(3000), 189),
            tier(Some(5000), 259),
            tier(Some(10000), 339),
            tier(None, 439),
        ])
        .unwrap()
    }

    fn user_table() -> PriceTable {
        PriceTable::new(vec![
            tier(Some(100), 79),
            tier(Some(250), 149),
            tier(Some(500), 249),
            tier(Some(1000), 449),
            tier(Some(2500), 749),
            tier(Some(5000), 1249),
            tier(Some(10000), 1999),
            tier(Some(25000), 3499),
            tier(Some(50000), 5999),
        ])
        .unwrap()
    }

    #[test]
    fn ceiling_lookup() {
        let t = customer_table();
        assert_eq!(t.resolve(0), Decimal::from(139));
        assert_eq!(t.resolve(1500), Decimal::from(139));
        assert_eq!(t.resolve(1501), Decimal::from(189));
        assert_eq!(t.resolve(10000), Decimal::from(339));
        assert_eq!(t.resolve(10001), Decimal::from(439));
        assert_eq!(t.resolve(u64::MAX), Decimal::from(439));
    }

    #[test]
    fn bounded_table_falls_back_to_last_tier() {
        let t = user_table();
        assert_eq!(t.resolve(1000), Decimal::from(449));
        assert_eq!(t.resolve(50000), Decimal::from(5999));
        assert_eq!(t.resolve(75000), Decimal::from(5999));
    }

    #[test]
    fn invalid_tables_are_rejected() {
        assert_eq!(PriceTable::new(vec![]), Err(PricingError::Empty));
        assert_eq!(
            PriceTable::new(vec![tier(None, 10), tier(Some(5), 20)]),
            Err(PricingError::UnboundedNotLast)
        );
        assert_eq!(
            PriceTable::new(vec![tier(Some(10), 10), tier(Some(10), 20)]),
            Err(PricingError::NotAscending { previous: 10, next: 10 })
        );
        assert!(matches!(
            PriceTable::new(vec![tier(Some(10), 20), tier(Some(20), 10)]),
            Err(PricingError::PriceDecreases { .. })
        ));
        assert!(matches!(
            PriceTable::new(vec![tier(Some(10), -1)]),
            Err(PricingError::NegativePrice(_))
        ));
    }

    #[test]
    fn deserializes_with_validation() {
        let ok: PriceTable =
            serde_json::from_str(r#"[{"up_to": 100, "price": "79"}, {"price": "99"}]"#).unwrap();
        assert_eq!(ok.resolve(500), Decimal::from(99));
        let bad = serde_json::from_str::<PriceTable>(r#"[{"price": "9"}, {"up_to": 1, "price": "9"}]"#);
        assert!(bad.is_err());
    }

    proptest! {
        #[test]
        fn price_is_monotonic_in_usage(a in 0u64..100_000, b in 0u64..100_000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            for t in [customer_table(), user_table()] {
                prop_assert!(t.resolve(lo) <= t.resolve(hi));
            }
        }
    }
}
