//! Discrete slider steps.
//!
//! A [`StepSequence`] is a strictly increasing, non-empty lookup table with
//! fine-grained steps at low values and coarse steps at high values. It is
//! built once from a [`StepDefinition`] and then only queried.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An inclusive linear run `start, start + step, ..., end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRun {
    pub start: u64,
    pub end: u64,
    pub step: u64,
}

/// Piecewise-linear description of a step sequence: linear runs followed by
/// hand-picked tail values.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDefinition {
    #[serde(default)]
    pub runs: Vec<StepRun>,
    #[serde(default)]
    pub tail: Vec<u64>,
}

/// Errors raised while building a step sequence.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StepError {
    /// The definition produced no values.
    #[error("step sequence is empty")]
    Empty,
    /// A run with a zero step would never advance.
    #[error("step run {start}..={end} has a zero step")]
    ZeroStep { start: u64, end: u64 },
    /// A run whose end lies before its start.
    #[error("step run {start}..={end} is reversed")]
    Reversed { start: u64, end: u64 },
    /// A value smaller than its predecessor.
    #[error("step value {value} follows larger value {previous}")]
    NotIncreasing { previous: u64, value: u64 },
}

/// Ordered, strictly increasing, non-empty set of allowed values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u64>", into = "Vec<u64>")]
pub struct StepSequence(Vec<u64>);

impl StepDefinition {
    /// Expand runs and tail into the flat list of values, in order.
    pub fn expand(&self) -> Result<Vec<u64>, StepError> {
        let mut out = Vec::new();
        for run in &self.runs {
            if run.step == 0 {
                return Err(StepError::ZeroStep {
                    start: run.start,
                    end: run.end,
                });
            }
            if run.end < run.start {
                return Err(StepError::Reversed {
                    start: run.start,
                    end: run.end,
                });
            }
            let mut v = run.start;
            while v <= run.end {
                out.push(v);
                match v.checked_add(run.step) {
                    Some(next) => v = next,
                    None => break,
                }
            }
        }
        out.extend_from_slice(&self.tail);
        Ok(out)
    }
}

impl StepSequence {
    /// Build a sequence from its piecewise definition.
    pub fn build(def: &StepDefinition) -> Result<Self, StepError> {
        Self::from_values(def.expand()?)
    }

    /// Build from explicit values. Repeated values collapse into one; a value
    /// smaller than its predecessor is rejected.
    pub fn from_values<I>(values: I) -> Result<Self, StepError>
    where
        I: IntoIterator<Item = u64>,
    {
        let mut out: Vec<u64> = Vec::new();
        for value in values {
            match out.last() {
                Some(&previous) if value == previous => continue,
                Some(&previous) if value < previous => {
                    return Err(StepError::NotIncreasing { previous, value })
                }
                _ => out.push(value),
            }
        }
        if out.is_empty() {
            return Err(StepError::Empty);
        }
        Ok(Self(out))
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }

    pub fn min(&self) -> u64 {
        self.0[0]
    }

    pub fn max(&self) -> u64 {
        self.0[self.0.len() - 1]
    }

    /// Nearest allowed value; ties resolve to the smaller value.
    pub fn snap(&self, value: i64) -> u64 {
        snap_to_nearest(value, &self.0).unwrap_or_else(|| self.min())
    }

    /// Slider index of an allowed value, `None` when `value` is not a step.
    pub fn index_of(&self, value: u64) -> Option<usize> {
        self.0.binary_search(&value).ok()
    }

    /// Value under a slider index. Out-of-range indices pin to the last step.
    pub fn value_at(&self, index: usize) -> u64 {
        self.0[index.min(self.0.len() - 1)]
    }
}

impl TryFrom<Vec<u64>> for StepSequence {
    type Error = StepError;

    fn try_from(values: Vec<u64>) -> Result<Self, Self::Error> {
        Self::from_values(values)
    }
}

impl From<StepSequence> for Vec<u64> {
    fn from(seq: StepSequence) -> Self {
        seq.0
    }
}

/// Element of `steps` with the smallest absolute distance to `value`.
///
/// Scans in order and only replaces the candidate on a strict improvement, so
/// ties go to the first occurrence. Returns `None` for an empty slice.
pub fn snap_to_nearest(value: i64, steps: &[u64]) -> Option<u64> {
    let mut best: Option<(u64, u128)> = None;
    for &step in steps {
        let diff = (i128::from(value) - i128::from(step)).unsigned_abs();
        match best {
            Some((_, best_diff)) if diff >= best_diff => {}
            _ => best = Some((step, diff)),
        }
    }
    best.map(|(step, _)| step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tickets() -> StepSequence {
        StepSequence::build(&StepDefinition {
            runs: vec![
                StepRun { start: 100, end: 1500, step: 100 },
                StepRun { start: 2000, end: 3000, step: 500 },
                StepRun { start: 4000, end: 5000, step: 1000 },
            ],
            tail: vec![7500, 10000, 15000, 20000, 30000, 50000],
        })
        .unwrap()
    }

    #[test]
    fn ticket_sequence_shape() {
        let s = tickets();
        assert_eq!(s.as_slice().len(), 26);
        assert_eq!(s.min(), 100);
        assert_eq!(s.max(), 50000);
        assert_eq!(&s.as_slice()[14..20], &[1500, 2000, 2500, 3000, 4000, 5000]);
    }

    #[test]
    fn snap_picks_nearest_and_breaks_ties_low() {
        let s = tickets();
        assert_eq!(s.snap(149), 100);
        assert_eq!(s.snap(150), 100);
        assert_eq!(s.snap(151), 200);
        assert_eq!(s.snap(-40), 100);
        assert_eq!(s.snap(1_000_000), 50000);
        assert_eq!(s.snap(3500), 3000);
    }

    #[test]
    fn index_mapping() {
        let s = tickets();
        assert_eq!(s.index_of(100), Some(0));
        assert_eq!(s.index_of(150), None);
        assert_eq!(s.value_at(0), 100);
        assert_eq!(s.value_at(999), 50000);
    }

    #[test]
    fn duplicates_collapse_and_reversal_fails() {
        let s = StepSequence::from_values([200, 300, 300, 400]).unwrap();
        assert_eq!(s.as_slice(), &[200, 300, 400]);
        assert_eq!(
            StepSequence::from_values([5, 3]),
            Err(StepError::NotIncreasing { previous: 5, value: 3 })
        );
        assert_eq!(StepSequence::from_values([]), Err(StepError::Empty));
    }

    #[test]
    fn invalid_runs_are_rejected() {
        let zero = StepDefinition {
            runs: vec![StepRun { start: 1, end: 10, step: 0 }],
            tail: vec![],
        };
        assert_eq!(
            StepSequence::build(&zero),
            Err(StepError::ZeroStep { start: 1, end: 10 })
        );
        let reversed = StepDefinition {
            runs: vec![StepRun { start: 10, end: 1, step: 1 }],
            tail: vec![],
        };
        assert!(matches!(
            StepSequence::build(&reversed),
            Err(StepError::Reversed { .. })
        ));
    }

    #[test]
    fn deserializing_validates() {
        let s: StepSequence = serde_json::from_str("[1, 2, 2, 5]").unwrap();
        assert_eq!(s.as_slice(), &[1, 2, 5]);
        assert!(serde_json::from_str::<StepSequence>("[]").is_err());
        assert_eq!(serde_json::to_string(&s).unwrap(), "[1,2,5]");
    }

    #[test]
    fn empty_slice_has_no_nearest() {
        assert_eq!(snap_to_nearest(5, &[]), None);
    }

    proptest! {
        #[test]
        fn snap_is_idempotent(x in any::<i64>()) {
            let s = tickets();
            let once = s.snap(x);
            prop_assert_eq!(s.snap(once as i64), once);
        }

        #[test]
        fn snap_is_a_member_and_nothing_is_closer(x in -100_000i64..200_000) {
            let s = tickets();
            let snapped = s.snap(x);
            prop_assert!(s.index_of(snapped).is_some());
            let best = (i128::from(x) - i128::from(snapped)).unsigned_abs();
            for &step in s.as_slice() {
                prop_assert!((i128::from(x) - i128::from(step)).unsigned_abs() >= best);
            }
        }

        #[test]
        fn snap_works_on_arbitrary_sequences(
            values in proptest::collection::vec(0u64..1_000_000, 1..40),
            x in any::<i64>(),
        ) {
            let mut values = values;
            values.sort_unstable();
            let s = StepSequence::from_values(values).unwrap();
            let once = s.snap(x);
            prop_assert_eq!(s.snap(once as i64), once);
        }
    }
}
