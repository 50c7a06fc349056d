//! Calculator profiles: the business constants of every calculator.
//!
//! Ranges, defaults, fixed rates, price tables and step runs are loaded from
//! YAML. A default profile is compiled into the binary.

use std::path::Path;

use roi_core::{InputRange, Percent, StepDefinition, StepError, StepSequence};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::calc::TicketReductionBasis;
use crate::pricing::PriceTable;

const DEFAULT_PROFILE_YAML: &str = include_str!("../../../assets/profiles/default.yaml");

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("failed to read profile {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse profile: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid {name} steps: {source}")]
    Steps {
        name: &'static str,
        #[source]
        source: StepError,
    },
    #[error("invalid range for {0}")]
    Range(&'static str),
    #[error("default of {0} lies outside its range")]
    Default(&'static str),
}

/// A numeric input with its default and valid range.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldSetting {
    pub default: Decimal,
    pub range: InputRange,
    /// Truncate parsed values to whole numbers.
    #[serde(default)]
    pub whole: bool,
    /// Only values on the slider grid (`range.step`) can be entered.
    #[serde(default)]
    pub slider_only: bool,
}

impl FieldSetting {
    /// Default when no text was entered, lenient parse plus clamp otherwise.
    pub fn resolve(&self, raw: Option<&str>) -> Decimal {
        match raw {
            None => self.default,
            Some(text) => {
                let mut v = self.range.parse(text);
                if self.slider_only {
                    v = self.range.align(v);
                }
                if self.whole {
                    self.range.clamp(v.trunc())
                } else {
                    v
                }
            }
        }
    }

    fn validate(&self, name: &'static str) -> Result<(), ProfileError> {
        if !self.range.is_valid() {
            return Err(ProfileError::Range(name));
        }
        if self.slider_only && self.range.step.is_none() {
            return Err(ProfileError::Range(name));
        }
        if !self.range.contains(self.default) {
            return Err(ProfileError::Default(name));
        }
        Ok(())
    }
}

/// A rate percentage that is either fixed by the product or user adjustable.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RateSetting {
    Fixed { percent: Decimal },
    Adjustable(FieldSetting),
}

impl RateSetting {
    /// Fixed rates ignore user input.
    pub fn resolve(&self, raw: Option<&str>) -> Percent {
        match self {
            RateSetting::Fixed { percent } => Percent(*percent),
            RateSetting::Adjustable(field) => Percent(field.resolve(raw)),
        }
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self, RateSetting::Fixed { .. })
    }

    fn validate(&self, name: &'static str) -> Result<(), ProfileError> {
        match self {
            RateSetting::Fixed { percent } => {
                if *percent < Decimal::ZERO || *percent > Decimal::ONE_HUNDRED {
                    return Err(ProfileError::Range(name));
                }
                Ok(())
            }
            RateSetting::Adjustable(field) => {
                let percent = InputRange::new(Decimal::ZERO, Decimal::ONE_HUNDRED);
                if !percent.contains(field.range.min) || !percent.contains(field.range.max) {
                    return Err(ProfileError::Range(name));
                }
                field.validate(name)
            }
        }
    }
}

/// How the support ticket volume is entered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketsInput {
    /// Any whole number within range.
    #[default]
    Free,
    /// Snapped to the ticket step sequence.
    Stepped,
}

/// Usage metric that selects the support plan price.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingBasis {
    #[default]
    UserCount,
    TicketVolume,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SupportPricing {
    pub user_count: PriceTable,
    pub ticket_volume: PriceTable,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SupportProfile {
    #[serde(default)]
    pub tickets_input: TicketsInput,
    #[serde(default)]
    pub pricing_basis: PricingBasis,
    #[serde(default)]
    pub reduction_basis: TicketReductionBasis,
    pub tickets: FieldSetting,
    pub time_per_ticket: FieldSetting,
    pub hourly_rate: FieldSetting,
    pub ticket_reduction: RateSetting,
    pub users: FieldSetting,
    pub pricing: SupportPricing,
}

impl SupportProfile {
    pub fn price_table(&self) -> &PriceTable {
        match self.pricing_basis {
            PricingBasis::UserCount => &self.pricing.user_count,
            PricingBasis::TicketVolume => &self.pricing.ticket_volume,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChurnProfile {
    pub default_customers: u64,
    pub arpc: FieldSetting,
    pub churn_rate: FieldSetting,
    pub churn_reduction: RateSetting,
    pub pricing: PriceTable,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversionProfile {
    /// Slider position of the default trial volume.
    pub default_trial_index: usize,
    pub conversion: FieldSetting,
    pub arpu: FieldSetting,
    pub uplift: RateSetting,
    pub pricing: PriceTable,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepsConfig {
    pub tickets: StepDefinition,
    pub customers: StepDefinition,
    pub trials: StepDefinition,
}

/// Raw profile file contents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProfileFile {
    pub support: SupportProfile,
    pub churn: ChurnProfile,
    pub conversion: ConversionProfile,
    pub steps: StepsConfig,
}

/// Validated profiles with their step sequences built.
#[derive(Clone, Debug, PartialEq)]
pub struct CalculatorProfiles {
    pub support: SupportProfile,
    pub churn: ChurnProfile,
    pub conversion: ConversionProfile,
    pub ticket_steps: StepSequence,
    pub customer_steps: StepSequence,
    pub trial_steps: StepSequence,
}

fn build_steps(name: &'static str, def: &StepDefinition) -> Result<StepSequence, ProfileError> {
    StepSequence::build(def).map_err(|source| ProfileError::Steps { name, source })
}

impl CalculatorProfiles {
    /// The profile compiled into the binary.
    pub fn embedded() -> Result<Self, ProfileError> {
        Self::from_yaml(DEFAULT_PROFILE_YAML)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ProfileError> {
        let file: ProfileFile = serde_yaml::from_str(text)?;
        Self::from_file(file)
    }

    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        let text = std::fs::read_to_string(path).map_err(|source| ProfileError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let profiles = Self::from_yaml(&text)?;
        info!(path = %path.display(), "loaded calculator profiles");
        Ok(profiles)
    }

    pub fn from_file(file: ProfileFile) -> Result<Self, ProfileError> {
        let ticket_steps = build_steps("tickets", &file.steps.tickets)?;
        let customer_steps = build_steps("customers", &file.steps.customers)?;
        let trial_steps = build_steps("trials", &file.steps.trials)?;

        let s = &file.support;
        s.tickets.validate("support.tickets")?;
        s.time_per_ticket.validate("support.time_per_ticket")?;
        s.hourly_rate.validate("support.hourly_rate")?;
        s.ticket_reduction.validate("support.ticket_reduction")?;
        s.users.validate("support.users")?;
        if let TicketReductionBasis::PerUser { tickets_per_user } = s.reduction_basis {
            if tickets_per_user < Decimal::ZERO {
                return Err(ProfileError::Range("support.reduction_basis"));
            }
        }

        let c = &file.churn;
        c.arpc.validate("churn.arpc")?;
        c.churn_rate.validate("churn.churn_rate")?;
        c.churn_reduction.validate("churn.churn_reduction")?;

        let v = &file.conversion;
        v.conversion.validate("conversion.conversion")?;
        v.arpu.validate("conversion.arpu")?;
        v.uplift.validate("conversion.uplift")?;

        debug!(
            tickets = ticket_steps.as_slice().len(),
            customers = customer_steps.as_slice().len(),
            trials = trial_steps.as_slice().len(),
            "built step sequences"
        );

        Ok(Self {
            support: file.support,
            churn: file.churn,
            conversion: file.conversion,
            ticket_steps,
            customer_steps,
            trial_steps,
        })
    }
}
