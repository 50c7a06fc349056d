#![deny(warnings)]

//! Core domain models for the ROI calculators.
//!
//! This crate defines the serializable input and result records of the three
//! calculators (support cost, churn, conversion), the rate units they are
//! expressed in, slider step sequences, input clamping and display
//! formatting. Every record is a plain value recomputed on each input change.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub mod arith;
pub mod format;
pub mod input;
pub mod notice;
pub mod steps;
pub mod units;

pub use format::{format_currency, format_hours, format_number, format_percent};
pub use input::{clamp, parse_leading_number, to_count, InputRange};
pub use notice::{Notice, NoticeLevel};
pub use steps::{snap_to_nearest, StepDefinition, StepError, StepRun, StepSequence};
pub use units::{Fraction, Percent};

/// Months in a year, used for every monthly to annual projection.
pub const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// Round halves towards positive infinity, matching JavaScript `Math.round`.
pub fn round_half_up(value: Decimal) -> Decimal {
    arith::add(value, Decimal::new(5, 1)).floor()
}

/// A monthly amount and its annual projection.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Period {
    pub monthly: Decimal,
    /// Always `monthly * 12`.
    pub annual: Decimal,
}

impl Period {
    pub fn from_monthly(monthly: Decimal) -> Self {
        Self {
            monthly,
            annual: arith::mul(monthly, MONTHS_PER_YEAR),
        }
    }
}

/// Gross benefit, product plan cost, and what is left after paying for it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetImpact {
    pub gross: Period,
    /// Monthly subscription price of the plan being evaluated.
    pub plan_price: Decimal,
    pub net: Period,
}

impl NetImpact {
    pub fn new(gross_monthly: Decimal, plan_price: Decimal) -> Self {
        Self {
            gross: Period::from_monthly(gross_monthly),
            plan_price,
            net: Period::from_monthly(arith::sub(gross_monthly, plan_price)),
        }
    }
}

/// Inputs of the support-cost calculator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SupportInputs {
    /// Support tickets handled per month.
    pub tickets_per_month: u64,
    /// Average handling time per ticket, in minutes.
    pub time_per_ticket_minutes: Decimal,
    /// Loaded cost of a support hour in USD.
    pub hourly_rate: Decimal,
    /// Expected share of tickets eliminated.
    pub ticket_reduction: Percent,
    /// Active end users of the product.
    pub user_count: u64,
    /// Monthly price of the plan, subtracted from gross savings.
    pub monthly_payment_tier: Decimal,
}

/// Results of the support-cost calculator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SupportResults {
    /// Hours spent on tickets per month.
    pub total_time_spent_hours: Decimal,
    /// Monthly cost of that time in USD.
    pub total_cost: Decimal,
    pub estimated_savings: Period,
    /// Tickets avoided per month, rounded half up.
    pub potential_tickets_reduced: i64,
    pub net_savings: Period,
}

/// Inputs of the churn calculator. Rates are fractions of one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChurnInputs {
    pub customer_count: u64,
    /// Monthly revenue per customer in USD.
    pub average_revenue_per_customer: Decimal,
    /// Share of customers lost per month.
    pub current_churn_rate: Fraction,
    /// Relative reduction applied to the churn rate.
    pub potential_churn_reduction: Fraction,
}

/// Results of the churn calculator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChurnResults {
    pub current_churn_rate: Fraction,
    /// `current_churn_rate * (1 - potential_churn_reduction)`.
    pub reduced_churn_rate: Fraction,
    /// Customers kept per month that would otherwise churn (unrounded).
    pub retained_customers: Decimal,
    /// `retained_customers` rounded half up, as shown in reports.
    pub customers_saved: i64,
    pub monthly_savings: Decimal,
    pub annual_savings: Decimal,
    /// Annual savings as a share of the annual revenue currently lost to churn.
    pub roi: Fraction,
}

/// Inputs of the trial conversion calculator. Rates are fractions of one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversionInputs {
    pub monthly_trials: u64,
    pub current_conversion: Fraction,
    /// Relative improvement of the conversion rate.
    pub conversion_uplift: Fraction,
    /// Monthly revenue per converted user in USD.
    pub monthly_arpu: Decimal,
}

/// Results of the trial conversion calculator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversionResults {
    pub original_conversions: Decimal,
    pub new_conversions: Decimal,
    /// Always `new_conversions - original_conversions`.
    pub additional_conversions: Decimal,
    pub monthly_revenue: Decimal,
    pub annual_revenue: Decimal,
}

/// The three calculator scenarios.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculatorKind {
    Support,
    Churn,
    Conversion,
}

impl CalculatorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CalculatorKind::Support => "support",
            CalculatorKind::Churn => "churn",
            CalculatorKind::Conversion => "conversion",
        }
    }
}
