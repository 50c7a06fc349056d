//! The three closed-form ROI calculators.
//!
//! Every function here is total: saturating arithmetic, division by zero
//! yields zero, nothing panics. Rates are fractions of one.

use roi_core::arith::{add, div, mul, sub};
use roi_core::{
    round_half_up, ChurnInputs, ChurnResults, ConversionInputs, ConversionResults, Fraction,
    Period, SupportInputs, SupportResults, MONTHS_PER_YEAR,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const MINUTES_PER_HOUR: Decimal = Decimal::from_parts(60, 0, 0, false, 0);

/// How the support calculator estimates the number of tickets avoided.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TicketReductionBasis {
    /// Reduction applied to the monthly ticket volume.
    TicketVolume,
    /// Reduction applied to an estimated `user_count * tickets_per_user`.
    PerUser { tickets_per_user: Decimal },
}

impl Default for TicketReductionBasis {
    fn default() -> Self {
        TicketReductionBasis::PerUser {
            tickets_per_user: Decimal::new(5, 1),
        }
    }
}

fn rounded_count(value: Decimal) -> i64 {
    let r = round_half_up(value);
    r.to_i64().unwrap_or(if r.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// Support cost savings from deflecting tickets.
pub fn calculate_support(inputs: &SupportInputs, basis: TicketReductionBasis) -> SupportResults {
    let tickets = Decimal::from(inputs.tickets_per_month);
    let reduction = inputs.ticket_reduction.to_fraction().value();

    let total_time_spent_hours = div(
        mul(tickets, inputs.time_per_ticket_minutes),
        MINUTES_PER_HOUR,
    );
    let total_cost = mul(total_time_spent_hours, inputs.hourly_rate);
    let monthly_savings = mul(total_cost, reduction);

    let ticket_base = match basis {
        TicketReductionBasis::TicketVolume => tickets,
        TicketReductionBasis::PerUser { tickets_per_user } => {
            mul(Decimal::from(inputs.user_count), tickets_per_user)
        }
    };

    SupportResults {
        total_time_spent_hours,
        total_cost,
        estimated_savings: Period::from_monthly(monthly_savings),
        potential_tickets_reduced: rounded_count(mul(ticket_base, reduction)),
        net_savings: Period::from_monthly(sub(monthly_savings, inputs.monthly_payment_tier)),
    }
}

/// Revenue kept by lowering the monthly churn rate.
pub fn calculate_churn(inputs: &ChurnInputs) -> ChurnResults {
    let customers = Decimal::from(inputs.customer_count);
    let arpc = inputs.average_revenue_per_customer;
    let churn = inputs.current_churn_rate.value();

    let reduced = mul(churn, inputs.potential_churn_reduction.complement().value());
    let retained = mul(customers, sub(churn, reduced));
    let monthly_savings = mul(retained, arpc);
    let annual_savings = mul(monthly_savings, MONTHS_PER_YEAR);

    // Annual revenue currently lost to churn.
    let lost = mul(mul(mul(customers, arpc), churn), MONTHS_PER_YEAR);

    ChurnResults {
        current_churn_rate: inputs.current_churn_rate,
        reduced_churn_rate: Fraction(reduced),
        retained_customers: retained,
        customers_saved: rounded_count(retained),
        monthly_savings,
        annual_savings,
        roi: Fraction(div(annual_savings, lost)),
    }
}

/// Extra revenue from converting more trials into paying users.
pub fn calculate_conversion(inputs: &ConversionInputs) -> ConversionResults {
    let trials = Decimal::from(inputs.monthly_trials);
    let original = mul(trials, inputs.current_conversion.value());
    let new = mul(original, add(Decimal::ONE, inputs.conversion_uplift.value()));
    let additional = sub(new, original);
    let monthly_revenue = mul(additional, inputs.monthly_arpu);

    ConversionResults {
        original_conversions: original,
        new_conversions: new,
        additional_conversions: additional,
        monthly_revenue,
        annual_revenue: mul(monthly_revenue, MONTHS_PER_YEAR),
    }
}
