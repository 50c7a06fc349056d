//! Raw form input to typed calculator inputs.
//!
//! Each form holds the text a user typed per field (`None` for untouched
//! fields). Resolution never fails: text is parsed leniently, clamped to the
//! profile's range and, for stepped fields, snapped to the nearest step.

use roi_core::input::to_count;
use roi_core::{
    parse_leading_number, ChurnInputs, ConversionInputs, Percent, StepSequence, SupportInputs,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::profile::{CalculatorProfiles, PricingBasis, TicketsInput};

/// Snap lenient text onto a step sequence, falling back to its first step.
fn snap_text(steps: &StepSequence, text: &str) -> u64 {
    let value = parse_leading_number(text)
        .filter(|v| !v.is_zero())
        .map(|v| {
            v.trunc().to_i64().unwrap_or(if v.is_sign_negative() {
                i64::MIN
            } else {
                i64::MAX
            })
        });
    match value {
        Some(v) => steps.snap(v),
        None => steps.min(),
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportForm {
    pub tickets: Option<String>,
    pub minutes: Option<String>,
    pub hourly_rate: Option<String>,
    pub reduction: Option<String>,
    pub users: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChurnForm {
    pub customers: Option<String>,
    pub arpc: Option<String>,
    pub churn_rate: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionForm {
    pub trials: Option<String>,
    /// Slider position; ignored when `trials` is given.
    pub trial_index: Option<usize>,
    pub conversion: Option<String>,
    pub arpu: Option<String>,
}

impl SupportForm {
    pub fn resolve(&self, profiles: &CalculatorProfiles) -> SupportInputs {
        let p = &profiles.support;
        let tickets = match (p.tickets_input, self.tickets.as_deref()) {
            (TicketsInput::Stepped, Some(text)) => snap_text(&profiles.ticket_steps, text),
            (_, raw) => to_count(p.tickets.resolve(raw)),
        };
        let user_count = to_count(p.users.resolve(self.users.as_deref()));
        let usage = match p.pricing_basis {
            PricingBasis::UserCount => user_count,
            PricingBasis::TicketVolume => tickets,
        };
        let inputs = SupportInputs {
            tickets_per_month: tickets,
            time_per_ticket_minutes: p.time_per_ticket.resolve(self.minutes.as_deref()),
            hourly_rate: p.hourly_rate.resolve(self.hourly_rate.as_deref()),
            ticket_reduction: p.ticket_reduction.resolve(self.reduction.as_deref()),
            user_count,
            monthly_payment_tier: p.price_table().resolve(usage),
        };
        debug!(?inputs, "resolved support form");
        inputs
    }
}

impl ChurnForm {
    /// Typed inputs and the plan price for the resolved customer count.
    pub fn resolve(&self, profiles: &CalculatorProfiles) -> (ChurnInputs, Decimal) {
        let p = &profiles.churn;
        let customers = match self.customers.as_deref() {
            Some(text) => snap_text(&profiles.customer_steps, text),
            None => profiles.customer_steps.snap(clamped_i64(p.default_customers)),
        };
        let inputs = ChurnInputs {
            customer_count: customers,
            average_revenue_per_customer: p.arpc.resolve(self.arpc.as_deref()),
            current_churn_rate: Percent(p.churn_rate.resolve(self.churn_rate.as_deref()))
                .to_fraction(),
            potential_churn_reduction: p.churn_reduction.resolve(None).to_fraction(),
        };
        debug!(?inputs, "resolved churn form");
        (inputs, p.pricing.resolve(customers))
    }
}

impl ConversionForm {
    /// Typed inputs and the plan price for the resolved trial volume.
    pub fn resolve(&self, profiles: &CalculatorProfiles) -> (ConversionInputs, Decimal) {
        let p = &profiles.conversion;
        let steps = &profiles.trial_steps;
        let trials = match (self.trials.as_deref(), self.trial_index) {
            (Some(text), _) => snap_text(steps, text),
            (None, Some(index)) => steps.value_at(index),
            (None, None) => steps.value_at(p.default_trial_index),
        };
        let inputs = ConversionInputs {
            monthly_trials: trials,
            current_conversion: Percent(p.conversion.resolve(self.conversion.as_deref()))
                .to_fraction(),
            conversion_uplift: p.uplift.resolve(None).to_fraction(),
            monthly_arpu: p.arpu.resolve(self.arpu.as_deref()),
        };
        debug!(?inputs, "resolved conversion form");
        (inputs, p.pricing.resolve(trials))
    }
}

fn clamped_i64(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use roi_core::Fraction;

    fn profiles() -> CalculatorProfiles {
        CalculatorProfiles::embedded().unwrap()
    }

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn untouched_support_form_uses_defaults() {
        let i = SupportForm::default().resolve(&profiles());
        assert_eq!(i.tickets_per_month, 150);
        assert_eq!(i.time_per_ticket_minutes, Decimal::from(15));
        assert_eq!(i.hourly_rate, Decimal::from(50));
        assert_eq!(i.ticket_reduction, Percent::from_int(25));
        assert_eq!(i.user_count, 1000);
        assert_eq!(i.monthly_payment_tier, Decimal::from(449));
    }

    #[test]
    fn support_fields_clamp() {
        let form = SupportForm {
            tickets: some("-20"),
            minutes: some("1"),
            hourly_rate: some("1000"),
            reduction: some("99"),
            users: some("120000"),
        };
        let i = form.resolve(&profiles());
        assert_eq!(i.tickets_per_month, 0);
        assert_eq!(i.time_per_ticket_minutes, Decimal::from(5));
        assert_eq!(i.hourly_rate, Decimal::from(100));
        assert_eq!(i.ticket_reduction, Percent::from_int(70));
        assert_eq!(i.user_count, 120000);
        assert_eq!(i.monthly_payment_tier, Decimal::from(5999));
    }

    #[test]
    fn slider_fields_land_on_their_step() {
        let form = SupportForm {
            minutes: some("17"),
            reduction: some("23"),
            hourly_rate: some("37"),
            ..Default::default()
        };
        let i = form.resolve(&profiles());
        assert_eq!(i.time_per_ticket_minutes, Decimal::from(15));
        assert_eq!(i.ticket_reduction, Percent::from_int(25));
        // typed fields keep any value in range
        assert_eq!(i.hourly_rate, Decimal::from(37));
    }

    #[test]
    fn stepped_tickets_snap_and_price_by_volume() {
        let mut p = profiles();
        p.support.tickets_input = TicketsInput::Stepped;
        p.support.pricing_basis = PricingBasis::TicketVolume;
        let form = SupportForm {
            tickets: some("2200"),
            ..Default::default()
        };
        let i = form.resolve(&p);
        assert_eq!(i.tickets_per_month, 2000);
        assert_eq!(i.monthly_payment_tier, Decimal::from(189));
    }

    #[test]
    fn churn_customers_snap_and_reduction_is_fixed() {
        let form = ChurnForm {
            customers: some("1740"),
            arpc: some("abc"),
            churn_rate: some("7.5"),
        };
        let (i, price) = form.resolve(&profiles());
        assert_eq!(i.customer_count, 1600);
        assert_eq!(i.average_revenue_per_customer, Decimal::ONE);
        assert_eq!(i.current_churn_rate, Fraction(Decimal::new(75, 3)));
        assert_eq!(i.potential_churn_reduction, Fraction(Decimal::new(3, 1)));
        assert_eq!(price, Decimal::from(189));
    }

    #[test]
    fn churn_defaults() {
        let (i, price) = ChurnForm::default().resolve(&profiles());
        assert_eq!(i.customer_count, 1000);
        assert_eq!(i.average_revenue_per_customer, Decimal::from(50));
        assert_eq!(i.current_churn_rate, Fraction(Decimal::new(5, 2)));
        assert_eq!(price, Decimal::from(139));
    }

    #[test]
    fn conversion_trials_from_text_index_or_default() {
        let p = profiles();
        let (i, _) = ConversionForm::default().resolve(&p);
        assert_eq!(i.monthly_trials, 350);
        assert_eq!(i.current_conversion, Fraction(Decimal::new(14, 2)));
        assert_eq!(i.monthly_arpu, Decimal::from(100));

        let by_index = ConversionForm {
            trial_index: Some(10_000),
            ..Default::default()
        };
        let (i, price) = by_index.resolve(&p);
        assert_eq!(i.monthly_trials, 10000);
        assert_eq!(price, Decimal::from(339));

        let by_text = ConversionForm {
            trials: some("0"),
            trial_index: Some(3),
            ..Default::default()
        };
        assert_eq!(by_text.resolve(&p).0.monthly_trials, 50);
    }

    proptest! {
        #[test]
        fn resolved_values_stay_in_range(text in "\\PC{0,12}") {
            let p = profiles();
            let form = SupportForm {
                tickets: Some(text.clone()),
                minutes: Some(text.clone()),
                hourly_rate: Some(text.clone()),
                reduction: Some(text.clone()),
                users: Some(text.clone()),
            };
            let i = form.resolve(&p);
            prop_assert!(p.support.time_per_ticket.range.contains(i.time_per_ticket_minutes));
            prop_assert!(p.support.hourly_rate.range.contains(i.hourly_rate));
            prop_assert!(i.tickets_per_month <= 1_000_000);

            let (c, _) = ChurnForm { customers: Some(text.clone()), arpc: Some(text.clone()), churn_rate: Some(text) }.resolve(&p);
            prop_assert!(p.customer_steps.index_of(c.customer_count).is_some());
            prop_assert!(c.current_churn_rate.value() >= Decimal::new(1, 2));
            prop_assert!(c.current_churn_rate.value() <= Decimal::new(2, 1));
        }
    }
}
