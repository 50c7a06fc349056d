//! Report data assembly: bundle inputs, results and plan cost into the
//! record handed to the rendering pipeline.

use std::collections::BTreeMap;

use roi_core::{
    format_currency, format_hours, format_number, format_percent, CalculatorKind, ChurnInputs,
    ChurnResults, ConversionInputs, ConversionResults, NetImpact, SupportInputs, SupportResults,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SupportReport {
    pub inputs: SupportInputs,
    pub results: SupportResults,
    pub net: NetImpact,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChurnReport {
    pub inputs: ChurnInputs,
    pub results: ChurnResults,
    pub net: NetImpact,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversionReport {
    pub inputs: ConversionInputs,
    pub results: ConversionResults,
    pub net: NetImpact,
}

/// Everything a report needs, one variant per calculator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportData {
    Support(SupportReport),
    Churn(ChurnReport),
    Conversion(ConversionReport),
}

pub fn assemble_support(
    inputs: &SupportInputs,
    results: &SupportResults,
    plan_price: Decimal,
) -> ReportData {
    ReportData::Support(SupportReport {
        inputs: inputs.clone(),
        results: results.clone(),
        net: NetImpact::new(results.estimated_savings.monthly, plan_price),
    })
}

pub fn assemble_churn(inputs: &ChurnInputs, results: &ChurnResults, plan_price: Decimal) -> ReportData {
    ReportData::Churn(ChurnReport {
        inputs: inputs.clone(),
        results: results.clone(),
        net: NetImpact::new(results.monthly_savings, plan_price),
    })
}

pub fn assemble_conversion(
    inputs: &ConversionInputs,
    results: &ConversionResults,
    plan_price: Decimal,
) -> ReportData {
    ReportData::Conversion(ConversionReport {
        inputs: inputs.clone(),
        results: results.clone(),
        net: NetImpact::new(results.monthly_revenue, plan_price),
    })
}

/// File name a generated report is saved under.
pub fn report_file_name(kind: CalculatorKind) -> &'static str {
    match kind {
        CalculatorKind::Support => "product-fruits-support-savings-report.pdf",
        CalculatorKind::Churn => "product-fruits-roi-report.pdf",
        CalculatorKind::Conversion => "product-fruits-conversion-uplift-report.pdf",
    }
}

impl ReportData {
    pub fn kind(&self) -> CalculatorKind {
        match self {
            ReportData::Support(_) => CalculatorKind::Support,
            ReportData::Churn(_) => CalculatorKind::Churn,
            ReportData::Conversion(_) => CalculatorKind::Conversion,
        }
    }

    pub fn file_name(&self) -> &'static str {
        report_file_name(self.kind())
    }

    pub fn net(&self) -> &NetImpact {
        match self {
            ReportData::Support(r) => &r.net,
            ReportData::Churn(r) => &r.net,
            ReportData::Conversion(r) => &r.net,
        }
    }

    /// Display-ready values keyed by template placeholder name.
    pub fn placeholders(&self) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        let mut put = |k: &str, v: String| {
            out.insert(k.to_string(), v);
        };
        let net = self.net();
        put("planPrice", format_currency(net.plan_price));
        match self {
            ReportData::Support(r) => {
                let (i, res) = (&r.inputs, &r.results);
                put("ticketsPerMonth", format_number(Decimal::from(i.tickets_per_month)));
                put("timePerTicket", format_number(i.time_per_ticket_minutes));
                put("hourlyRate", format_currency(i.hourly_rate));
                put("ticketReduction", format_percent(i.ticket_reduction.to_fraction()));
                put("userCount", format_number(Decimal::from(i.user_count)));
                put("totalTimeSpent", format_hours(res.total_time_spent_hours));
                put("totalCost", format_currency(res.total_cost));
                put("monthlySavings", format_currency(res.estimated_savings.monthly));
                put("annualSavings", format_currency(res.estimated_savings.annual));
                put("ticketsReduced", format_number(Decimal::from(res.potential_tickets_reduced)));
                put("netMonthlySavings", format_currency(net.net.monthly));
                put("netAnnualSavings", format_currency(net.net.annual));
            }
            ReportData::Churn(r) => {
                let (i, res) = (&r.inputs, &r.results);
                put("customerCount", format_number(Decimal::from(i.customer_count)));
                put("averageRevenuePerCustomer", format_currency(i.average_revenue_per_customer));
                put("currentChurnRate", format_percent(res.current_churn_rate));
                put("reducedChurnRate", format_percent(res.reduced_churn_rate));
                put("churnReduction", format_percent(i.potential_churn_reduction));
                put("customersSaved", format_number(Decimal::from(res.customers_saved)));
                put("savedCustomers", format_number(Decimal::from(res.customers_saved)));
                put("monthlySavings", format_currency(res.monthly_savings));
                put("annualSavings", format_currency(res.annual_savings));
                put("roi", format_percent(res.roi));
                put("netMonthlyRevenue", format_currency(net.net.monthly));
                put("netAnnualRevenue", format_currency(net.net.annual));
                put("yearlyNetRevenue", format_currency(net.net.annual));
            }
            ReportData::Conversion(r) => {
                let (i, res) = (&r.inputs, &r.results);
                put("monthlyTrials", format_number(Decimal::from(i.monthly_trials)));
                put("currentConversion", format_percent(i.current_conversion));
                put("conversionUplift", format_percent(i.conversion_uplift));
                put("monthlyArpu", format_currency(i.monthly_arpu));
                put("originalConversions", format_number(res.original_conversions));
                put("newConversions", format_number(res.new_conversions));
                put("additionalConversions", format_number(res.additional_conversions));
                put("monthlyRevenue", format_currency(res.monthly_revenue));
                put("annualRevenue", format_currency(res.annual_revenue));
                put("netMonthlyRevenue", format_currency(net.net.monthly));
                put("netAnnualRevenue", format_currency(net.net.annual));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::{calculate_churn, calculate_conversion, calculate_support, TicketReductionBasis};
    use roi_core::{Fraction, Percent};

    fn churn_report() -> ReportData {
        let inputs = ChurnInputs {
            customer_count: 1000,
            average_revenue_per_customer: Decimal::from(50),
            current_churn_rate: Fraction(Decimal::new(5, 2)),
            potential_churn_reduction: Fraction(Decimal::new(3, 1)),
        };
        let results = calculate_churn(&inputs);
        assemble_churn(&inputs, &results, Decimal::from(139))
    }

    #[test]
    fn churn_net_impact_and_placeholders() {
        let report = churn_report();
        assert_eq!(report.kind(), CalculatorKind::Churn);
        assert_eq!(report.file_name(), "product-fruits-roi-report.pdf");
        assert_eq!(report.net().net.monthly, Decimal::from(611));
        let p = report.placeholders();
        assert_eq!(p["monthlySavings"], "$750");
        assert_eq!(p["planPrice"], "$139");
        assert_eq!(p["netAnnualRevenue"], "$7,332");
        assert_eq!(p["currentChurnRate"], "5.0%");
        assert_eq!(p["reducedChurnRate"], "3.5%");
        assert_eq!(p["customersSaved"], "15");
        assert_eq!(p["roi"], "30.0%");
        assert_eq!(p["savedCustomers"], p["customersSaved"]);
        assert_eq!(p["yearlyNetRevenue"], "$7,332");
    }

    #[test]
    fn support_uses_estimated_savings_as_gross() {
        let inputs = SupportInputs {
            tickets_per_month: 150,
            time_per_ticket_minutes: Decimal::from(15),
            hourly_rate: Decimal::from(50),
            ticket_reduction: Percent::from_int(25),
            user_count: 1000,
            monthly_payment_tier: Decimal::from(449),
        };
        let results = calculate_support(&inputs, TicketReductionBasis::default());
        let report = assemble_support(&inputs, &results, inputs.monthly_payment_tier);
        assert_eq!(report.net().gross, results.estimated_savings);
        assert_eq!(report.net().net, results.net_savings);
        let p = report.placeholders();
        assert_eq!(p["totalTimeSpent"], "38 hrs");
        assert_eq!(p["totalCost"], "$1,875");
        assert_eq!(p["monthlySavings"], "$469");
        assert_eq!(p["ticketReduction"], "25.0%");
        assert_eq!(report.file_name(), "product-fruits-support-savings-report.pdf");
    }

    #[test]
    fn conversion_negative_net_is_formatted_with_sign() {
        let inputs = ConversionInputs {
            monthly_trials: 50,
            current_conversion: Fraction(Decimal::new(1, 2)),
            conversion_uplift: Fraction(Decimal::new(3, 1)),
            monthly_arpu: Decimal::from(10),
        };
        let results = calculate_conversion(&inputs);
        let report = assemble_conversion(&inputs, &results, Decimal::from(139));
        let p = report.placeholders();
        // 50 * 1% * 30% * $10 = $1.50 per month
        assert_eq!(p["netMonthlyRevenue"], "-$138");
        assert_eq!(p["additionalConversions"], "0");
        assert_eq!(report.file_name(), "product-fruits-conversion-uplift-report.pdf");
    }

    #[test]
    fn report_data_serializes_with_kind_tag() {
        let json = serde_json::to_value(churn_report()).unwrap();
        assert_eq!(json["kind"], "churn");
        let back: ReportData = serde_json::from_value(json).unwrap();
        assert_eq!(back, churn_report());
    }
}
