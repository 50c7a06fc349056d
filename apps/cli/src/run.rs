use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use roi_core::{CalculatorKind, Notice, StepSequence};
use roi_econ::{
    assemble_churn, assemble_conversion, assemble_support, calculate_churn, calculate_conversion,
    calculate_support, CalculatorProfiles, ChurnForm, ConversionForm, ReportData, SupportForm,
};
use roi_leads::{release_gated, Credentials, CustomerIoClient};
use roi_report::{ReportOptions, ReportPipeline};
use tracing::{debug, error, info};

use crate::args::{Cli, Command, CommonArgs, LeadArgs, StepsKind};

const LEAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Execute a parsed command line. `Ok(false)` means the requested action
/// failed and the user has already been told why.
pub async fn run(cli: Cli) -> Result<bool> {
    let profiles = match &cli.common.profiles {
        Some(path) => CalculatorProfiles::load(path)
            .with_context(|| format!("loading profiles from {}", path.display()))?,
        None => CalculatorProfiles::embedded().context("built-in profiles are invalid")?,
    };

    let (data, lead) = match cli.command {
        Command::Steps { sequence } => {
            print_steps(steps_for(&profiles, sequence), cli.common.json)?;
            return Ok(true);
        }
        Command::Support {
            tickets,
            minutes,
            hourly_rate,
            reduction,
            users,
        } => {
            let form = SupportForm {
                tickets,
                minutes,
                hourly_rate,
                reduction,
                users,
            };
            let inputs = form.resolve(&profiles);
            let results = calculate_support(&inputs, profiles.support.reduction_basis);
            let data = assemble_support(&inputs, &results, inputs.monthly_payment_tier);
            (data, None)
        }
        Command::Churn {
            customers,
            arpc,
            churn_rate,
            lead,
        } => {
            let form = ChurnForm {
                customers,
                arpc,
                churn_rate,
            };
            let (inputs, price) = form.resolve(&profiles);
            let data = assemble_churn(&inputs, &calculate_churn(&inputs), price);
            (data, Some(lead))
        }
        Command::Conversion {
            trials,
            trial_index,
            conversion,
            arpu,
        } => {
            let form = ConversionForm {
                trials,
                trial_index,
                conversion,
                arpu,
            };
            let (inputs, price) = form.resolve(&profiles);
            let data = assemble_conversion(&inputs, &calculate_conversion(&inputs), price);
            (data, None)
        }
    };

    print_report(&data, cli.common.json)?;

    let Some(out_dir) = cli.common.pdf.as_deref() else {
        return Ok(true);
    };
    let opts = report_options(&cli.common).await?;
    let notices = match lead {
        Some(lead) => gated_download(&lead, &data, &opts, out_dir).await,
        None => vec![ReportPipeline::default().download(&data, &opts, out_dir).await],
    };
    for notice in &notices {
        eprintln!("{notice}");
    }
    Ok(!notices.iter().any(Notice::is_error))
}

async fn report_options(common: &CommonArgs) -> Result<ReportOptions> {
    let template = match &common.template {
        Some(path) => Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading template {}", path.display()))?,
        ),
        None => None,
    };
    Ok(ReportOptions {
        template,
        logo: common.logo.clone(),
        scale: common.scale,
        render_timeout: Duration::from_secs(common.render_timeout),
        ..ReportOptions::default()
    })
}

/// The churn report is released only once the lead has been captured.
async fn gated_download(
    args: &LeadArgs,
    data: &ReportData,
    opts: &ReportOptions,
    out_dir: &Path,
) -> Vec<Notice> {
    let lead = args.lead();
    if let Err(err) = lead.validate() {
        return vec![err.notice()];
    }
    let client = match Credentials::from_lookup(|k| args.lookup(k))
        .and_then(|creds| CustomerIoClient::new(args.track_url.as_str(), creds, LEAD_TIMEOUT))
    {
        Ok(client) => client,
        Err(err) => {
            error!(error = %err, "lead capture is not configured");
            return vec![err.notice()];
        }
    };
    debug!(base = %args.track_url, "submitting lead before report download");
    release_gated(&client, &lead, || async {
        ReportPipeline::default().download(data, opts, out_dir).await
    })
    .await
}

fn steps_for(profiles: &CalculatorProfiles, kind: StepsKind) -> &StepSequence {
    match kind {
        StepsKind::Tickets => &profiles.ticket_steps,
        StepsKind::Customers => &profiles.customer_steps,
        StepsKind::Trials => &profiles.trial_steps,
    }
}

fn print_steps(steps: &StepSequence, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(steps)?);
    } else {
        for v in steps.as_slice() {
            println!("{v}");
        }
    }
    Ok(())
}

/// Labelled placeholder values shown in the text summary, in display order.
fn summary_fields(kind: CalculatorKind) -> &'static [(&'static str, &'static str)] {
    match kind {
        CalculatorKind::Support => &[
            ("Tickets per month", "ticketsPerMonth"),
            ("Minutes per ticket", "timePerTicket"),
            ("Hourly rate", "hourlyRate"),
            ("Ticket reduction", "ticketReduction"),
            ("Users", "userCount"),
            ("Time spent", "totalTimeSpent"),
            ("Support cost", "totalCost"),
            ("Tickets reduced", "ticketsReduced"),
            ("Monthly savings", "monthlySavings"),
            ("Annual savings", "annualSavings"),
            ("Plan price", "planPrice"),
            ("Net monthly savings", "netMonthlySavings"),
            ("Net annual savings", "netAnnualSavings"),
        ],
        CalculatorKind::Churn => &[
            ("Customers", "customerCount"),
            ("Revenue per customer", "averageRevenuePerCustomer"),
            ("Current churn", "currentChurnRate"),
            ("Reduced churn", "reducedChurnRate"),
            ("Customers saved", "customersSaved"),
            ("Monthly savings", "monthlySavings"),
            ("Annual savings", "annualSavings"),
            ("ROI", "roi"),
            ("Plan price", "planPrice"),
            ("Net monthly revenue", "netMonthlyRevenue"),
            ("Net annual revenue", "netAnnualRevenue"),
        ],
        CalculatorKind::Conversion => &[
            ("Monthly trials", "monthlyTrials"),
            ("Current conversion", "currentConversion"),
            ("Conversion uplift", "conversionUplift"),
            ("Monthly ARPU", "monthlyArpu"),
            ("Current conversions", "originalConversions"),
            ("New conversions", "newConversions"),
            ("Additional conversions", "additionalConversions"),
            ("Monthly revenue", "monthlyRevenue"),
            ("Annual revenue", "annualRevenue"),
            ("Plan price", "planPrice"),
            ("Net monthly revenue", "netMonthlyRevenue"),
            ("Net annual revenue", "netAnnualRevenue"),
        ],
    }
}

fn summary(data: &ReportData) -> Vec<(&'static str, String)> {
    let values = data.placeholders();
    summary_fields(data.kind())
        .iter()
        .filter_map(|(label, key)| values.get(*key).map(|v| (*label, v.clone())))
        .collect()
}

fn print_report(data: &ReportData, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(data)?);
        return Ok(());
    }
    info!(kind = data.kind().as_str(), "calculated");
    let rows = summary(data);
    let width = rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
    for (label, value) in rows {
        println!("{label:<width$}  {value}");
    }
    Ok(())
}
