use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use roi_leads::{Lead, DEFAULT_TRACK_URL};

pub const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_SHA"),
    " ",
    env!("BUILD_DATE"),
    ")"
);

/// ROI calculators for support cost, churn and trial conversion.
#[derive(Debug, Parser)]
#[command(name = "roi", version = VERSION, about)]
pub struct Cli {
    #[command(flatten)]
    pub common: CommonArgs,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct CommonArgs {
    /// Calculator profile YAML replacing the built-in one
    #[arg(long, global = true, env = "ROI_PROFILES")]
    pub profiles: Option<PathBuf>,
    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,
    /// Write the PDF report into this directory
    #[arg(long, global = true, value_name = "DIR")]
    pub pdf: Option<PathBuf>,
    /// Report template file replacing the built-in one
    #[arg(long, global = true, value_name = "FILE")]
    pub template: Option<PathBuf>,
    /// Logo image, a file path or an http(s) URL
    #[arg(long, global = true, value_name = "PATH_OR_URL")]
    pub logo: Option<String>,
    /// Device pixels per page pixel
    #[arg(long, global = true, default_value_t = 2, value_parser = clap::value_parser!(u32).range(1..=4))]
    pub scale: u32,
    /// Render time limit in seconds
    #[arg(long, global = true, default_value_t = 10)]
    pub render_timeout: u64,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Support cost savings from fewer tickets
    Support {
        #[arg(long)]
        tickets: Option<String>,
        /// Minutes per ticket
        #[arg(long)]
        minutes: Option<String>,
        #[arg(long)]
        hourly_rate: Option<String>,
        /// Ticket reduction in percent
        #[arg(long)]
        reduction: Option<String>,
        #[arg(long)]
        users: Option<String>,
    },
    /// Revenue kept by reducing churn
    Churn {
        #[arg(long)]
        customers: Option<String>,
        /// Average monthly revenue per customer
        #[arg(long)]
        arpc: Option<String>,
        /// Monthly churn rate in percent
        #[arg(long)]
        churn_rate: Option<String>,
        #[command(flatten)]
        lead: LeadArgs,
    },
    /// Revenue from better trial conversion
    Conversion {
        #[arg(long, conflicts_with = "trial_index")]
        trials: Option<String>,
        /// Position on the trial volume slider
        #[arg(long)]
        trial_index: Option<usize>,
        /// Trial conversion rate in percent
        #[arg(long)]
        conversion: Option<String>,
        #[arg(long)]
        arpu: Option<String>,
    },
    /// Print a slider step sequence
    Steps {
        #[arg(value_enum)]
        sequence: StepsKind,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StepsKind {
    Tickets,
    Customers,
    Trials,
}

/// Contact details required before the churn report is released.
#[derive(Debug, Default, Args)]
pub struct LeadArgs {
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub company: Option<String>,
    #[arg(long, env = "CUSTOMERIO_SITE_ID", hide_env_values = true, hide = true)]
    pub site_id: Option<String>,
    #[arg(long, env = "CUSTOMERIO_API_KEY", hide_env_values = true, hide = true)]
    pub api_key: Option<String>,
    #[arg(long, env = "CUSTOMERIO_TRACK_URL", default_value = DEFAULT_TRACK_URL, hide = true)]
    pub track_url: String,
}

impl LeadArgs {
    pub fn lead(&self) -> Lead {
        Lead {
            email: self.email.clone().unwrap_or_default(),
            first_name: self.first_name.clone().unwrap_or_default(),
            last_name: self.last_name.clone(),
            company: self.company.clone(),
        }
    }

    pub fn lookup(&self, key: &str) -> Option<String> {
        match key {
            "CUSTOMERIO_SITE_ID" => self.site_id.clone(),
            "CUSTOMERIO_API_KEY" => self.api_key.clone(),
            _ => None,
        }
    }
}
