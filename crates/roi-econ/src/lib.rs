#![deny(warnings)]

//! Economics of the ROI calculators.
//!
//! - Plan pricing tables keyed by usage
//! - The support, churn and conversion calculators
//! - Report data assembly for the PDF pipeline
//! - Calculator profiles (YAML) and raw form resolution

pub mod assemble;
pub mod calc;
pub mod form;
pub mod pricing;
pub mod profile;

pub use assemble::{
    assemble_churn, assemble_conversion, assemble_support, report_file_name, ChurnReport,
    ConversionReport, ReportData, SupportReport,
};
pub use calc::{calculate_churn, calculate_conversion, calculate_support, TicketReductionBasis};
pub use form::{ChurnForm, ConversionForm, SupportForm};
pub use pricing::{PriceTable, PriceTier, PricingError};
pub use profile::{CalculatorProfiles, FieldSetting, ProfileError, RateSetting};
