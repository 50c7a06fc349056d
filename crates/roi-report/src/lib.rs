#![deny(warnings)]

//! PDF report generation for the ROI calculators.
//!
//! A report is a template in a small line-oriented markup. Named values from
//! [`roi_econ::ReportData`] are substituted literally, the result is parsed
//! into blocks, drawn onto a bitmap by a [`ViewRenderer`] and wrapped into a
//! single-page PDF.

use std::time::Duration;

use thiserror::Error;

pub mod assets;
pub mod font;
pub mod markup;
pub mod pdf;
pub mod pipeline;
pub mod render;
pub mod template;

pub use markup::{parse, Block, Row};
pub use pipeline::{GeneratedReport, ReportOptions, ReportPipeline};
pub use render::{BitmapRenderer, RenderError, ReportView, ViewRenderer};
pub use template::{builtin_template, substitute};

/// Failures that abort a report. Asset problems are not among them.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("rendering did not complete within {0:?}")]
    RenderTimeout(Duration),
    #[error("renderer stopped without signalling completion")]
    RenderAborted,
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("failed to assemble PDF: {0}")]
    Pdf(String),
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
