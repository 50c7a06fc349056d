//! The report generation pipeline.
//!
//! template -> placeholder substitution -> markup -> assets -> render
//! (blocking pool, explicit completion signal) -> PDF -> file.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use roi_core::Notice;
use roi_econ::ReportData;
use tokio::sync::oneshot;
use tracing::{debug, error, info};

use crate::assets::{load_logo, AssetSource};
use crate::markup::parse;
use crate::pdf::single_page_pdf;
use crate::render::{BitmapRenderer, ReportView, ViewRenderer};
use crate::template::{builtin_template, substitute};
use crate::ReportError;

#[derive(Clone, Debug)]
pub struct ReportOptions {
    /// Replaces the built-in template for the report kind.
    pub template: Option<String>,
    /// Logo location, a file path or an http(s) URL.
    pub logo: Option<String>,
    /// Device pixels per CSS pixel.
    pub scale: u32,
    pub render_timeout: Duration,
    pub asset_timeout: Duration,
    /// Value of the `today` placeholder; the current local date when unset.
    pub today: Option<String>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            template: None,
            logo: None,
            scale: 2,
            render_timeout: Duration::from_secs(10),
            asset_timeout: Duration::from_secs(5),
            today: None,
        }
    }
}

/// `1/2/2025`, the en-US short date.
fn date_label(date: chrono::NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

#[derive(Clone, Debug)]
pub struct GeneratedReport {
    pub file_name: &'static str,
    pub bytes: Vec<u8>,
}

/// Generates PDF reports. Cheap to clone; generations share nothing mutable.
#[derive(Clone)]
pub struct ReportPipeline {
    renderer: Arc<dyn ViewRenderer>,
}

impl Default for ReportPipeline {
    fn default() -> Self {
        Self::new(Arc::new(BitmapRenderer))
    }
}

impl ReportPipeline {
    pub fn new(renderer: Arc<dyn ViewRenderer>) -> Self {
        Self { renderer }
    }

    pub async fn generate(
        &self,
        data: &ReportData,
        opts: &ReportOptions,
    ) -> Result<GeneratedReport, ReportError> {
        let kind = data.kind();
        let template = opts
            .template
            .as_deref()
            .unwrap_or_else(|| builtin_template(kind));

        let mut values = data.placeholders();
        let today = opts
            .today
            .clone()
            .unwrap_or_else(|| date_label(chrono::Local::now().date_naive()));
        values.insert("today".to_string(), today);
        let blocks = parse(&substitute(template, &values));
        debug!(kind = kind.as_str(), blocks = blocks.len(), "parsed report markup");

        let logo = match &opts.logo {
            Some(location) => load_logo(&AssetSource::parse(location), opts.asset_timeout).await,
            None => None,
        };

        let view = ReportView { blocks, logo };
        let page = self.render(view, opts.scale, opts.render_timeout).await?;

        let bytes = tokio::task::spawn_blocking(move || single_page_pdf(&page)).await??;
        info!(kind = kind.as_str(), bytes = bytes.len(), "generated report");
        Ok(GeneratedReport {
            file_name: data.file_name(),
            bytes,
        })
    }

    /// Render on the blocking pool and wait for the renderer's completion
    /// signal, at most `limit`.
    async fn render(
        &self,
        view: ReportView,
        scale: u32,
        limit: Duration,
    ) -> Result<image::RgbImage, ReportError> {
        let (done_tx, done_rx) = oneshot::channel();
        let renderer = Arc::clone(&self.renderer);
        tokio::task::spawn_blocking(move || {
            let result = renderer.render(&view, scale);
            // The receiver is gone only after a timeout.
            let _ = done_tx.send(result);
        });
        match tokio::time::timeout(limit, done_rx).await {
            Err(_) => Err(ReportError::RenderTimeout(limit)),
            Ok(Err(_)) => Err(ReportError::RenderAborted),
            Ok(Ok(result)) => Ok(result?),
        }
    }

    /// Generate and write the report into `out_dir`, reporting the outcome
    /// as a user-facing notice.
    pub async fn download(&self, data: &ReportData, opts: &ReportOptions, out_dir: &Path) -> Notice {
        match self.write_report(data, opts, out_dir).await {
            Ok(path) => {
                info!(path = %path.display(), "report saved");
                Notice::report_downloaded()
            }
            Err(err) => {
                error!(error = %err, "report generation failed");
                Notice::report_failed()
            }
        }
    }

    async fn write_report(
        &self,
        data: &ReportData,
        opts: &ReportOptions,
        out_dir: &Path,
    ) -> Result<std::path::PathBuf, ReportError> {
        let report = self.generate(data, opts).await?;
        let path = out_dir.join(report.file_name);
        tokio::fs::write(&path, &report.bytes)
            .await
            .map_err(|source| ReportError::Io {
                path: path.display().to_string(),
                source,
            })?;
        Ok(path)
    }
}
