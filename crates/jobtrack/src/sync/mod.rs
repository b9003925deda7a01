//! The aggregator: scan every record, recompute derived metrics, and
//! regenerate the derived views. Read-only with respect to records.

pub mod metrics;
pub mod report;
pub mod scan;

use std::path::PathBuf;

use chrono::NaiveDateTime;
use log::info;

use crate::config::{Config, TrackerPaths};
use crate::error::{Result, SyncError};
use crate::record::RecordParser;
use crate::storage::ensure_directory;

pub use metrics::{compute_metrics, Metrics};
pub use scan::{scan_records, ScannedRecords};

#[derive(Debug)]
pub struct SyncSummary {
    pub total: usize,
    pub high_priority: usize,
    pub average_fit: Option<f64>,
    pub corrupted: Vec<(PathBuf, String)>,
    pub status_view: PathBuf,
    pub metrics_view: PathBuf,
}

pub struct SyncEngine {
    paths: TrackerPaths,
    config: Config,
    parser: RecordParser,
}

impl SyncEngine {
    pub fn new(paths: TrackerPaths, config: Config) -> Self {
        Self {
            paths,
            config,
            parser: RecordParser::new(),
        }
    }

    /// Regenerate `STATUS.md` and `insights/metrics-dashboard.md` from the
    /// current record set. Both views are fully overwritten; no source
    /// record is touched. Running twice without record changes yields
    /// identical output apart from `generated_at`.
    pub fn sync(&self, generated_at: NaiveDateTime) -> Result<SyncSummary> {
        let scanned = scan_records(&self.paths.applications_root, &self.parser)?;
        info!(
            "Scanned {} records ({} corrupted)",
            scanned.records.len(),
            scanned.corrupted.len()
        );

        let metrics = compute_metrics(&scanned.records, &self.config.tiers);

        let status_content = report::render_status_view(
            &scanned.records,
            &metrics,
            &self.config.tiers,
            generated_at,
        );
        write_view(&self.paths.status_view, &status_content)?;

        let dashboard_content = report::render_metrics_dashboard(
            &scanned.records,
            &metrics,
            &self.config,
            generated_at,
        );
        ensure_directory(&self.paths.insights_root)?;
        let metrics_view = self.paths.metrics_view();
        write_view(&metrics_view, &dashboard_content)?;

        info!(
            "Sync complete: {} records, {} high priority",
            metrics.total, metrics.high_priority
        );

        Ok(SyncSummary {
            total: metrics.total,
            high_priority: metrics.high_priority,
            average_fit: metrics.average_fit,
            corrupted: scanned.corrupted,
            status_view: self.paths.status_view.clone(),
            metrics_view,
        })
    }
}

fn write_view(path: &std::path::Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|e| {
        SyncError::WriteView {
            path: path.to_path_buf(),
            source: e,
        }
        .into()
    })
}
