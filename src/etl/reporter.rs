//! Progress and outcome reporting for a run.

use super::driver::BatchReport;
use super::error::EtlError;
use super::quality::QualityReport;
use std::fmt::Display;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Receives the events of a run. Built once and handed to the driver.
pub trait Reporter {
    fn run_started(&self);
    fn files_found(&self, root: &Path, total: usize);
    fn file_processed(&self, path: &Path, processed: usize, total: usize);
    fn file_failed(&self, path: &Path, err: &EtlError);
    fn quality_checked(&self, path: &Path, report: &QualityReport);
    fn batch_finished(&self, report: &BatchReport);
    fn run_succeeded(&self, elapsed: Duration);
    fn run_failed(&self, err: &dyn Display);
}

/// Reports through `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn run_started(&self) {
        info!("ETL process started");
    }

    fn files_found(&self, root: &Path, total: usize) {
        info!("{} files found in {}", total, root.display());
    }

    fn file_processed(&self, path: &Path, processed: usize, total: usize) {
        debug!("Loaded {}", path.display());
        info!("{}/{} files processed.", processed, total);
    }

    fn file_failed(&self, path: &Path, err: &EtlError) {
        error!("Failed to load {}: {}", path.display(), err);
    }

    fn quality_checked(&self, path: &Path, report: &QualityReport) {
        if report.has_findings() {
            warn!("Quality check for {}: {}", path.display(), report);
        } else {
            debug!("Quality check for {}: {}", path.display(), report);
        }
    }

    fn batch_finished(&self, report: &BatchReport) {
        info!(
            "Processed {} files ({} rows) in {:.2} seconds",
            report.processed_files,
            report.total_rows(),
            report.elapsed.as_secs_f64()
        );
        if !report.failed_files.is_empty() {
            warn!(
                "{} of {} files under {} were skipped after errors",
                report.failed_files.len(),
                report.total_files,
                report.root.display()
            );
        }
    }

    fn run_succeeded(&self, elapsed: Duration) {
        info!(
            "ETL process completed successfully in {:.2} seconds",
            elapsed.as_secs_f64()
        );
    }

    fn run_failed(&self, err: &dyn Display) {
        error!("Error in ETL process: {}", err);
    }
}
