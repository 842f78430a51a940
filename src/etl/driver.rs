//! Runs one transformer over every file of a directory tree.
//!
//! A file is the unit of work: all of its rows are written and then
//! committed together, or rolled back together when anything fails.

use super::discovery::discover;
use super::error::EtlError;
use super::models::{TableBatch, TableName};
use super::quality::{self, QualityReport};
use super::reporter::Reporter;
use crate::warehouse::{PersistenceSink, SongArtistLookup};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::error;

/// Turns the content of one file into row batches.
pub trait FileTransformer {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Tables this transformer may emit rows for.
    fn targets(&self) -> &'static [TableName];

    fn transform(
        &self,
        bytes: &[u8],
        lookup: &dyn SongArtistLookup,
    ) -> Result<Vec<TableBatch>, EtlError>;
}

#[derive(Debug, Clone)]
pub struct DriverOptions {
    /// File extension to load, without the leading dot.
    pub extension: String,
    /// Roll back and skip a failing file instead of stopping the run.
    pub continue_on_error: bool,
    pub quality_checks: bool,
}

impl Default for DriverOptions {
    fn default() -> Self {
        DriverOptions {
            extension: "json".to_string(),
            continue_on_error: false,
            quality_checks: true,
        }
    }
}

/// Outcome of loading one directory tree.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub root: PathBuf,
    pub total_files: usize,
    pub processed_files: usize,
    /// Files rolled back and skipped, with the error that stopped them.
    pub failed_files: Vec<(PathBuf, String)>,
    pub rows_written: BTreeMap<TableName, usize>,
    /// Quality reports that flagged something, with the file they came from.
    pub quality_findings: Vec<(PathBuf, QualityReport)>,
    pub elapsed: Duration,
}

impl BatchReport {
    fn new(root: &Path, total_files: usize) -> Self {
        BatchReport {
            root: root.to_path_buf(),
            total_files,
            processed_files: 0,
            failed_files: Vec::new(),
            rows_written: BTreeMap::new(),
            quality_findings: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    /// True when every file was loaded.
    pub fn is_clean(&self) -> bool {
        self.failed_files.is_empty() && self.processed_files == self.total_files
    }

    pub fn total_rows(&self) -> usize {
        self.rows_written.values().sum()
    }
}

/// What a single committed file contributed.
struct FileOutcome {
    rows_written: BTreeMap<TableName, usize>,
    quality_findings: Vec<QualityReport>,
}

pub struct BatchDriver<'r> {
    options: DriverOptions,
    reporter: &'r dyn Reporter,
}

impl<'r> BatchDriver<'r> {
    pub fn new(options: DriverOptions, reporter: &'r dyn Reporter) -> Self {
        BatchDriver { options, reporter }
    }

    /// Loads every matching file under `root` with `binding`, in discovery
    /// order, committing after each file.
    pub fn run<S>(
        &self,
        root: &Path,
        binding: &dyn FileTransformer,
        sink: &S,
    ) -> Result<BatchReport, EtlError>
    where
        S: PersistenceSink + SongArtistLookup,
    {
        let start = Instant::now();
        let files = discover(root, &self.options.extension)?;
        let total = files.len();
        self.reporter.files_found(root, total);

        let mut report = BatchReport::new(root, total);
        for path in files {
            match self.load_file(&path, binding, sink) {
                Ok(outcome) => {
                    for (table, count) in outcome.rows_written {
                        *report.rows_written.entry(table).or_default() += count;
                    }
                    report.quality_findings.extend(
                        outcome
                            .quality_findings
                            .into_iter()
                            .map(|finding| (path.clone(), finding)),
                    );
                    report.processed_files += 1;
                    self.reporter
                        .file_processed(&path, report.processed_files, total);
                }
                Err(err) => {
                    self.reporter.file_failed(&path, &err);
                    // The store state is unknown after a failed rollback.
                    if let Err(rollback_err) = sink.rollback() {
                        error!(
                            "Failed to roll back {}: {}",
                            path.display(),
                            rollback_err
                        );
                        return Err(err);
                    }
                    let recoverable = !matches!(err, EtlError::Persistence(_));
                    if !(self.options.continue_on_error && recoverable) {
                        return Err(err);
                    }
                    report.failed_files.push((path, err.to_string()));
                }
            }
        }

        report.elapsed = start.elapsed();
        self.reporter.batch_finished(&report);
        Ok(report)
    }

    fn load_file<S>(
        &self,
        path: &Path,
        binding: &dyn FileTransformer,
        sink: &S,
    ) -> Result<FileOutcome, EtlError>
    where
        S: PersistenceSink + SongArtistLookup,
    {
        let bytes = fs::read(path).map_err(|e| {
            EtlError::parse(None, format!("cannot read file: {}", e)).in_file(path)
        })?;
        let batches = binding
            .transform(&bytes, sink)
            .map_err(|e| e.in_file(path))?;

        let mut outcome = FileOutcome {
            rows_written: BTreeMap::new(),
            quality_findings: Vec::new(),
        };
        for batch in batches {
            if !binding.targets().contains(&batch.table) {
                return Err(EtlError::transform(
                    None,
                    format!(
                        "{} transformer emitted rows for table {}",
                        binding.name(),
                        batch.table
                    ),
                )
                .in_file(path));
            }

            if self.options.quality_checks {
                let report = quality::check(&batch.rows, batch.table);
                self.reporter.quality_checked(path, &report);
                if report.has_findings() {
                    outcome.quality_findings.push(report);
                }
            }

            for row in &batch.rows {
                sink.write(batch.table, row)?;
            }
            *outcome.rows_written.entry(batch.table).or_default() += batch.rows.len();
        }

        sink.commit()?;
        Ok(outcome)
    }
}
