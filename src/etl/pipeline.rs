use super::catalog::CatalogFileTransformer;
use super::driver::{BatchDriver, BatchReport, DriverOptions};
use super::error::EtlError;
use super::events::EventFileTransformer;
use super::reporter::Reporter;
use crate::warehouse::{PersistenceSink, SongArtistLookup};
use std::path::Path;
use std::time::Instant;

/// Reports of both trees of a run.
#[derive(Debug, Clone)]
pub struct PipelineSummary {
    pub catalog: BatchReport,
    pub events: BatchReport,
}

impl PipelineSummary {
    pub fn failed_files(&self) -> usize {
        self.catalog.failed_files.len() + self.events.failed_files.len()
    }

    pub fn is_clean(&self) -> bool {
        self.catalog.is_clean() && self.events.is_clean()
    }
}

/// Loads the catalog tree, then the event-log tree.
///
/// The catalog must be complete before events are loaded, since plays are
/// resolved against it.
pub fn run_pipeline<S>(
    song_root: &Path,
    log_root: &Path,
    options: DriverOptions,
    sink: &S,
    reporter: &dyn Reporter,
) -> Result<PipelineSummary, EtlError>
where
    S: PersistenceSink + SongArtistLookup,
{
    let start = Instant::now();
    reporter.run_started();

    let driver = BatchDriver::new(options, reporter);
    let result = driver
        .run(song_root, &CatalogFileTransformer, sink)
        .and_then(|catalog| {
            let events = driver.run(log_root, &EventFileTransformer, sink)?;
            Ok(PipelineSummary { catalog, events })
        });

    // Skipped files are reported by the caller once the summary is logged.
    match &result {
        Ok(summary) if summary.is_clean() => reporter.run_succeeded(start.elapsed()),
        Ok(_) => {}
        Err(err) => reporter.run_failed(err),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::etl::models::TableName;
    use crate::etl::reporter::TracingReporter;
    use crate::etl::quality::QualityReport;
    use crate::warehouse::SqliteWarehouse;
    use std::cell::RefCell;
    use std::fmt::Display;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Outcome events only.
    #[derive(Default)]
    struct OutcomeReporter {
        succeeded: RefCell<usize>,
        failed: RefCell<Vec<String>>,
    }

    impl Reporter for OutcomeReporter {
        fn run_started(&self) {}
        fn files_found(&self, _root: &Path, _total: usize) {}
        fn file_processed(&self, _path: &Path, _processed: usize, _total: usize) {}
        fn file_failed(&self, _path: &Path, _err: &EtlError) {}
        fn quality_checked(&self, _path: &Path, _report: &QualityReport) {}
        fn batch_finished(&self, _report: &BatchReport) {}
        fn run_succeeded(&self, _elapsed: Duration) {
            *self.succeeded.borrow_mut() += 1;
        }
        fn run_failed(&self, err: &dyn Display) {
            self.failed.borrow_mut().push(err.to_string());
        }
    }

    const SONG: &str = r#"{"num_songs": 1, "artist_id": "AR5KOSW1187FB35FF4", "artist_latitude": 49.80388, "artist_longitude": 15.47491, "artist_location": "Dubai UAE", "artist_name": "Elena", "song_id": "SOZCTXZ12AB0182364", "title": "Setanta matinee", "duration": 269.58322, "year": 0}"#;
    const PLAY: &str = r#"{"artist":"Elena","auth":"Logged In","firstName":"Lily","gender":"F","itemInSession":0,"lastName":"Koch","length":269.58322,"level":"paid","location":"Chicago-Naperville-Elgin, IL-IN-WI","method":"PUT","page":"NextSong","registration":1541048010796.0,"sessionId":818,"song":"Setanta matinee","status":200,"ts":1542242826796,"userAgent":"Mozilla","userId":"15"}"#;

    fn data_dirs() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let songs = temp_dir.path().join("song_data/A/A");
        let logs = temp_dir.path().join("log_data/2018/11");
        fs::create_dir_all(&songs).unwrap();
        fs::create_dir_all(&logs).unwrap();
        fs::write(songs.join("TRAAAAW128F429D538.json"), SONG).unwrap();
        fs::write(logs.join("2018-11-15-events.json"), PLAY).unwrap();
        temp_dir
    }

    #[test]
    fn loads_catalog_before_events() {
        let dirs = data_dirs();
        let store = SqliteWarehouse::open_in_memory().unwrap();

        let summary = run_pipeline(
            &dirs.path().join("song_data"),
            &dirs.path().join("log_data"),
            DriverOptions::default(),
            &store,
            &TracingReporter,
        )
        .unwrap();

        assert!(summary.is_clean());
        assert_eq!(summary.catalog.rows_written[&TableName::Songs], 1);
        assert_eq!(summary.events.rows_written[&TableName::Songplays], 1);
        // The play resolves only if the catalog was committed first.
        assert!(summary.events.quality_findings.is_empty());
    }

    #[test]
    fn missing_event_root_fails_after_catalog_load() {
        let dirs = data_dirs();
        let store = SqliteWarehouse::open_in_memory().unwrap();

        let err = run_pipeline(
            &dirs.path().join("song_data"),
            &dirs.path().join("missing"),
            DriverOptions::default(),
            &store,
            &TracingReporter,
        )
        .unwrap_err();

        assert!(matches!(err, EtlError::Discovery { .. }));
        assert_eq!(store.table_counts().unwrap()[&TableName::Songs], 1);
    }

    #[test]
    fn skipped_files_are_left_to_the_caller() {
        let dirs = data_dirs();
        fs::write(dirs.path().join("log_data/2018/11/2018-11-16-events.json"), "{").unwrap();
        let store = SqliteWarehouse::open_in_memory().unwrap();
        let reporter = OutcomeReporter::default();
        let options = DriverOptions {
            continue_on_error: true,
            ..DriverOptions::default()
        };

        let summary = run_pipeline(
            &dirs.path().join("song_data"),
            &dirs.path().join("log_data"),
            options,
            &store,
            &reporter,
        )
        .unwrap();

        assert_eq!(summary.failed_files(), 1);
        assert_eq!(*reporter.succeeded.borrow(), 0);
        assert!(reporter.failed.borrow().is_empty());
    }

    #[test]
    fn run_errors_are_reported_once() {
        let dirs = data_dirs();
        let store = SqliteWarehouse::open_in_memory().unwrap();
        let reporter = OutcomeReporter::default();

        run_pipeline(
            &dirs.path().join("missing"),
            &dirs.path().join("log_data"),
            DriverOptions::default(),
            &store,
            &reporter,
        )
        .unwrap_err();

        assert_eq!(reporter.failed.borrow().len(), 1);
        assert_eq!(*reporter.succeeded.borrow(), 0);
    }
}
