//! Sparkify ETL Library
//!
//! Loads song catalog and listening-event JSON files into a SQLite star
//! schema. The binary wires these modules together; they are exposed here
//! for testing and potential reuse.

pub mod config;
pub mod etl;
pub mod sqlite_persistence;
pub mod warehouse;

// Re-export commonly used types for convenience
pub use etl::{run_pipeline, DriverOptions, EtlError, PipelineSummary, TracingReporter};
pub use warehouse::SqliteWarehouse;
