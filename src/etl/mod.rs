pub mod catalog;
pub mod discovery;
pub mod driver;
pub mod error;
pub mod events;
pub mod models;
pub mod pipeline;
pub mod quality;
pub mod reporter;

pub use catalog::{transform_catalog, CatalogFileTransformer};
pub use discovery::discover;
pub use driver::{BatchDriver, BatchReport, DriverOptions, FileTransformer};
pub use error::EtlError;
pub use events::{transform_events, EventFileTransformer, EventRows};
pub use pipeline::{run_pipeline, PipelineSummary};
pub use quality::{check, QualityReport, TableChecks};
pub use reporter::{Reporter, TracingReporter};
