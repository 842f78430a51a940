mod schema;
mod store;
mod trait_def;

use crate::etl::models::TableName;
use thiserror::Error;

pub use schema::{table_def, WAREHOUSE_VERSIONED_SCHEMAS};
pub use store::SqliteWarehouse;
pub use trait_def::{PersistenceSink, SongArtistLookup};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Row for table {row_table} cannot be written to table {table}")]
    TableMismatch {
        table: TableName,
        row_table: TableName,
    },
}
