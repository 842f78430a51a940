//! SQLite-backed star schema store.
//!
//! The store owns a single connection for the whole run. Writes open a
//! transaction lazily and stay pending until `commit` or `rollback`.

use super::schema::{table_def, WAREHOUSE_VERSIONED_SCHEMAS};
use super::trait_def::{PersistenceSink, SongArtistLookup};
use super::PersistenceError;
use crate::etl::models::{FieldValue, ResolvedSong, Row, TableName};
use crate::sqlite_persistence::BASE_DB_VERSION;
use anyhow::{bail, Context, Result};
use rusqlite::types::{ToSqlOutput, Value};
use rusqlite::{params, params_from_iter, Connection, ToSql};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

impl ToSql for FieldValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            FieldValue::Null => ToSqlOutput::Owned(Value::Null),
            FieldValue::Integer(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            FieldValue::Real(r) => ToSqlOutput::Owned(Value::Real(*r)),
            FieldValue::Text(s) => ToSqlOutput::from(s.as_str()),
        })
    }
}

pub struct SqliteWarehouse {
    conn: Mutex<Connection>,
}

fn create_or_validate(conn: &Connection) -> Result<()> {
    let latest = WAREHOUSE_VERSIONED_SCHEMAS.len() - 1;
    let latest_schema = &WAREHOUSE_VERSIONED_SCHEMAS[latest];

    let table_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |r| r.get(0),
    )?;

    if table_count == 0 {
        info!("Creating warehouse schema at version {}", latest);
        latest_schema.create(conn)?;
        return Ok(());
    }

    let db_version: i64 = conn
        .query_row("PRAGMA user_version", [], |r| r.get(0))
        .context("Failed to read database version")?;
    let version = db_version - BASE_DB_VERSION as i64;
    if version < 0 {
        bail!(
            "Database at version {} was not created by this tool (base version {})",
            db_version,
            BASE_DB_VERSION
        );
    }
    let schema = WAREHOUSE_VERSIONED_SCHEMAS
        .get(version as usize)
        .with_context(|| format!("Database version {} is too new", version))?;
    schema.validate(conn)?;
    debug!("Validated existing warehouse schema at version {}", version);
    Ok(())
}

impl SqliteWarehouse {
    /// Opens (or creates) the warehouse database at `db_path`.
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open warehouse database {:?}", db_path))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        create_or_validate(&conn)?;
        Ok(SqliteWarehouse {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of rows stored in each table.
    pub fn table_counts(&self) -> Result<BTreeMap<TableName, usize>, PersistenceError> {
        let conn = self.conn();
        let mut counts = BTreeMap::new();
        for table in TableName::ALL {
            let count: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM {}", table.as_str()),
                [],
                |r| r.get(0),
            )?;
            counts.insert(table, count as usize);
        }
        Ok(counts)
    }

    /// Number of time rows beyond the first for each timestamp.
    pub fn duplicate_time_rows(&self) -> Result<usize, PersistenceError> {
        let conn = self.conn();
        let duplicates: i64 = conn.query_row(
            "SELECT COUNT(*) - COUNT(DISTINCT timestamp) FROM time",
            [],
            |r| r.get(0),
        )?;
        Ok(duplicates as usize)
    }

    /// True while writes are pending a commit or rollback.
    pub fn has_pending_writes(&self) -> bool {
        !self.conn().is_autocommit()
    }
}

impl PersistenceSink for SqliteWarehouse {
    fn write(&self, table: TableName, row: &Row) -> Result<(), PersistenceError> {
        if row.table() != table {
            return Err(PersistenceError::TableMismatch {
                table,
                row_table: row.table(),
            });
        }
        let conn = self.conn();
        if conn.is_autocommit() {
            conn.execute_batch("BEGIN")?;
        }
        let mut stmt = conn.prepare_cached(&table_def(table).insert_sql())?;
        stmt.execute(params_from_iter(row.values()))?;
        Ok(())
    }

    fn commit(&self) -> Result<(), PersistenceError> {
        let conn = self.conn();
        if !conn.is_autocommit() {
            conn.execute_batch("COMMIT")?;
        }
        Ok(())
    }

    fn rollback(&self) -> Result<(), PersistenceError> {
        let conn = self.conn();
        if !conn.is_autocommit() {
            conn.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }
}

impl SongArtistLookup for SqliteWarehouse {
    fn resolve(
        &self,
        title: &str,
        artist_name: &str,
        duration: f64,
    ) -> Result<Option<ResolvedSong>, PersistenceError> {
        let conn = self.conn();
        let mut stmt = conn.prepare_cached(
            "SELECT songs.song_id, songs.artist_id
             FROM songs JOIN artists ON songs.artist_id = artists.artist_id
             WHERE songs.title = ?1 AND artists.name = ?2 AND songs.duration = ?3
             LIMIT 2",
        )?;
        let mut matches = stmt
            .query_map(params![title, artist_name, duration], |r| {
                Ok(ResolvedSong {
                    song_id: r.get(0)?,
                    artist_id: r.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        if matches.len() == 1 {
            Ok(matches.pop())
        } else {
            Ok(None)
        }
    }
}
