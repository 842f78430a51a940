//! Collaborator interfaces the pipeline needs from its destination store.

use super::PersistenceError;
use crate::etl::models::{ResolvedSong, Row, TableName};

/// Exact song/artist resolution against data already loaded.
pub trait SongArtistLookup {
    /// Returns the ids of the only song matching title, artist name and
    /// duration. Returns Ok(None) when nothing matches, and also when more
    /// than one song matches.
    fn resolve(
        &self,
        title: &str,
        artist_name: &str,
        duration: f64,
    ) -> Result<Option<ResolvedSong>, PersistenceError>;
}

/// Row writes grouped into explicitly committed units.
pub trait PersistenceSink {
    /// Writes one row into `table`. Opens a unit of work if none is open.
    fn write(&self, table: TableName, row: &Row) -> Result<(), PersistenceError>;

    /// Makes every write since the last commit durable.
    fn commit(&self) -> Result<(), PersistenceError>;

    /// Discards every write since the last commit.
    fn rollback(&self) -> Result<(), PersistenceError>;
}
