//! SQLite schema of the play-log star schema.
//!
//! Catalog dimensions keep the first row loaded for a key, users are
//! overwritten by later occurrences, and the time dimension and the fact
//! table accumulate every row they receive.

use crate::etl::models::TableName;
use crate::sqlite_column;
use crate::sqlite_persistence::{Column, ConflictPolicy, SqlType, Table, VersionedSchema};

// =============================================================================
// Dimension Tables
// =============================================================================

const SONGS_TABLE: Table = Table {
    name: "songs",
    columns: &[
        sqlite_column!("song_id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("artist_id", &SqlType::Text, non_null = true),
        sqlite_column!("year", &SqlType::Integer, non_null = true),
        sqlite_column!("duration", &SqlType::Real, non_null = true),
    ],
    indices: &[
        ("idx_songs_title", "title"),
        ("idx_songs_artist", "artist_id"),
    ],
    on_conflict: ConflictPolicy::Ignore,
};

const ARTISTS_TABLE: Table = Table {
    name: "artists",
    columns: &[
        sqlite_column!("artist_id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("location", &SqlType::Text),
        sqlite_column!("latitude", &SqlType::Real),
        sqlite_column!("longitude", &SqlType::Real),
    ],
    indices: &[("idx_artists_name", "name")],
    on_conflict: ConflictPolicy::Ignore,
};

/// No key: one row per play, duplicated timestamps are kept.
const TIME_TABLE: Table = Table {
    name: "time",
    columns: &[
        sqlite_column!("timestamp", &SqlType::Integer, non_null = true),
        sqlite_column!("hour", &SqlType::Integer, non_null = true),
        sqlite_column!("day", &SqlType::Integer, non_null = true),
        sqlite_column!("week", &SqlType::Integer, non_null = true),
        sqlite_column!("month", &SqlType::Integer, non_null = true),
        sqlite_column!("year", &SqlType::Integer, non_null = true),
        sqlite_column!("weekday", &SqlType::Integer, non_null = true),
    ],
    indices: &[("idx_time_timestamp", "timestamp")],
    on_conflict: ConflictPolicy::Fail,
};

const USERS_TABLE: Table = Table {
    name: "users",
    columns: &[
        sqlite_column!("user_id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("first_name", &SqlType::Text, non_null = true),
        sqlite_column!("last_name", &SqlType::Text, non_null = true),
        sqlite_column!("gender", &SqlType::Text),
        sqlite_column!("level", &SqlType::Text, non_null = true),
    ],
    indices: &[],
    on_conflict: ConflictPolicy::Upsert {
        key: "user_id",
        update: &["first_name", "last_name", "gender", "level"],
    },
};

// =============================================================================
// Fact Table
// =============================================================================

const SONGPLAYS_TABLE: Table = Table {
    name: "songplays",
    columns: &[
        sqlite_column!(
            "songplay_id",
            &SqlType::Integer,
            is_primary_key = true,
            auto_increment = true
        ),
        sqlite_column!("play_id", &SqlType::Integer, non_null = true), // index within the source file
        sqlite_column!("timestamp", &SqlType::Integer, non_null = true),
        sqlite_column!("user_id", &SqlType::Text, non_null = true),
        sqlite_column!("level", &SqlType::Text, non_null = true),
        sqlite_column!("song_id", &SqlType::Text),
        sqlite_column!("artist_id", &SqlType::Text),
        sqlite_column!("session_id", &SqlType::Integer, non_null = true),
        sqlite_column!("location", &SqlType::Text),
        sqlite_column!("user_agent", &SqlType::Text),
    ],
    indices: &[
        ("idx_songplays_timestamp", "timestamp"),
        ("idx_songplays_user", "user_id"),
    ],
    on_conflict: ConflictPolicy::Fail,
};

pub const WAREHOUSE_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[
        SONGS_TABLE,
        ARTISTS_TABLE,
        TIME_TABLE,
        USERS_TABLE,
        SONGPLAYS_TABLE,
    ],
}];

/// Schema definition of a logical table in the latest schema version.
pub fn table_def(table: TableName) -> &'static Table {
    match table {
        TableName::Songs => &SONGS_TABLE,
        TableName::Artists => &ARTISTS_TABLE,
        TableName::Time => &TIME_TABLE,
        TableName::Users => &USERS_TABLE,
        TableName::Songplays => &SONGPLAYS_TABLE,
    }
}
