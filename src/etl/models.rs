//! Typed rows of the star schema.
//!
//! Every row knows the table it belongs to, and exposes its values in the
//! column order of that table so the quality checker and the warehouse agree
//! on the layout.

use chrono::{DateTime, Datelike, Timelike};
use std::fmt;

/// Logical tables of the star schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TableName {
    Songs,
    Artists,
    Time,
    Users,
    Songplays,
}

impl TableName {
    pub const ALL: [TableName; 5] = [
        TableName::Songs,
        TableName::Artists,
        TableName::Time,
        TableName::Users,
        TableName::Songplays,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TableName::Songs => "songs",
            TableName::Artists => "artists",
            TableName::Time => "time",
            TableName::Users => "users",
            TableName::Songplays => "songplays",
        }
    }

    /// Columns written for this table, in insert order.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            TableName::Songs => &["song_id", "title", "artist_id", "year", "duration"],
            TableName::Artists => &["artist_id", "name", "location", "latitude", "longitude"],
            TableName::Time => &[
                "timestamp", "hour", "day", "week", "month", "year", "weekday",
            ],
            TableName::Users => &["user_id", "first_name", "last_name", "gender", "level"],
            TableName::Songplays => &[
                "play_id",
                "timestamp",
                "user_id",
                "level",
                "song_id",
                "artist_id",
                "session_id",
                "location",
                "user_agent",
            ],
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subscription tier of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Free,
    Paid,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Free => "free",
            Level::Paid => "paid",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "free" => Some(Level::Free),
            "paid" => Some(Level::Paid),
            _ => None,
        }
    }
}

/// A single column value, as handed to the quality checker and the store.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    fn text(value: &str) -> Self {
        FieldValue::Text(value.to_owned())
    }

    fn opt_text(value: &Option<String>) -> Self {
        value.as_deref().map_or(FieldValue::Null, FieldValue::text)
    }

    fn opt_real(value: Option<f64>) -> Self {
        value.map_or(FieldValue::Null, FieldValue::Real)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SongRecord {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    /// 0 when the year is unknown.
    pub year: i32,
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArtistRecord {
    pub artist_id: String,
    pub name: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Calendar breakdown of a play instant, in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRecord {
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub hour: i32,
    pub day: i32,
    /// ISO 8601 week number.
    pub week: i32,
    pub month: i32,
    pub year: i32,
    /// Monday is 0, Sunday is 6.
    pub weekday: i32,
}

impl TimeRecord {
    /// Returns None when `timestamp_ms` is outside the representable range.
    pub fn from_millis(timestamp_ms: i64) -> Option<Self> {
        let instant = DateTime::from_timestamp_millis(timestamp_ms)?;
        Some(TimeRecord {
            timestamp: timestamp_ms,
            hour: instant.hour() as i32,
            day: instant.day() as i32,
            week: instant.iso_week().week() as i32,
            month: instant.month() as i32,
            year: instant.year(),
            weekday: instant.weekday().num_days_from_monday() as i32,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<String>,
    pub level: Level,
}

/// Song and artist ids found for a play. They only ever exist together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSong {
    pub song_id: String,
    pub artist_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayFact {
    /// Position among the plays of the source file, not unique across files.
    pub play_id: i64,
    pub timestamp: i64,
    pub user_id: String,
    pub level: Level,
    pub resolved: Option<ResolvedSong>,
    pub session_id: i64,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

impl PlayFact {
    pub fn song_id(&self) -> Option<&str> {
        self.resolved.as_ref().map(|r| r.song_id.as_str())
    }

    pub fn artist_id(&self) -> Option<&str> {
        self.resolved.as_ref().map(|r| r.artist_id.as_str())
    }
}

/// A row bound to its target table.
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    Song(SongRecord),
    Artist(ArtistRecord),
    Time(TimeRecord),
    User(UserRecord),
    Play(PlayFact),
}

impl Row {
    pub fn table(&self) -> TableName {
        match self {
            Row::Song(_) => TableName::Songs,
            Row::Artist(_) => TableName::Artists,
            Row::Time(_) => TableName::Time,
            Row::User(_) => TableName::Users,
            Row::Play(_) => TableName::Songplays,
        }
    }

    /// Values in the order of `self.table().columns()`.
    pub fn values(&self) -> Vec<FieldValue> {
        match self {
            Row::Song(song) => vec![
                FieldValue::text(&song.song_id),
                FieldValue::text(&song.title),
                FieldValue::text(&song.artist_id),
                FieldValue::Integer(song.year as i64),
                FieldValue::Real(song.duration),
            ],
            Row::Artist(artist) => vec![
                FieldValue::text(&artist.artist_id),
                FieldValue::text(&artist.name),
                FieldValue::opt_text(&artist.location),
                FieldValue::opt_real(artist.latitude),
                FieldValue::opt_real(artist.longitude),
            ],
            Row::Time(time) => [
                time.timestamp,
                time.hour as i64,
                time.day as i64,
                time.week as i64,
                time.month as i64,
                time.year as i64,
                time.weekday as i64,
            ]
            .into_iter()
            .map(FieldValue::Integer)
            .collect(),
            Row::User(user) => vec![
                FieldValue::text(&user.user_id),
                FieldValue::text(&user.first_name),
                FieldValue::text(&user.last_name),
                FieldValue::opt_text(&user.gender),
                FieldValue::text(user.level.as_str()),
            ],
            Row::Play(play) => vec![
                FieldValue::Integer(play.play_id),
                FieldValue::Integer(play.timestamp),
                FieldValue::text(&play.user_id),
                FieldValue::text(play.level.as_str()),
                play.song_id().map_or(FieldValue::Null, FieldValue::text),
                play.artist_id().map_or(FieldValue::Null, FieldValue::text),
                FieldValue::Integer(play.session_id),
                FieldValue::opt_text(&play.location),
                FieldValue::opt_text(&play.user_agent),
            ],
        }
    }
}

/// Rows of one table emitted by a transformer for one file.
#[derive(Debug, Clone, PartialEq)]
pub struct TableBatch {
    pub table: TableName,
    pub rows: Vec<Row>,
}

impl TableBatch {
    pub fn new(table: TableName, rows: Vec<Row>) -> Self {
        Self { table, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_calendar_fields_in_utc() {
        // 2018-11-15T00:47:06.796Z, a Thursday
        let time = TimeRecord::from_millis(1542242826796).unwrap();
        assert_eq!(
            time,
            TimeRecord {
                timestamp: 1542242826796,
                hour: 0,
                day: 15,
                week: 46,
                month: 11,
                year: 2018,
                weekday: 3,
            }
        );
    }

    #[test]
    fn derives_iso_week_across_year_boundary() {
        // 2018-12-31T12:00:00Z belongs to ISO week 1 of 2019
        let time = TimeRecord::from_millis(1546257600000).unwrap();
        assert_eq!(time.year, 2018);
        assert_eq!(time.week, 1);
        assert_eq!(time.weekday, 0);
    }

    #[test]
    fn rejects_out_of_range_timestamp() {
        assert!(TimeRecord::from_millis(i64::MAX).is_none());
    }

    #[test]
    fn values_follow_table_columns() {
        let rows = vec![
            Row::Song(SongRecord {
                song_id: "S1".to_owned(),
                title: "t".to_owned(),
                artist_id: "A1".to_owned(),
                year: 0,
                duration: 1.0,
            }),
            Row::Artist(ArtistRecord {
                artist_id: "A1".to_owned(),
                name: "n".to_owned(),
                location: None,
                latitude: None,
                longitude: None,
            }),
            Row::Time(TimeRecord::from_millis(0).unwrap()),
            Row::User(UserRecord {
                user_id: "1".to_owned(),
                first_name: "f".to_owned(),
                last_name: "l".to_owned(),
                gender: None,
                level: Level::Free,
            }),
            Row::Play(PlayFact {
                play_id: 0,
                timestamp: 0,
                user_id: "1".to_owned(),
                level: Level::Paid,
                resolved: None,
                session_id: 1,
                location: None,
                user_agent: None,
            }),
        ];

        for row in rows {
            assert_eq!(row.values().len(), row.table().columns().len());
        }
    }

    #[test]
    fn unresolved_play_has_both_ids_null() {
        let play = Row::Play(PlayFact {
            play_id: 3,
            timestamp: 1,
            user_id: "7".to_owned(),
            level: Level::Free,
            resolved: None,
            session_id: 2,
            location: None,
            user_agent: None,
        });
        let values = play.values();
        assert!(values[4].is_null());
        assert!(values[5].is_null());
    }

    #[test]
    fn parses_level() {
        assert_eq!(Level::from_str("paid"), Some(Level::Paid));
        assert_eq!(Level::from_str("free"), Some(Level::Free));
        assert_eq!(Level::from_str("gold"), None);
    }
}
