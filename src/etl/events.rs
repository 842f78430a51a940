//! Event-log files: one user interaction per line.
//!
//! Only `NextSong` events are plays. Each of them yields one time row, one
//! user row and one play fact, the latter linked to the catalog when the
//! song can be resolved unambiguously.

use super::driver::FileTransformer;
use super::error::EtlError;
use super::models::{Level, PlayFact, Row, TableBatch, TableName, TimeRecord, UserRecord};
use crate::warehouse::SongArtistLookup;
use serde::Deserialize;

const PLAY_PAGE: &str = "NextSong";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawUserId {
    Text(String),
    Number(i64),
}

impl RawUserId {
    fn into_id(self) -> Option<String> {
        match self {
            RawUserId::Text(s) if s.trim().is_empty() => None,
            RawUserId::Text(s) => Some(s),
            RawUserId::Number(n) => Some(n.to_string()),
        }
    }
}

#[allow(dead_code)]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawLogEvent {
    artist: Option<String>,
    auth: Option<String>,
    first_name: Option<String>,
    gender: Option<String>,
    item_in_session: Option<i64>,
    last_name: Option<String>,
    length: Option<f64>,
    level: Option<String>,
    location: Option<String>,
    method: Option<String>,
    page: String,
    registration: Option<f64>,
    session_id: Option<i64>,
    song: Option<String>,
    status: Option<i64>,
    ts: Option<i64>,
    user_agent: Option<String>,
    user_id: Option<RawUserId>,
}

/// A play event with every field the derivations need.
struct PlayEvent {
    ts: i64,
    user_id: String,
    first_name: String,
    last_name: String,
    gender: Option<String>,
    level: Level,
    song: String,
    artist: String,
    length: f64,
    session_id: i64,
    location: Option<String>,
    user_agent: Option<String>,
}

fn required<T>(value: Option<T>, field: &str, line: usize) -> Result<T, EtlError> {
    value.ok_or_else(|| {
        EtlError::transform(
            Some(line),
            format!("{} event is missing `{}`", PLAY_PAGE, field),
        )
    })
}

impl RawLogEvent {
    fn into_play(self, line: usize) -> Result<PlayEvent, EtlError> {
        let raw_level = required(self.level, "level", line)?;
        let level = Level::from_str(&raw_level).ok_or_else(|| {
            EtlError::transform(Some(line), format!("unknown level '{}'", raw_level))
        })?;

        Ok(PlayEvent {
            ts: required(self.ts, "ts", line)?,
            user_id: required(self.user_id.and_then(RawUserId::into_id), "userId", line)?,
            first_name: required(self.first_name, "firstName", line)?,
            last_name: required(self.last_name, "lastName", line)?,
            gender: self.gender,
            level,
            song: required(self.song, "song", line)?,
            artist: required(self.artist, "artist", line)?,
            length: required(self.length, "length", line)?,
            session_id: required(self.session_id, "sessionId", line)?,
            location: self.location,
            user_agent: self.user_agent,
        })
    }
}

/// Rows derived from one event-log file, each vector in source order.
#[derive(Debug, Default, PartialEq)]
pub struct EventRows {
    pub time: Vec<TimeRecord>,
    pub users: Vec<UserRecord>,
    pub plays: Vec<PlayFact>,
}

impl EventRows {
    /// Batches in write order: time, users, then songplays.
    pub fn into_batches(self) -> Vec<TableBatch> {
        vec![
            TableBatch::new(
                TableName::Time,
                self.time.into_iter().map(Row::Time).collect(),
            ),
            TableBatch::new(
                TableName::Users,
                self.users.into_iter().map(Row::User).collect(),
            ),
            TableBatch::new(
                TableName::Songplays,
                self.plays.into_iter().map(Row::Play).collect(),
            ),
        ]
    }
}

fn parse_events(bytes: &[u8]) -> Result<Vec<(usize, RawLogEvent)>, EtlError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| EtlError::parse(None, format!("invalid UTF-8: {}", e)))?;

    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line)
                .map(|event| (index + 1, event))
                .map_err(|e| EtlError::parse(Some(index + 1), e.to_string()))
        })
        .collect()
}

/// Derives time, user and play rows from the content of an event-log file.
///
/// Song and artist ids are looked up with `lookup`; a play with no match, or
/// with more than one, keeps both ids null.
pub fn transform_events(
    bytes: &[u8],
    lookup: &dyn SongArtistLookup,
) -> Result<EventRows, EtlError> {
    let events = parse_events(bytes)?;
    let mut rows = EventRows::default();

    let plays = events
        .into_iter()
        .filter(|(_, event)| event.page == PLAY_PAGE);

    for (play_id, (line, event)) in plays.enumerate() {
        let play = event.into_play(line)?;

        let time = TimeRecord::from_millis(play.ts).ok_or_else(|| {
            EtlError::transform(Some(line), format!("timestamp {} is out of range", play.ts))
        })?;
        let resolved = lookup.resolve(&play.song, &play.artist, play.length)?;

        rows.time.push(time);
        rows.users.push(UserRecord {
            user_id: play.user_id.clone(),
            first_name: play.first_name,
            last_name: play.last_name,
            gender: play.gender,
            level: play.level,
        });
        rows.plays.push(PlayFact {
            play_id: play_id as i64,
            timestamp: play.ts,
            user_id: play.user_id,
            level: play.level,
            resolved,
            session_id: play.session_id,
            location: play.location,
            user_agent: play.user_agent,
        });
    }

    Ok(rows)
}

/// Binds event-log files to the time, users and songplays tables.
pub struct EventFileTransformer;

impl FileTransformer for EventFileTransformer {
    fn name(&self) -> &'static str {
        "event log"
    }

    fn targets(&self) -> &'static [TableName] {
        &[TableName::Time, TableName::Users, TableName::Songplays]
    }

    fn transform(
        &self,
        bytes: &[u8],
        lookup: &dyn SongArtistLookup,
    ) -> Result<Vec<TableBatch>, EtlError> {
        Ok(transform_events(bytes, lookup)?.into_batches())
    }
}
