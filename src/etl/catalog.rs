//! Catalog files: one song and its performing artist per file.

use super::driver::FileTransformer;
use super::error::EtlError;
use super::models::{ArtistRecord, Row, SongRecord, TableBatch, TableName};
use crate::warehouse::SongArtistLookup;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSongFile {
    #[allow(dead_code)]
    num_songs: Option<i64>,
    artist_id: String,
    artist_latitude: Option<f64>,
    artist_longitude: Option<f64>,
    artist_location: Option<String>,
    artist_name: String,
    song_id: String,
    title: String,
    duration: f64,
    year: i32,
}

impl RawSongFile {
    fn into_records(self) -> (SongRecord, ArtistRecord) {
        let song = SongRecord {
            song_id: self.song_id,
            title: self.title,
            artist_id: self.artist_id.clone(),
            year: self.year,
            duration: self.duration,
        };
        let artist = ArtistRecord {
            artist_id: self.artist_id,
            name: self.artist_name,
            location: self.artist_location,
            latitude: self.artist_latitude,
            longitude: self.artist_longitude,
        };
        (song, artist)
    }
}

/// Parses the content of a catalog file.
///
/// Out-of-range years and durations are kept as they are; flagging them is
/// the quality checker's job.
pub fn transform_catalog(bytes: &[u8]) -> Result<(SongRecord, ArtistRecord), EtlError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| EtlError::parse(None, format!("invalid UTF-8: {}", e)))?;

    let mut records = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let (index, line) = records
        .next()
        .ok_or_else(|| EtlError::parse(None, "no catalog record found"))?;
    if let Some((extra, _)) = records.next() {
        return Err(EtlError::parse(
            Some(extra + 1),
            "expected a single catalog record per file",
        ));
    }

    let raw: RawSongFile =
        serde_json::from_str(line).map_err(|e| EtlError::parse(Some(index + 1), e.to_string()))?;
    Ok(raw.into_records())
}

/// Binds catalog files to the songs and artists tables.
pub struct CatalogFileTransformer;

impl FileTransformer for CatalogFileTransformer {
    fn name(&self) -> &'static str {
        "catalog"
    }

    fn targets(&self) -> &'static [TableName] {
        &[TableName::Songs, TableName::Artists]
    }

    fn transform(
        &self,
        bytes: &[u8],
        _lookup: &dyn SongArtistLookup,
    ) -> Result<Vec<TableBatch>, EtlError> {
        let (song, artist) = transform_catalog(bytes)?;
        Ok(vec![
            TableBatch::new(TableName::Songs, vec![Row::Song(song)]),
            TableBatch::new(TableName::Artists, vec![Row::Artist(artist)]),
        ])
    }
}
