//! Test fixture creation for data trees and warehouses

use super::constants::*;
use sparkify_etl::etl::{run_pipeline, DriverOptions, EtlError, PipelineSummary, TracingReporter};
use sparkify_etl::warehouse::SqliteWarehouse;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn song_json(
    song_id: &str,
    title: &str,
    artist_id: &str,
    artist_name: &str,
    duration: f64,
    year: i32,
) -> String {
    format!(
        r#"{{"num_songs": 1, "artist_id": "{artist_id}", "artist_latitude": null, "artist_longitude": null, "artist_location": "", "artist_name": "{artist_name}", "song_id": "{song_id}", "title": "{title}", "duration": {duration}, "year": {year}}}"#
    )
}

fn event_json(page: &str, ts: i64, song: Option<(&str, &str, f64)>, level: &str) -> String {
    let (artist, title, length) = match song {
        Some((title, artist, length)) => (
            format!("\"{}\"", artist),
            format!("\"{}\"", title),
            length.to_string(),
        ),
        None => ("null".to_string(), "null".to_string(), "null".to_string()),
    };
    format!(
        r#"{{"artist":{artist},"auth":"Logged In","firstName":"Lily","gender":"F","itemInSession":0,"lastName":"Koch","length":{length},"level":"{level}","location":"Chicago-Naperville-Elgin, IL-IN-WI","method":"PUT","page":"{page}","registration":1541048010796.0,"sessionId":818,"song":{title},"status":200,"ts":{ts},"userAgent":"Mozilla\/5.0","userId":"{USER_ID}"}}"#
    )
}

/// A temporary `song_data` / `log_data` layout plus a database path.
pub struct DataTree {
    pub dir: TempDir,
}

impl DataTree {
    /// Three catalog files and two event-log files with two plays each.
    ///
    /// Exactly one play resolves against the catalog; the user upgrades
    /// from free to paid in the second log file.
    pub fn standard() -> Self {
        let tree = DataTree {
            dir: TempDir::new().unwrap(),
        };

        tree.write_song(
            "A/A/A/TRAAAAW128F429D538.json",
            &song_json(
                SONG_1_ID,
                SONG_1_TITLE,
                ARTIST_1_ID,
                ARTIST_1_NAME,
                SONG_1_DURATION,
                0,
            ),
        );
        tree.write_song(
            "A/B/C/TRABCEI128F424C983.json",
            &song_json(
                SONG_2_ID,
                "Der Kleine Dompfaff",
                ARTIST_2_ID,
                "Jurgen Paape",
                258.61833,
                2008,
            ),
        );
        tree.write_song(
            "B/A/A/TRBAAEH128F42B4D0D.json",
            &song_json(
                SONG_3_ID,
                "I Didn't Mean To",
                ARTIST_3_ID,
                "Casual",
                218.93179,
                0,
            ),
        );

        let first_log = [
            event_json("Home", 1541105830796, None, "free"),
            event_json(
                "NextSong",
                1541106106796,
                Some(("Unknown Song", "Unknown Artist", 100.0)),
                "free",
            ),
            event_json("Logout", 1541106107796, None, "free"),
            event_json(
                "NextSong",
                1541106106796,
                Some(("Another Unknown", "Nobody", 200.0)),
                "free",
            ),
        ];
        let second_log = [
            event_json("Home", 1542242826000, None, "paid"),
            event_json(
                "NextSong",
                RESOLVED_PLAY_TS,
                Some((SONG_1_TITLE, ARTIST_1_NAME, SONG_1_DURATION)),
                "paid",
            ),
            event_json("Settings", 1542242827000, None, "paid"),
            event_json(
                "NextSong",
                1543537327796,
                Some((SONG_1_TITLE, ARTIST_1_NAME, 1.0)),
                "paid",
            ),
        ];
        tree.write_log("2018/11/2018-11-01-events.json", &first_log.join("\n"));
        tree.write_log("2018/11/2018-11-15-events.json", &second_log.join("\n"));

        tree
    }

    pub fn song_root(&self) -> PathBuf {
        self.dir.path().join("song_data")
    }

    pub fn log_root(&self) -> PathBuf {
        self.dir.path().join("log_data")
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("sparkify.db")
    }

    pub fn write_song(&self, relative: &str, content: &str) {
        write_file(&self.song_root().join(relative), content);
    }

    pub fn write_log(&self, relative: &str, content: &str) {
        write_file(&self.log_root().join(relative), content);
    }

    pub fn open_warehouse(&self) -> SqliteWarehouse {
        SqliteWarehouse::open(self.db_path()).unwrap()
    }

    pub fn load_into(&self, warehouse: &SqliteWarehouse) -> Result<PipelineSummary, EtlError> {
        self.load_with(warehouse, DriverOptions::default())
    }

    pub fn load_with(
        &self,
        warehouse: &SqliteWarehouse,
        options: DriverOptions,
    ) -> Result<PipelineSummary, EtlError> {
        run_pipeline(
            &self.song_root(),
            &self.log_root(),
            options,
            warehouse,
            &TracingReporter,
        )
    }
}

fn write_file(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}
