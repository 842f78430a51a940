//! Shared constants for end-to-end tests
//!
//! When the fixture catalog or event logs change, update only this file.

// ============================================================================
// Catalog
// ============================================================================

/// "Setanta matinee" by Elena, the only song the events can resolve.
pub const SONG_1_ID: &str = "SOZCTXZ12AB0182364";
pub const SONG_1_TITLE: &str = "Setanta matinee";
pub const SONG_1_DURATION: f64 = 269.58322;
pub const ARTIST_1_ID: &str = "AR5KOSW1187FB35FF4";
pub const ARTIST_1_NAME: &str = "Elena";

/// "Der Kleine Dompfaff" by Jurgen Paape.
pub const SONG_2_ID: &str = "SOMZWCG12A8C13C480";
pub const ARTIST_2_ID: &str = "ARD7TVE1187B99BFB1";

/// "I Didn't Mean To" by Casual, year unknown.
pub const SONG_3_ID: &str = "SOMJBYD12A6D4F8557";
pub const ARTIST_3_ID: &str = "ARMJAGH1187FB546F3";

pub const CATALOG_FILES: usize = 3;

// ============================================================================
// Event logs
// ============================================================================

/// Events per log file, NextSong plays included.
pub const EVENTS_PER_LOG_FILE: usize = 4;

/// NextSong plays per log file.
pub const PLAYS_PER_LOG_FILE: usize = 2;

pub const LOG_FILES: usize = 2;

/// Timestamp of the play that resolves to SONG_1_ID.
pub const RESOLVED_PLAY_TS: i64 = 1542242826796;

pub const USER_ID: &str = "15";
