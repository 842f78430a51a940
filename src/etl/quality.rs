//! Advisory data-quality checks run on every batch before it is written.
//!
//! Reports never filter or reject rows.

use super::models::{Row, TableName};
use std::fmt;

/// Checks specific to one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableChecks {
    None,
    Songs {
        /// Rows with a negative year.
        invalid_years: usize,
        /// Rows with a duration that is zero or negative.
        invalid_durations: usize,
    },
    Songplays {
        /// Plays that could not be linked to a catalog song.
        unresolved: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityReport {
    pub table: TableName,
    pub total_rows: usize,
    /// Null count for every column of the table, in column order.
    pub null_counts: Vec<(&'static str, usize)>,
    pub checks: TableChecks,
}

impl QualityReport {
    /// True when a table-specific check flagged at least one row.
    pub fn has_findings(&self) -> bool {
        match self.checks {
            TableChecks::None => false,
            TableChecks::Songs {
                invalid_years,
                invalid_durations,
            } => invalid_years > 0 || invalid_durations > 0,
            TableChecks::Songplays { unresolved } => unresolved > 0,
        }
    }
}

impl fmt::Display for QualityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} rows", self.table, self.total_rows)?;
        let nulls: Vec<String> = self
            .null_counts
            .iter()
            .filter(|(_, n)| *n > 0)
            .map(|(column, n)| format!("{}={}", column, n))
            .collect();
        if !nulls.is_empty() {
            write!(f, ", nulls [{}]", nulls.join(", "))?;
        }
        match self.checks {
            TableChecks::None => Ok(()),
            TableChecks::Songs {
                invalid_years,
                invalid_durations,
            } => write!(
                f,
                ", invalid years {}, invalid durations {}",
                invalid_years, invalid_durations
            ),
            TableChecks::Songplays { unresolved } => {
                write!(f, ", unresolved plays {}", unresolved)
            }
        }
    }
}

/// Computes the quality report of `rows` as a batch for `table`.
pub fn check(rows: &[Row], table: TableName) -> QualityReport {
    let columns = table.columns();
    let mut nulls = vec![0usize; columns.len()];
    let mut invalid_years = 0;
    let mut invalid_durations = 0;
    let mut unresolved = 0;

    for row in rows {
        for (count, value) in nulls.iter_mut().zip(row.values()) {
            if value.is_null() {
                *count += 1;
            }
        }
        match row {
            Row::Song(song) => {
                if song.year < 0 {
                    invalid_years += 1;
                }
                if song.duration <= 0.0 {
                    invalid_durations += 1;
                }
            }
            Row::Play(play) if play.resolved.is_none() => unresolved += 1,
            _ => {}
        }
    }

    let checks = match table {
        TableName::Songs => TableChecks::Songs {
            invalid_years,
            invalid_durations,
        },
        TableName::Songplays => TableChecks::Songplays { unresolved },
        _ => TableChecks::None,
    };

    QualityReport {
        table,
        total_rows: rows.len(),
        null_counts: columns.iter().copied().zip(nulls).collect(),
        checks,
    }
}
