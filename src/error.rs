//! Error types.

use thiserror::Error;

use crate::conflict::ConflictReport;
use crate::models::Day;

/// Result type for grid mutations.
pub type Result<T> = std::result::Result<T, GridError>;

/// Errors returned by grid mutations.
///
/// `Conflicts` is the only condition a user is expected to act on; the
/// remaining variants are caller contract violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// The write collides with existing teacher or room assignments.
    #[error("{0}")]
    Conflicts(ConflictReport),

    /// The row does not exist for that day.
    #[error("row {row} out of range for {day} ({rows} rows)")]
    RowOutOfRange { day: Day, row: usize, rows: usize },

    /// The column is not a time-slot index.
    #[error("column {column} out of range ({columns} columns)")]
    ColumnOutOfRange { column: usize, columns: usize },

    /// A merge was requested on the last column.
    #[error("column {column} has no following column to merge with")]
    MergeOutOfRange { column: usize },

    /// The cell references a course that is not in the course list.
    #[error("unknown course code: {0}")]
    UnknownCourse(String),
}

impl GridError {
    /// The conflict report, if this write was rejected for conflicts.
    pub fn conflicts(&self) -> Option<&ConflictReport> {
        match self {
            GridError::Conflicts(report) => Some(report),
            _ => None,
        }
    }
}

/// Errors from snapshot import, export and lookup.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Text is not valid JSON for the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Parsed JSON is missing required parts of an app state.
    #[error("invalid app state: {0}")]
    InvalidStructure(String),

    /// No snapshot with that id.
    #[error("snapshot not found: {0}")]
    NotFound(String),
}
