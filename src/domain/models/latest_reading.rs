//! Joined scan rows and the derived latest-reading projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One reading joined with its subject's identity, as returned by a full scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectReading {
    /// Reading identifier
    pub reading_id: i64,
    /// Owning subject
    pub subject_id: i64,
    /// Subject display name
    pub subject_name: String,
    /// When the measurement was taken
    pub recorded_at: DateTime<Utc>,
    /// mmHg
    pub systolic: i32,
    /// mmHg
    pub diastolic: i32,
    /// Beats per minute
    pub heart_rate: Option<i32>,
}

/// Most recent reading of a single subject.
///
/// Derived and never persisted on its own; always recomputable from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestReadingRow {
    /// Owning subject
    pub subject_id: i64,
    /// Subject display name
    pub name: String,
    /// mmHg
    pub systolic: i32,
    /// mmHg
    pub diastolic: i32,
    /// Beats per minute
    pub heart_rate: Option<i32>,
    /// Serialized as RFC 3339
    pub timestamp: DateTime<Utc>,
}

impl From<&SubjectReading> for LatestReadingRow {
    fn from(row: &SubjectReading) -> Self {
        Self {
            subject_id: row.subject_id,
            name: row.subject_name.clone(),
            systolic: row.systolic,
            diastolic: row.diastolic,
            heart_rate: row.heart_rate,
            timestamp: row.recorded_at,
        }
    }
}
