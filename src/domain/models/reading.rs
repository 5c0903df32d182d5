//! Reading domain model.
//!
//! A reading is one blood-pressure measurement for a subject. Readings are
//! append-only: once written they are never updated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Accepted systolic pressure (mmHg).
pub const SYSTOLIC_RANGE: RangeInclusive<i32> = 60..=260;

/// Accepted diastolic pressure (mmHg).
pub const DIASTOLIC_RANGE: RangeInclusive<i32> = 30..=180;

/// Accepted heart rate (beats per minute).
pub const HEART_RATE_RANGE: RangeInclusive<i32> = 30..=220;

/// A persisted reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    /// Store-assigned identifier, increasing in insertion order
    pub id: i64,
    /// Owning subject
    pub subject_id: i64,
    /// When the measurement was taken
    pub recorded_at: DateTime<Utc>,
    /// mmHg
    pub systolic: i32,
    /// mmHg
    pub diastolic: i32,
    /// Beats per minute
    pub heart_rate: Option<i32>,
}

/// Input for recording a reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReading {
    /// mmHg
    pub systolic: i32,
    /// mmHg
    pub diastolic: i32,
    /// Beats per minute
    #[serde(default)]
    pub heart_rate: Option<i32>,
    /// Defaults to the time of insertion when absent.
    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
}

impl NewReading {
    /// Reading taken now, without heart rate.
    pub fn new(systolic: i32, diastolic: i32) -> Self {
        Self {
            systolic,
            diastolic,
            heart_rate: None,
            recorded_at: None,
        }
    }

    /// Attach a heart rate.
    pub fn with_heart_rate(mut self, heart_rate: i32) -> Self {
        self.heart_rate = Some(heart_rate);
        self
    }

    /// Set the measurement time.
    pub fn recorded_at(mut self, at: DateTime<Utc>) -> Self {
        self.recorded_at = Some(at);
        self
    }

    /// Validate measurement ranges.
    pub fn validate(&self) -> Result<(), String> {
        check_range("systolic", self.systolic, &SYSTOLIC_RANGE)?;
        check_range("diastolic", self.diastolic, &DIASTOLIC_RANGE)?;
        if let Some(hr) = self.heart_rate {
            check_range("heart_rate", hr, &HEART_RATE_RANGE)?;
        }
        Ok(())
    }
}

fn check_range(field: &str, value: i32, range: &RangeInclusive<i32>) -> Result<(), String> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(format!(
            "{field} {value} is outside {}..={}",
            range.start(),
            range.end()
        ))
    }
}

/// Filter criteria for listing readings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadingFilter {
    /// Restrict to one subject
    pub subject_id: Option<i64>,
}

impl ReadingFilter {
    /// Readings of one subject only.
    pub fn for_subject(subject_id: i64) -> Self {
        Self {
            subject_id: Some(subject_id),
        }
    }
}
