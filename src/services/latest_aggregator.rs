//! Latest-reading-per-subject aggregation.
//!
//! Reduces a full scan of joined readings to one row per subject holding
//! that subject's most recent reading.
//!
//! Ordering policy: rows are ranked by `recorded_at` descending. Two
//! readings with the same timestamp are ranked by reading id descending,
//! so the one inserted later wins. The output keeps that ranking, which
//! makes it descending by each row's own timestamp.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::domain::models::{LatestReadingRow, SubjectReading};

/// Ranking used for "latest": newest timestamp first, then newest insertion.
pub fn latest_first(a: &SubjectReading, b: &SubjectReading) -> Ordering {
    b.recorded_at
        .cmp(&a.recorded_at)
        .then_with(|| b.reading_id.cmp(&a.reading_id))
}

/// Compute one [`LatestReadingRow`] per subject with at least one reading.
///
/// The input is normally already ranked by the store; it is re-sorted here
/// so the result never depends on the scan order. Pure and read-only.
pub fn latest_per_subject(mut rows: Vec<SubjectReading>) -> Vec<LatestReadingRow> {
    rows.sort_by(latest_first);

    let mut seen = HashSet::with_capacity(rows.len().min(1024));
    rows.iter()
        .filter(|row| seen.insert(row.subject_id))
        .map(LatestReadingRow::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn t(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap()
    }

    fn reading(reading_id: i64, subject_id: i64, name: &str, at: DateTime<Utc>, sys: i32, dia: i32) -> SubjectReading {
        SubjectReading {
            reading_id,
            subject_id,
            subject_name: name.to_string(),
            recorded_at: at,
            systolic: sys,
            diastolic: dia,
            heart_rate: None,
        }
    }

    #[test]
    fn test_empty_scan_yields_no_rows() {
        assert!(latest_per_subject(Vec::new()).is_empty());
    }

    #[test]
    fn test_latest_reading_wins() {
        let rows = vec![
            reading(1, 1, "Alice", t(1), 120, 80),
            reading(2, 1, "Alice", t(2), 130, 85),
        ];

        let latest = latest_per_subject(rows);
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].name, "Alice");
        assert_eq!((latest[0].systolic, latest[0].diastolic), (130, 85));
        assert_eq!(latest[0].timestamp, t(2));
    }

    #[test]
    fn test_one_row_per_subject_ordered_by_timestamp_desc() {
        let rows = vec![
            reading(1, 1, "Alice", t(1), 120, 80),
            reading(2, 2, "Bob", t(5), 140, 90),
            reading(3, 3, "Carol", t(3), 110, 70),
            reading(4, 1, "Alice", t(4), 125, 82),
            reading(5, 2, "Bob", t(2), 135, 88),
        ];

        let latest = latest_per_subject(rows);
        let names: Vec<_> = latest.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Bob", "Alice", "Carol"]);
        assert_eq!(latest[0].systolic, 140);
        assert_eq!(latest[1].systolic, 125);
    }

    #[test]
    fn test_equal_timestamps_prefer_later_insertion() {
        let rows = vec![
            reading(7, 1, "Alice", t(3), 120, 80),
            reading(9, 1, "Alice", t(3), 150, 95),
            reading(8, 1, "Alice", t(3), 130, 85),
        ];

        let latest = latest_per_subject(rows);
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].systolic, 150);
    }

    #[test]
    fn test_scan_order_does_not_matter() {
        let base = t(0);
        let rows: Vec<_> = (0..20)
            .map(|i| reading(i, i % 4, &format!("S{}", i % 4), base + Duration::minutes(i * 7 % 11), 100 + i as i32, 70))
            .collect();
        let mut reversed = rows.clone();
        reversed.reverse();

        assert_eq!(latest_per_subject(rows), latest_per_subject(reversed));
    }

    #[test]
    fn test_dedup_is_by_identity_not_name() {
        let rows = vec![
            reading(1, 1, "Sam Lee", t(1), 120, 80),
            reading(2, 2, "Sam Lee", t(2), 130, 85),
        ];

        let latest = latest_per_subject(rows);
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].subject_id, 2);
        assert_eq!(latest[1].subject_id, 1);
    }
}
