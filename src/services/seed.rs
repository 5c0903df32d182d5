//! Demo data for a fresh store.

use chrono::{Duration, NaiveDate, Utc};
use tracing::info;

use super::record_service::RecordService;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{NewReading, NewSubject};
use crate::domain::ports::{ReadingRepository, SubjectRepository};

/// Readings created per demo subject, one per day ending yesterday.
pub const READINGS_PER_SUBJECT: i32 = 10;

/// Outcome of a seeding attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct SeedReport {
    /// Subjects written
    pub subjects_created: usize,
    /// Readings written
    pub readings_created: usize,
}

impl SeedReport {
    /// True when the store already had subjects and nothing was written.
    pub fn skipped(&self) -> bool {
        self.subjects_created == 0
    }
}

/// Populate an empty store with two subjects and a short history each.
///
/// Does nothing when any subject already exists.
pub async fn seed_demo_data<S, R>(records: &RecordService<S, R>) -> DomainResult<SeedReport>
where
    S: SubjectRepository,
    R: ReadingRepository,
{
    if records.count_subjects().await? > 0 {
        info!("store already populated; skipping seed");
        return Ok(SeedReport {
            subjects_created: 0,
            readings_created: 0,
        });
    }

    let demo = [
        NewSubject::new("Alice Smith", date(1980, 5, 12)?).with_gender("F"),
        NewSubject::new("Bob Jones", date(1975, 1, 3)?).with_gender("M"),
    ];

    let now = Utc::now();
    let mut report = SeedReport {
        subjects_created: 0,
        readings_created: 0,
    };

    for (idx, new_subject) in (0i32..).zip(demo) {
        let subject = records.create_subject(new_subject).await?;
        report.subjects_created += 1;

        for i in 0..READINGS_PER_SUBJECT {
            let reading = NewReading::new(120 + idx * 5 + i, 80 + idx * 3 + i)
                .with_heart_rate(70 + i)
                .recorded_at(now - Duration::days(i64::from(READINGS_PER_SUBJECT - i)));
            records.add_reading(subject.id, reading).await?;
            report.readings_created += 1;
        }
    }

    info!(
        subjects = report.subjects_created,
        readings = report.readings_created,
        "seeded demo data"
    );
    Ok(report)
}

fn date(year: i32, month: u32, day: u32) -> DomainResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| DomainError::ValidationFailed(format!("invalid date {year}-{month}-{day}")))
}
