//! SQLite implementation of the ReadingRepository.

use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use sqlx::SqlitePool;

use super::{format_datetime, parse_datetime};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{NewReading, Reading, ReadingFilter, SubjectReading};
use crate::domain::ports::ReadingRepository;

/// [`ReadingRepository`](crate::domain::ports::ReadingRepository) over SQLite.
#[derive(Clone)]
pub struct SqliteReadingRepository {
    pool: SqlitePool,
}

impl SqliteReadingRepository {
    /// Wrap an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReadingRepository for SqliteReadingRepository {
    async fn create(&self, subject_id: i64, reading: &NewReading) -> DomainResult<Reading> {
        // Stored with microsecond precision; truncate so the returned value matches.
        let recorded_at = reading.recorded_at.unwrap_or_else(Utc::now).trunc_subsecs(6);

        let result = sqlx::query(
            r#"INSERT INTO readings (subject_id, recorded_at, systolic, diastolic, heart_rate)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(subject_id)
        .bind(format_datetime(&recorded_at))
        .bind(reading.systolic)
        .bind(reading.diastolic)
        .bind(reading.heart_rate)
        .execute(&self.pool)
        .await?;

        Ok(Reading {
            id: result.last_insert_rowid(),
            subject_id,
            recorded_at,
            systolic: reading.systolic,
            diastolic: reading.diastolic,
            heart_rate: reading.heart_rate,
        })
    }

    async fn list(&self, filter: ReadingFilter) -> DomainResult<Vec<Reading>> {
        let rows: Vec<ReadingRow> = match filter.subject_id {
            Some(subject_id) => {
                sqlx::query_as(
                    r#"SELECT id, subject_id, recorded_at, systolic, diastolic, heart_rate
                       FROM readings WHERE subject_id = ? ORDER BY recorded_at, id"#,
                )
                .bind(subject_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    r#"SELECT id, subject_id, recorded_at, systolic, diastolic, heart_rate
                       FROM readings ORDER BY recorded_at, id"#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn scan_joined(&self) -> DomainResult<Vec<SubjectReading>> {
        let rows: Vec<JoinedRow> = sqlx::query_as(
            r#"SELECT r.id AS reading_id, s.id AS subject_id, s.name AS subject_name,
                      r.recorded_at, r.systolic, r.diastolic, r.heart_rate
               FROM readings r
               JOIN subjects s ON s.id = r.subject_id
               ORDER BY r.recorded_at DESC, r.id DESC"#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[derive(sqlx::FromRow)]
struct ReadingRow {
    id: i64,
    subject_id: i64,
    recorded_at: String,
    systolic: i32,
    diastolic: i32,
    heart_rate: Option<i32>,
}

impl TryFrom<ReadingRow> for Reading {
    type Error = DomainError;

    fn try_from(row: ReadingRow) -> Result<Self, Self::Error> {
        Ok(Reading {
            id: row.id,
            subject_id: row.subject_id,
            recorded_at: parse_datetime(&row.recorded_at)?,
            systolic: row.systolic,
            diastolic: row.diastolic,
            heart_rate: row.heart_rate,
        })
    }
}

#[derive(sqlx::FromRow)]
struct JoinedRow {
    reading_id: i64,
    subject_id: i64,
    subject_name: String,
    recorded_at: String,
    systolic: i32,
    diastolic: i32,
    heart_rate: Option<i32>,
}

impl TryFrom<JoinedRow> for SubjectReading {
    type Error = DomainError;

    fn try_from(row: JoinedRow) -> Result<Self, Self::Error> {
        Ok(SubjectReading {
            reading_id: row.reading_id,
            subject_id: row.subject_id,
            subject_name: row.subject_name,
            recorded_at: parse_datetime(&row.recorded_at)?,
            systolic: row.systolic,
            diastolic: row.diastolic,
            heart_rate: row.heart_rate,
        })
    }
}
