//! SQLite implementation of the SubjectRepository.

use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use sqlx::SqlitePool;

use super::{format_datetime, parse_date, parse_datetime};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{NewSubject, Subject};
use crate::domain::ports::SubjectRepository;

/// [`SubjectRepository`](crate::domain::ports::SubjectRepository) over SQLite.
#[derive(Clone)]
pub struct SqliteSubjectRepository {
    pool: SqlitePool,
}

impl SqliteSubjectRepository {
    /// Wrap an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubjectRepository for SqliteSubjectRepository {
    async fn create(&self, subject: &NewSubject) -> DomainResult<Subject> {
        let created_at = Utc::now().trunc_subsecs(6);

        let result = sqlx::query(
            "INSERT INTO subjects (name, date_of_birth, gender, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&subject.name)
        .bind(subject.date_of_birth.format("%Y-%m-%d").to_string())
        .bind(&subject.gender)
        .bind(format_datetime(&created_at))
        .execute(&self.pool)
        .await?;

        Ok(Subject {
            id: result.last_insert_rowid(),
            name: subject.name.clone(),
            date_of_birth: subject.date_of_birth,
            gender: subject.gender.clone(),
            created_at,
        })
    }

    async fn get(&self, id: i64) -> DomainResult<Option<Subject>> {
        let row: Option<SubjectRow> = sqlx::query_as(
            "SELECT id, name, date_of_birth, gender, created_at FROM subjects WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn list(&self) -> DomainResult<Vec<Subject>> {
        let rows: Vec<SubjectRow> = sqlx::query_as(
            "SELECT id, name, date_of_birth, gender, created_at FROM subjects ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn count(&self) -> DomainResult<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM subjects")
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

#[derive(sqlx::FromRow)]
struct SubjectRow {
    id: i64,
    name: String,
    date_of_birth: String,
    gender: Option<String>,
    created_at: String,
}

impl TryFrom<SubjectRow> for Subject {
    type Error = DomainError;

    fn try_from(row: SubjectRow) -> Result<Self, Self::Error> {
        Ok(Subject {
            id: row.id,
            name: row.name,
            date_of_birth: parse_date(&row.date_of_birth)?,
            gender: row.gender,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;
    use chrono::NaiveDate;

    async fn setup_test_repo() -> SqliteSubjectRepository {
        let pool = create_migrated_test_pool().await.unwrap();
        SqliteSubjectRepository::new(pool)
    }

    fn alice() -> NewSubject {
        NewSubject::new("Alice Smith", NaiveDate::from_ymd_opt(1980, 5, 12).unwrap()).with_gender("F")
    }

    #[tokio::test]
    async fn test_create_and_get_subject() {
        let repo = setup_test_repo().await;
        let created = repo.create(&alice()).await.unwrap();

        let fetched = repo.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.gender.as_deref(), Some("F"));
    }

    #[tokio::test]
    async fn test_get_missing_subject() {
        let repo = setup_test_repo().await;
        assert!(repo.get(404).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_in_insertion_order() {
        let repo = setup_test_repo().await;
        let bob = NewSubject::new("Bob Jones", NaiveDate::from_ymd_opt(1975, 1, 3).unwrap());
        let a = repo.create(&alice()).await.unwrap();
        let b = repo.create(&bob).await.unwrap();

        let subjects = repo.list().await.unwrap();
        assert_eq!(subjects.iter().map(|s| s.id).collect::<Vec<_>>(), vec![a.id, b.id]);
        assert_eq!(repo.count().await.unwrap(), 2);
    }
}
