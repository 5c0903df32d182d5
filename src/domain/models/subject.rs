//! Subject domain model.
//!
//! A subject is the tracked person that readings belong to. Subjects are
//! immutable once created.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A tracked subject (patient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Store-assigned identifier
    pub id: i64,
    /// Display name
    pub name: String,
    /// Date of birth
    pub date_of_birth: NaiveDate,
    /// Free-form, optional
    pub gender: Option<String>,
    /// Set by the store on insert
    pub created_at: DateTime<Utc>,
}

/// Input for creating a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubject {
    /// Display name, must not be blank
    pub name: String,
    /// Date of birth
    pub date_of_birth: NaiveDate,
    /// Free-form, optional
    #[serde(default)]
    pub gender: Option<String>,
}

impl NewSubject {
    /// Subject without a gender.
    pub fn new(name: impl Into<String>, date_of_birth: NaiveDate) -> Self {
        Self {
            name: name.into(),
            date_of_birth,
            gender: None,
        }
    }

    /// Attach a gender.
    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    /// Validate the subject before it is persisted.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Subject name cannot be empty".to_string());
        }
        if self.date_of_birth > Utc::now().date_naive() {
            return Err(format!(
                "Date of birth {} is in the future",
                self.date_of_birth
            ));
        }
        if matches!(&self.gender, Some(g) if g.trim().is_empty()) {
            return Err("Gender cannot be blank; omit it instead".to_string());
        }
        Ok(())
    }
}
