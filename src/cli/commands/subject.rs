//! Subject CLI commands.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand};

use crate::cli::output::{list_table, output, render_list, truncate, CommandOutput};
use crate::domain::models::{Config, NewSubject, Subject};
use crate::infrastructure::AppContext;

/// Arguments for `vitals subject`.
#[derive(Args, Debug)]
pub struct SubjectArgs {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: SubjectCommands,
}

/// Subject subcommands.
#[derive(Subcommand, Debug)]
pub enum SubjectCommands {
    /// Register a new subject
    Add {
        /// Display name
        name: String,
        /// Date of birth (YYYY-MM-DD)
        #[arg(long)]
        dob: NaiveDate,
        /// Gender
        #[arg(short, long)]
        gender: Option<String>,
    },
    /// List subjects
    List,
    /// Show subject details
    Show {
        /// Subject ID
        id: i64,
    },
}

/// Subject as printed by the CLI.
#[derive(Debug, serde::Serialize)]
pub struct SubjectOutput {
    /// Subject identifier
    pub id: i64,
    /// Display name
    pub name: String,
    /// YYYY-MM-DD
    pub date_of_birth: String,
    /// Free-form, optional
    pub gender: Option<String>,
    /// RFC 3339
    pub created_at: String,
}

impl From<&Subject> for SubjectOutput {
    fn from(subject: &Subject) -> Self {
        Self {
            id: subject.id,
            name: subject.name.clone(),
            date_of_birth: subject.date_of_birth.to_string(),
            gender: subject.gender.clone(),
            created_at: subject.created_at.to_rfc3339(),
        }
    }
}

/// Result of `subject list`.
#[derive(Debug, serde::Serialize)]
pub struct SubjectListOutput {
    /// Subjects listed
    pub subjects: Vec<SubjectOutput>,
    /// Number of items listed
    pub total: usize,
}

impl CommandOutput for SubjectListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["id", "name", "born", "gender"]);
        for subject in &self.subjects {
            table.add_row(vec![
                subject.id.to_string(),
                truncate(&subject.name, 32),
                subject.date_of_birth.clone(),
                subject.gender.clone().unwrap_or_else(|| "-".to_string()),
            ]);
        }
        render_list("subject", &table, self.total)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Result of `subject add`.
#[derive(Debug, serde::Serialize)]
pub struct SubjectActionOutput {
    /// Whether the command succeeded
    pub success: bool,
    /// Summary line
    pub message: String,
    /// The stored subject
    pub subject: SubjectOutput,
}

impl CommandOutput for SubjectActionOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![
            self.message.clone(),
            format!("ID: {}", self.subject.id),
            format!("Name: {}", self.subject.name),
            format!("Born: {}", self.subject.date_of_birth),
        ];
        if let Some(gender) = &self.subject.gender {
            lines.push(format!("Gender: {gender}"));
        }
        lines.push(format!("Created: {}", self.subject.created_at));
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Run a `subject` subcommand.
pub async fn execute(args: SubjectArgs, config: &Config, json_mode: bool) -> Result<()> {
    let ctx = AppContext::from_config(config).await?;

    match args.command {
        SubjectCommands::Add { name, dob, gender } => {
            let mut new_subject = NewSubject::new(name, dob);
            new_subject.gender = gender;

            let subject = ctx.records.create_subject(new_subject).await?;
            let out = SubjectActionOutput {
                success: true,
                message: format!("Subject created: {}", subject.id),
                subject: SubjectOutput::from(&subject),
            };
            output(&out, json_mode);
        }

        SubjectCommands::List => {
            let subjects = ctx.records.list_subjects().await?;
            let out = SubjectListOutput {
                total: subjects.len(),
                subjects: subjects.iter().map(SubjectOutput::from).collect(),
            };
            output(&out, json_mode);
        }

        SubjectCommands::Show { id } => {
            let subject = ctx
                .records
                .get_subject(id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Subject not found: {}", id))?;

            let out = SubjectActionOutput {
                success: true,
                message: format!("Subject {}", subject.id),
                subject: SubjectOutput::from(&subject),
            };
            output(&out, json_mode);
        }
    }

    Ok(())
}
