//! Lead capture repository.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use willpower_core::{Email, LeadId, LeadStatus};

use super::RepositoryError;
use crate::models::Lead;

#[derive(sqlx::FromRow)]
struct LeadRow {
    id: i64,
    email: String,
    name: String,
    phone: Option<String>,
    goals: Option<String>,
    experience: Option<String>,
    initial_message: Option<String>,
    ai_response: Option<String>,
    source: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<LeadRow> for Lead {
    type Error = RepositoryError;

    fn try_from(row: LeadRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let status = LeadStatus::from_str(&row.status).map_err(RepositoryError::DataCorruption)?;

        Ok(Self {
            id: LeadId::new(row.id),
            email,
            name: row.name,
            phone: row.phone,
            goals: row.goals,
            experience: row.experience,
            initial_message: row.initial_message,
            ai_response: row.ai_response,
            source: row.source,
            status,
            created_at: row.created_at,
        })
    }
}

/// Fields written by a lead upsert.
#[derive(Debug, Clone)]
pub struct LeadUpsert<'a> {
    pub email: &'a Email,
    pub name: &'a str,
    pub phone: Option<&'a str>,
    pub goals: Option<&'a str>,
    pub experience: Option<&'a str>,
    pub initial_message: Option<&'a str>,
    pub ai_response: Option<&'a str>,
    /// Channel of this submission. The stored source keeps first-touch
    /// attribution, so it only applies to new leads.
    pub source: &'a str,
}

/// Repository for marketing leads.
pub struct LeadRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> LeadRepository<'a> {
    /// Create a new lead repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create or refresh a lead, keyed by email.
    ///
    /// Repeat form submissions update the existing record rather than
    /// erroring; status is left alone so a converted lead stays converted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(&self, params: LeadUpsert<'_>) -> Result<Lead, RepositoryError> {
        let row = sqlx::query_as::<_, LeadRow>(
            r"
            INSERT INTO leads
                (email, name, phone, goals, experience, initial_message,
                 ai_response, source, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT (email) DO UPDATE SET
                name = excluded.name,
                phone = COALESCE(excluded.phone, leads.phone),
                goals = COALESCE(excluded.goals, leads.goals),
                experience = COALESCE(excluded.experience, leads.experience),
                initial_message = COALESCE(excluded.initial_message, leads.initial_message),
                ai_response = COALESCE(excluded.ai_response, leads.ai_response)
            RETURNING id, email, name, phone, goals, experience, initial_message,
                      ai_response, source, status, created_at
            ",
        )
        .bind(params.email.as_str())
        .bind(params.name)
        .bind(params.phone)
        .bind(params.goals)
        .bind(params.experience)
        .bind(params.initial_message)
        .bind(params.ai_response)
        .bind(params.source)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Get a lead by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<Lead>, RepositoryError> {
        let row = sqlx::query_as::<_, LeadRow>(
            r"
            SELECT id, email, name, phone, goals, experience, initial_message,
                   ai_response, source, status, created_at
            FROM leads
            WHERE email = ?1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(Lead::try_from).transpose()
    }

    /// Mark a lead as converted (became a paying customer).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn mark_converted(&self, email: &Email) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            UPDATE leads
            SET status = 'converted'
            WHERE email = ?1
            ",
        )
        .bind(email.as_str())
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
