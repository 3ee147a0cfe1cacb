//! Customer repository for membership records.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use willpower_core::{CurrencyCode, CustomerId, Email, MembershipStatus, Price};

use super::RepositoryError;
use crate::models::Customer;

#[derive(sqlx::FromRow)]
struct CustomerRow {
    id: i64,
    email: String,
    name: Option<String>,
    stripe_subscription_id: Option<String>,
    status: String,
    monthly_amount_cents: i64,
    fitness_goals: Option<String>,
    experience_level: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = RepositoryError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let status =
            MembershipStatus::from_str(&row.status).map_err(RepositoryError::DataCorruption)?;

        Ok(Self {
            id: CustomerId::new(row.id),
            email,
            name: row.name,
            stripe_subscription_id: row.stripe_subscription_id,
            status,
            monthly_amount: Price::from_cents(row.monthly_amount_cents, CurrencyCode::USD),
            fitness_goals: row.fitness_goals,
            experience_level: row.experience_level,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Fields written by a customer upsert.
///
/// Optional fields are merged: a `None` here keeps whatever the row
/// already holds, so replayed webhook events never blank out data.
#[derive(Debug, Clone)]
pub struct CustomerUpsert<'a> {
    pub email: &'a Email,
    pub name: Option<&'a str>,
    pub stripe_subscription_id: Option<&'a str>,
    pub status: MembershipStatus,
    pub fitness_goals: Option<&'a str>,
    pub experience_level: Option<&'a str>,
}

/// Repository for paying customers.
pub struct CustomerRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create or update a customer, keyed by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(&self, params: CustomerUpsert<'_>) -> Result<Customer, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            INSERT INTO customers
                (email, name, stripe_subscription_id, status,
                 fitness_goals, experience_level, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            ON CONFLICT (email) DO UPDATE SET
                name = COALESCE(excluded.name, customers.name),
                stripe_subscription_id =
                    COALESCE(excluded.stripe_subscription_id, customers.stripe_subscription_id),
                status = excluded.status,
                fitness_goals = COALESCE(excluded.fitness_goals, customers.fitness_goals),
                experience_level =
                    COALESCE(excluded.experience_level, customers.experience_level),
                updated_at = excluded.updated_at
            RETURNING id, email, name, stripe_subscription_id, status,
                      monthly_amount_cents, fitness_goals, experience_level,
                      created_at, updated_at
            ",
        )
        .bind(params.email.as_str())
        .bind(params.name)
        .bind(params.stripe_subscription_id)
        .bind(params.status.to_string())
        .bind(params.fitness_goals)
        .bind(params.experience_level)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Get a customer by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored value is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            SELECT id, email, name, stripe_subscription_id, status,
                   monthly_amount_cents, fitness_goals, experience_level,
                   created_at, updated_at
            FROM customers
            WHERE email = ?1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(Customer::try_from).transpose()
    }

    /// Update the membership status of the customer holding a subscription.
    ///
    /// Subscription lifecycle events carry a subscription ID rather than
    /// an email, so this is the lookup key for updates and cancellations.
    /// Returns the updated customer, or `None` if no customer holds the
    /// subscription.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_status_by_subscription(
        &self,
        subscription_id: &str,
        status: MembershipStatus,
    ) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            UPDATE customers
            SET status = ?2, updated_at = ?3
            WHERE stripe_subscription_id = ?1
            RETURNING id, email, name, stripe_subscription_id, status,
                      monthly_amount_cents, fitness_goals, experience_level,
                      created_at, updated_at
            ",
        )
        .bind(subscription_id)
        .bind(status.to_string())
        .bind(Utc::now())
        .fetch_optional(self.pool)
        .await?;

        row.map(Customer::try_from).transpose()
    }
}
