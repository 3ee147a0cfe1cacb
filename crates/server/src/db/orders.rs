//! T-shirt order repository.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use willpower_core::{Email, OrderStatus, TshirtOrderId};

use super::RepositoryError;
use crate::models::TshirtOrder;

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    customer_email: String,
    size: String,
    shipping_address: String,
    status: String,
    printful_order_id: Option<String>,
    tracking_number: Option<String>,
    shipped_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for TshirtOrder {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let customer_email = Email::parse(&row.customer_email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let status =
            OrderStatus::from_str(&row.status).map_err(RepositoryError::DataCorruption)?;

        Ok(Self {
            id: TshirtOrderId::new(row.id),
            customer_email,
            size: row.size,
            shipping_address: row.shipping_address,
            status,
            printful_order_id: row.printful_order_id,
            tracking_number: row.tracking_number,
            shipped_at: row.shipped_at,
            created_at: row.created_at,
        })
    }
}

const SELECT_COLUMNS: &str = "id, customer_email, size, shipping_address, status, \
     printful_order_id, tracking_number, shipped_at, created_at";

/// Repository for t-shirt fulfillment orders.
pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a pending t-shirt order for a new member.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        customer_email: &Email,
        size: &str,
        shipping_address: &str,
    ) -> Result<TshirtOrder, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            INSERT INTO tshirt_orders (customer_email, size, shipping_address, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING {SELECT_COLUMNS}
            "
        ))
        .bind(customer_email.as_str())
        .bind(size)
        .bind(shipping_address)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Mark an order as accepted by Printful.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn mark_sent(
        &self,
        id: TshirtOrderId,
        printful_order_id: &str,
    ) -> Result<Option<TshirtOrder>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            UPDATE tshirt_orders
            SET status = 'sent', printful_order_id = ?2
            WHERE id = ?1
            RETURNING {SELECT_COLUMNS}
            "
        ))
        .bind(id.as_i64())
        .bind(printful_order_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TshirtOrder::try_from).transpose()
    }

    /// Mark an order as shipped, recording the tracking number.
    ///
    /// Keyed by the Printful order ID, which is what fulfillment
    /// webhooks carry. Returns `None` if no order matches.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn mark_shipped(
        &self,
        printful_order_id: &str,
        tracking_number: Option<&str>,
    ) -> Result<Option<TshirtOrder>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            UPDATE tshirt_orders
            SET status = 'shipped', tracking_number = ?2, shipped_at = ?3
            WHERE printful_order_id = ?1
            RETURNING {SELECT_COLUMNS}
            "
        ))
        .bind(printful_order_id)
        .bind(tracking_number)
        .bind(Utc::now())
        .fetch_optional(self.pool)
        .await?;

        row.map(TshirtOrder::try_from).transpose()
    }

    /// All orders for a customer, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_customer(
        &self,
        customer_email: &Email,
    ) -> Result<Vec<TshirtOrder>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {SELECT_COLUMNS}
            FROM tshirt_orders
            WHERE customer_email = ?1
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(customer_email.as_str())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TshirtOrder::try_from).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;

    #[tokio::test]
    async fn test_order_lifecycle() {
        let pool = test_pool().await;
        let repo = OrderRepository::new(&pool);
        let email = Email::parse("bob@example.com").unwrap();

        let order = repo
            .create(&email, "L", "123 Main St, Los Angeles CA 90210")
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.printful_order_id.is_none());

        let sent = repo
            .mark_sent(order.id, "12345678")
            .await
            .unwrap()
            .expect("order should exist");
        assert_eq!(sent.status, OrderStatus::Sent);
        assert_eq!(sent.printful_order_id.as_deref(), Some("12345678"));

        let shipped = repo
            .mark_shipped("12345678", Some("9400111899560000000000"))
            .await
            .unwrap()
            .expect("order should exist");
        assert_eq!(shipped.status, OrderStatus::Shipped);
        assert!(shipped.shipped_at.is_some());
    }

    #[tokio::test]
    async fn test_mark_shipped_unknown_order() {
        let pool = test_pool().await;
        let repo = OrderRepository::new(&pool);

        let result = repo.mark_shipped("unknown", None).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_list_for_customer_newest_first() {
        let pool = test_pool().await;
        let repo = OrderRepository::new(&pool);
        let email = Email::parse("bob@example.com").unwrap();

        repo.create(&email, "M", "addr one").await.unwrap();
        repo.create(&email, "XL", "addr two").await.unwrap();

        let orders = repo.list_for_customer(&email).await.unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].size, "XL");
    }
}
