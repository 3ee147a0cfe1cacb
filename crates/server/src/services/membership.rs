//! Payment webhook orchestration.
//!
//! Consumes verified Stripe events and drives the membership lifecycle:
//! checkout completions create or refresh a customer (and kick off the
//! free t-shirt fulfillment), subscription lifecycle events update
//! membership status. Fulfillment failures are logged and leave the
//! order pending for manual handling; there is no automatic retry.

use sqlx::SqlitePool;
use tracing::{info, instrument, warn};

use willpower_core::{Email, MembershipStatus};

use crate::db::{
    CustomerRepository, LeadRepository, OrderRepository, RepositoryError, customers::CustomerUpsert,
};
use crate::printful::PrintfulClient;
use crate::stripe::{CheckoutSession, WebhookEvent};

/// Membership lifecycle orchestrator.
pub struct MembershipService<'a> {
    pool: &'a SqlitePool,
    printful: Option<&'a PrintfulClient>,
}

impl<'a> MembershipService<'a> {
    /// Create a new membership service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool, printful: Option<&'a PrintfulClient>) -> Self {
        Self { pool, printful }
    }

    /// Handle a verified Stripe webhook event.
    ///
    /// Unrecognized event types are logged and ignored. Malformed event
    /// objects are logged and ignored too: Stripe retries on non-2xx,
    /// and a payload we cannot parse today will not parse tomorrow.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if a database write fails.
    #[instrument(skip(self, event), fields(event_type = %event.event_type))]
    pub async fn handle_event(&self, event: &WebhookEvent) -> Result<(), RepositoryError> {
        match event.event_type.as_str() {
            "checkout.session.completed" => match event.checkout_session() {
                Ok(session) => self.handle_checkout_completed(&session).await,
                Err(e) => {
                    warn!(error = %e, "Malformed checkout session payload");
                    Ok(())
                }
            },
            "customer.subscription.updated" | "customer.subscription.deleted" => {
                match event.subscription() {
                    Ok(sub) => {
                        self.update_subscription_status(&sub.id, &sub.status).await
                    }
                    Err(e) => {
                        warn!(error = %e, "Malformed subscription payload");
                        Ok(())
                    }
                }
            }
            "invoice.payment_failed" => {
                // Invoices carry the subscription as a plain ID string
                let subscription_id = event
                    .data
                    .object
                    .get("subscription")
                    .and_then(|v| v.as_str());
                match subscription_id {
                    Some(id) => self.update_subscription_status(id, "past_due").await,
                    None => {
                        warn!("Payment-failed invoice without a subscription ID");
                        Ok(())
                    }
                }
            }
            other => {
                tracing::debug!(event_type = %other, "Ignoring unhandled event type");
                Ok(())
            }
        }
    }

    /// A checkout completed: activate membership and fulfill the t-shirt.
    async fn handle_checkout_completed(
        &self,
        session: &CheckoutSession,
    ) -> Result<(), RepositoryError> {
        let Some(raw_email) = session
            .customer_details
            .as_ref()
            .and_then(|d| d.email.as_deref())
        else {
            warn!("Checkout session without a buyer email");
            return Ok(());
        };
        let email = match Email::parse(raw_email) {
            Ok(email) => email,
            Err(e) => {
                warn!(error = %e, "Checkout session with unparseable buyer email");
                return Ok(());
            }
        };

        let customer = CustomerRepository::new(self.pool)
            .upsert(CustomerUpsert {
                email: &email,
                name: session
                    .customer_details
                    .as_ref()
                    .and_then(|d| d.name.as_deref()),
                stripe_subscription_id: session.subscription.as_deref(),
                status: MembershipStatus::Active,
                fitness_goals: session.fitness_goals(),
                experience_level: session.experience_level(),
            })
            .await?;
        info!(customer_id = %customer.id, "Membership activated");

        // If they came in through the lead form, close the loop
        if let Err(e) = LeadRepository::new(self.pool).mark_converted(&email).await {
            warn!(error = %e, "Failed to mark lead converted");
        }

        // The free shirt needs both a size and somewhere to send it
        let (Some(size), Some(address)) = (session.tshirt_size(), session.shipping_address())
        else {
            info!("Checkout without size/address, skipping t-shirt order");
            return Ok(());
        };

        let orders = OrderRepository::new(self.pool);
        let order = orders.create(&email, size, address).await?;

        let Some(printful) = self.printful else {
            info!(order_id = %order.id, "Printful not configured, order left pending");
            return Ok(());
        };

        let name = customer.name.as_deref().unwrap_or("Willpower Member");
        match printful
            .create_tshirt_order(name, email.as_str(), size, address)
            .await
        {
            Ok(printful_order_id) => {
                orders.mark_sent(order.id, &printful_order_id).await?;
                info!(order_id = %order.id, %printful_order_id, "T-shirt order sent");
            }
            Err(e) => {
                warn!(order_id = %order.id, error = %e, "Printful order failed, left pending");
            }
        }

        Ok(())
    }

    /// Re-derive membership status from a subscription status string.
    async fn update_subscription_status(
        &self,
        subscription_id: &str,
        status: &str,
    ) -> Result<(), RepositoryError> {
        let status = MembershipStatus::from_subscription_status(status);
        let updated = CustomerRepository::new(self.pool)
            .update_status_by_subscription(subscription_id, status)
            .await?;

        match updated {
            Some(customer) => {
                info!(customer_id = %customer.id, %status, "Membership status updated");
            }
            None => warn!(%subscription_id, "Subscription event for unknown customer"),
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::PrintfulConfig;
    use crate::db::test_support::test_pool;
    use crate::db::leads::LeadUpsert;
    use secrecy::SecretString;
    use serde_json::json;
    use willpower_core::OrderStatus;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn checkout_event(custom_fields: serde_json::Value) -> WebhookEvent {
        serde_json::from_value(json!({
            "id": "evt_1",
            "type": "checkout.session.completed",
            "data": {"object": {
                "customer_details": {"email": "bob@example.com", "name": "Bob"},
                "subscription": "sub_123",
                "custom_fields": custom_fields
            }}
        }))
        .unwrap()
    }

    fn subscription_event(event_type: &str, status: &str) -> WebhookEvent {
        serde_json::from_value(json!({
            "type": event_type,
            "data": {"object": {"id": "sub_123", "status": status}}
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_bob_checkout_then_trialing_is_member() {
        let pool = test_pool().await;
        let service = MembershipService::new(&pool, None);

        service
            .handle_event(&checkout_event(json!([])))
            .await
            .unwrap();
        service
            .handle_event(&subscription_event("customer.subscription.updated", "trialing"))
            .await
            .unwrap();

        let email = Email::parse("bob@example.com").unwrap();
        let customer = CustomerRepository::new(&pool)
            .get_by_email(&email)
            .await
            .unwrap()
            .expect("customer should exist");
        assert_eq!(customer.status, MembershipStatus::Trialing);
        assert!(customer.is_member());
    }

    #[tokio::test]
    async fn test_subscription_deleted_revokes_membership() {
        let pool = test_pool().await;
        let service = MembershipService::new(&pool, None);

        service
            .handle_event(&checkout_event(json!([])))
            .await
            .unwrap();
        service
            .handle_event(&subscription_event("customer.subscription.deleted", "canceled"))
            .await
            .unwrap();

        let email = Email::parse("bob@example.com").unwrap();
        let customer = CustomerRepository::new(&pool)
            .get_by_email(&email)
            .await
            .unwrap()
            .unwrap();
        assert!(!customer.is_member());
    }

    #[tokio::test]
    async fn test_payment_failed_marks_past_due() {
        let pool = test_pool().await;
        let service = MembershipService::new(&pool, None);

        service
            .handle_event(&checkout_event(json!([])))
            .await
            .unwrap();

        let event: WebhookEvent = serde_json::from_value(json!({
            "type": "invoice.payment_failed",
            "data": {"object": {"id": "in_1", "subscription": "sub_123"}}
        }))
        .unwrap();
        service.handle_event(&event).await.unwrap();

        let email = Email::parse("bob@example.com").unwrap();
        let customer = CustomerRepository::new(&pool)
            .get_by_email(&email)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(customer.status, MembershipStatus::PastDue);
    }

    #[tokio::test]
    async fn test_replayed_checkout_is_idempotent() {
        let pool = test_pool().await;
        let service = MembershipService::new(&pool, None);
        let event = checkout_event(json!([]));

        service.handle_event(&event).await.unwrap();
        service.handle_event(&event).await.unwrap();

        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM customers")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_no_order_without_both_size_and_address() {
        let pool = test_pool().await;
        let service = MembershipService::new(&pool, None);
        let email = Email::parse("bob@example.com").unwrap();

        // Size but no address
        service
            .handle_event(&checkout_event(json!([
                {"key": "tshirt_size", "dropdown": {"value": "L"}}
            ])))
            .await
            .unwrap();
        // Address but no size
        service
            .handle_event(&checkout_event(json!([
                {"key": "shipping_address", "text": {"value": "123 Main St, Austin TX 78701"}}
            ])))
            .await
            .unwrap();

        let orders = OrderRepository::new(&pool)
            .list_for_customer(&email)
            .await
            .unwrap();
        assert!(orders.is_empty());
    }

    #[tokio::test]
    async fn test_order_created_pending_without_printful() {
        let pool = test_pool().await;
        let service = MembershipService::new(&pool, None);
        let email = Email::parse("bob@example.com").unwrap();

        service
            .handle_event(&checkout_event(json!([
                {"key": "tshirt_size", "dropdown": {"value": "L"}},
                {"key": "shipping_address", "text": {"value": "123 Main St, Austin TX 78701"}}
            ])))
            .await
            .unwrap();

        let orders = OrderRepository::new(&pool)
            .list_for_customer(&email)
            .await
            .unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_order_marked_sent_when_printful_accepts() {
        let pool = test_pool().await;
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/orders"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 200,
                "result": {"id": 555}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let printful = PrintfulClient::new(&PrintfulConfig {
            api_key: SecretString::from("pf_test"),
            api_url: server.uri(),
        })
        .unwrap();
        let service = MembershipService::new(&pool, Some(&printful));

        service
            .handle_event(&checkout_event(json!([
                {"key": "tshirt_size", "dropdown": {"value": "L"}},
                {"key": "shipping_address", "text": {"value": "123 Main St, Austin TX 78701"}}
            ])))
            .await
            .unwrap();

        let email = Email::parse("bob@example.com").unwrap();
        let orders = OrderRepository::new(&pool)
            .list_for_customer(&email)
            .await
            .unwrap();
        assert_eq!(orders[0].status, OrderStatus::Sent);
        assert_eq!(orders[0].printful_order_id.as_deref(), Some("555"));
    }

    #[tokio::test]
    async fn test_order_stays_pending_when_printful_fails() {
        let pool = test_pool().await;
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("down"))
            .mount(&server)
            .await;

        let printful = PrintfulClient::new(&PrintfulConfig {
            api_key: SecretString::from("pf_test"),
            api_url: server.uri(),
        })
        .unwrap();
        let service = MembershipService::new(&pool, Some(&printful));

        service
            .handle_event(&checkout_event(json!([
                {"key": "tshirt_size", "dropdown": {"value": "M"}},
                {"key": "shipping_address", "text": {"value": "123 Main St, Austin TX 78701"}}
            ])))
            .await
            .unwrap();

        let email = Email::parse("bob@example.com").unwrap();
        let orders = OrderRepository::new(&pool)
            .list_for_customer(&email)
            .await
            .unwrap();
        assert_eq!(orders[0].status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_checkout_converts_existing_lead() {
        let pool = test_pool().await;
        let email = Email::parse("bob@example.com").unwrap();
        LeadRepository::new(&pool)
            .upsert(LeadUpsert {
                email: &email,
                name: "Bob",
                phone: None,
                goals: None,
                experience: None,
                initial_message: None,
                ai_response: None,
                source: "website",
            })
            .await
            .unwrap();

        let service = MembershipService::new(&pool, None);
        service
            .handle_event(&checkout_event(json!([])))
            .await
            .unwrap();

        let lead = LeadRepository::new(&pool)
            .get_by_email(&email)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(lead.status, willpower_core::LeadStatus::Converted);
    }

    #[tokio::test]
    async fn test_unknown_event_type_ignored() {
        let pool = test_pool().await;
        let service = MembershipService::new(&pool, None);

        let event: WebhookEvent = serde_json::from_value(json!({
            "type": "charge.refunded",
            "data": {"object": {}}
        }))
        .unwrap();
        assert!(service.handle_event(&event).await.is_ok());
    }
}
