//! Test fixtures for gateway search.

use std::sync::Arc;

use serde_json::{json, Value};

use gateway_search::backends::InMemoryGateway;
use gateway_search::config::SearchConfig;
use gateway_search::core::SearchClient;
use gateway_search::types::ResourceKind;

/// A subscription fixture.
#[derive(Debug, Clone)]
pub struct SubscriptionFixture {
    /// Subscription ID.
    pub id: String,
    /// Plan the subscription is on.
    pub plan_id: String,
    /// Status (Active, Canceled, ...).
    pub status: String,
    /// Price as a decimal string.
    pub price: String,
    /// Creation time, RFC 3339.
    pub created_at: String,
}

impl SubscriptionFixture {
    /// Creates an active subscription on the `gold` plan.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            plan_id: "gold".to_string(),
            status: "Active".to_string(),
            price: "10.00".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    /// Sets the plan.
    pub fn with_plan(mut self, plan_id: impl Into<String>) -> Self {
        self.plan_id = plan_id.into();
        self
    }

    /// Sets the status.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Sets the price.
    pub fn with_price(mut self, price: impl Into<String>) -> Self {
        self.price = price.into();
        self
    }

    /// Sets the creation time.
    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = created_at.into();
        self
    }

    /// Renders the gateway's JSON for this subscription.
    pub fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "plan_id": self.plan_id,
            "status": self.status,
            "price": self.price,
            "created_at": self.created_at,
        })
    }

    /// Stores the subscription in the gateway.
    pub fn insert_into(&self, gateway: &InMemoryGateway) {
        gateway.insert(ResourceKind::Subscription, self.id.as_str(), self.to_json());
    }
}

/// Creates a customer document.
pub fn customer(id: &str, first_name: &str, last_name: &str) -> Value {
    json!({
        "id": id,
        "first_name": first_name,
        "last_name": last_name,
        "email": format!("{}@example.com", first_name.to_lowercase()),
    })
}

/// Inserts `n` customers with ids `cust-000`, `cust-001`, ...
pub fn seed_customers(gateway: &InMemoryGateway, n: usize) {
    for i in 0..n {
        let id = format!("cust-{:03}", i);
        gateway.insert(
            ResourceKind::Customer,
            id.as_str(),
            customer(&id, &format!("First{}", i), "Doe"),
        );
    }
}

/// Creates a gateway and a client over it with the given configuration.
pub fn create_client(config: SearchConfig) -> (Arc<InMemoryGateway>, SearchClient) {
    let gateway = Arc::new(InMemoryGateway::new());
    let client = SearchClient::new(gateway.clone(), config).expect("valid test config");
    (gateway, client)
}

/// Creates a gateway and a client with small batches.
pub fn create_test_client() -> (Arc<InMemoryGateway>, SearchClient) {
    create_client(SearchConfig::for_testing())
}
