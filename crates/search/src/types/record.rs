//! Hydrated gateway records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ResourceId, ResourceKind};

/// A fully-hydrated resource returned by a bulk fetch.
///
/// The content is kept as the gateway's JSON document; mapping it onto
/// per-resource structs is left to the caller.
///
/// # Examples
///
/// ```
/// use gateway_search::types::{GatewayRecord, ResourceKind};
/// use serde_json::json;
///
/// let record = GatewayRecord::new(
///     ResourceKind::Subscription,
///     "sub_1",
///     json!({"id": "sub_1", "status": "Active", "price": "13.00"}),
/// );
///
/// assert_eq!(record.id(), "sub_1");
/// assert_eq!(record.field_str("status"), Some("Active"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayRecord {
    /// The resource type this record belongs to.
    resource: ResourceKind,

    /// The record's id.
    id: ResourceId,

    /// The record content as JSON.
    content: Value,
}

impl GatewayRecord {
    /// Creates a new record.
    pub fn new(resource: ResourceKind, id: impl Into<ResourceId>, content: Value) -> Self {
        Self {
            resource,
            id: id.into(),
            content,
        }
    }

    /// Returns the resource type.
    pub fn resource(&self) -> &ResourceKind {
        &self.resource
    }

    /// Returns the id.
    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    /// Returns the JSON content.
    pub fn content(&self) -> &Value {
        &self.content
    }

    /// Consumes the record and returns its JSON content.
    pub fn into_content(self) -> Value {
        self.content
    }

    /// Returns a top-level field of the content.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.content.get(name)
    }

    /// Returns a top-level string field of the content.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }
}
