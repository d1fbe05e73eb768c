//! The gateway transport seam.
//!
//! A search is two kinds of round trip: one advanced-search call that
//! returns the ordered list of matching ids, and any number of bulk fetches
//! that hydrate a slice of those ids. [`GatewayTransport`] abstracts both so
//! collections can be driven by an HTTP client, a recorded fixture, or the
//! [`InMemoryGateway`](crate::backends::InMemoryGateway).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TransportResult;
use crate::types::{GatewayRecord, Query, ResourceId, ResourceKind};

/// An advanced-search request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Resource type being searched.
    pub resource: ResourceKind,

    /// Criteria in wire form, as produced by [`Query::to_wire`].
    pub criteria: Value,
}

impl SearchRequest {
    /// Creates a request from a built query.
    pub fn from_query(query: &Query) -> Self {
        Self {
            resource: query.resource().clone(),
            criteria: query.to_wire(),
        }
    }
}

/// The id list returned by an advanced search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdListResponse {
    /// Matching ids in gateway order.
    pub ids: Vec<ResourceId>,

    /// Match count as reported by the gateway, if it sent one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

impl IdListResponse {
    /// Creates a response without a reported count.
    pub fn new(ids: Vec<ResourceId>) -> Self {
        Self { ids, count: None }
    }

    /// Sets the reported count.
    pub fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }
}

/// Network boundary to the payment gateway.
///
/// Implementations must be safe to share between tasks; a collection holds
/// its transport behind an `Arc` for as long as it is iterated.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use gateway_search::core::{GatewayTransport, IdListResponse, SearchRequest};
///
/// struct HttpGateway { /* client, credentials */ }
///
/// #[async_trait]
/// impl GatewayTransport for HttpGateway {
///     fn backend_name(&self) -> &'static str {
///         "http"
///     }
///
///     async fn search(&self, request: &SearchRequest) -> TransportResult<IdListResponse> {
///         // POST /{resource}s/advanced_search_ids
///     }
///
///     async fn fetch(
///         &self,
///         resource: &ResourceKind,
///         ids: &[ResourceId],
///     ) -> TransportResult<Vec<GatewayRecord>> {
///         // POST /{resource}s/advanced_search with {"ids": [...]}
///     }
/// }
/// ```
#[async_trait]
pub trait GatewayTransport: Send + Sync {
    /// Returns a short name for logging and error messages.
    fn backend_name(&self) -> &'static str;

    /// Runs an advanced search and returns every matching id.
    ///
    /// # Errors
    ///
    /// Any [`TransportError`](crate::error::TransportError); the collection
    /// is never created if this fails.
    async fn search(&self, request: &SearchRequest) -> TransportResult<IdListResponse>;

    /// Fetches the records for a batch of ids.
    ///
    /// Records may come back in any order and ids with no current record
    /// may be absent. Returning a record whose id was not requested is a
    /// contract violation.
    async fn fetch(
        &self,
        resource: &ResourceKind,
        ids: &[ResourceId],
    ) -> TransportResult<Vec<GatewayRecord>>;
}
