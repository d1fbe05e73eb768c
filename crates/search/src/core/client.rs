//! Entry point for running searches.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::SearchConfig;
use crate::error::{ConfigError, QueryResult, SearchResult};
use crate::search::{FieldRegistry, QueryBuilder};
use crate::types::{Query, ResourceKind};

use super::collection::SearchResultCollection;
use super::transport::{GatewayTransport, SearchRequest};

/// Executes queries against a gateway.
///
/// The client caches one [`FieldRegistry`] per resource kind so every builder
/// it hands out shares the same dispatch table.
#[derive(Clone)]
pub struct SearchClient {
    transport: Arc<dyn GatewayTransport>,
    config: SearchConfig,
    registries: Arc<RwLock<HashMap<ResourceKind, Arc<FieldRegistry>>>>,
}

impl fmt::Debug for SearchClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchClient")
            .field("backend", &self.transport.backend_name())
            .field("config", &self.config)
            .finish()
    }
}

impl SearchClient {
    /// Creates a client, validating the configuration.
    pub fn new(
        transport: Arc<dyn GatewayTransport>,
        config: SearchConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            transport,
            config,
            registries: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    /// Creates a client with the default configuration.
    pub fn with_defaults(transport: Arc<dyn GatewayTransport>) -> Self {
        Self {
            transport,
            config: SearchConfig::default(),
            registries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Returns the transport's backend name.
    pub fn backend_name(&self) -> &'static str {
        self.transport.backend_name()
    }

    /// Replaces the field registry used for a resource kind.
    ///
    /// This is how custom resource kinds, or extra fields on built-in
    /// kinds, become searchable.
    pub fn register(&self, registry: FieldRegistry) {
        let resource = registry.resource().clone();
        self.registries.write().insert(resource, Arc::new(registry));
    }

    /// Returns the shared registry for a resource kind.
    pub fn registry(&self, resource: &ResourceKind) -> Arc<FieldRegistry> {
        if let Some(registry) = self.registries.read().get(resource) {
            return Arc::clone(registry);
        }

        let mut registries = self.registries.write();
        Arc::clone(
            registries
                .entry(resource.clone())
                .or_insert_with(|| Arc::new(resource.registry())),
        )
    }

    /// Returns an empty builder for a resource kind.
    pub fn query(&self, resource: ResourceKind) -> QueryBuilder {
        QueryBuilder::new(self.registry(&resource))
    }

    /// Builds a query with a configuration closure and executes it.
    ///
    /// Builder errors are returned before any network call is made.
    pub async fn search<F>(
        &self,
        resource: ResourceKind,
        configure: F,
    ) -> SearchResult<SearchResultCollection>
    where
        F: FnOnce(&mut QueryBuilder) -> QueryResult<()>,
    {
        let query = self.query(resource).configure(configure)?.build();
        self.execute(&query).await
    }

    /// Executes a query and captures its id list.
    ///
    /// This is a single round trip; records are fetched later, page by page,
    /// as the collection is iterated.
    pub async fn execute(&self, query: &Query) -> SearchResult<SearchResultCollection> {
        let request = SearchRequest::from_query(query);

        tracing::debug!(
            resource = %request.resource,
            backend = self.transport.backend_name(),
            criteria = %request.criteria,
            "Executing search"
        );

        let response = self.transport.search(&request).await?;

        tracing::debug!(
            resource = %request.resource,
            matched = response.ids.len(),
            "Search returned id list"
        );

        Ok(SearchResultCollection::new(
            request.resource,
            response,
            Arc::clone(&self.transport),
            self.config.clone(),
        ))
    }
}
