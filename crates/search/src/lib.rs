//! Gateway Search
//!
//! Advanced search for payment-gateway resources: a validated query builder
//! and a lazily paginated result collection that stays stable while the
//! gateway's data changes underneath it.
//!
//! # Features
//!
//! - **Typed fields**: Text, multi-value, range and mixed fields, each with a
//!   fixed operator set checked at the call site
//! - **Exact operands**: Decimal amounts and UTC-normalized timestamps
//! - **One round trip per search**: The gateway returns ids only; records are
//!   fetched in batches as the caller iterates
//! - **Stable results**: Size and membership are fixed when the search runs
//! - **Explicit deletions**: Ids whose records vanished before their page was
//!   fetched are reported or skipped, never papered over
//!
//! # Architecture
//!
//! - [`types`] - Ids, records, operands, queries and pages
//! - [`search`] - Field registry, resource catalogs and the query builder
//! - [`core`] - Transport seam, client and result collection
//! - [`backends`] - In-memory gateway
//! - [`config`] - Batch size and missing-record policy
//! - [`error`] - Error types for all operations
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//!
//! use gateway_search::backends::InMemoryGateway;
//! use gateway_search::core::SearchClient;
//! use gateway_search::types::ResourceKind;
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = Arc::new(InMemoryGateway::new());
//! gateway.insert(ResourceKind::Subscription, "s1", json!({"status": "Active", "price": "13.00"}));
//! gateway.insert(ResourceKind::Subscription, "s2", json!({"status": "Canceled", "price": "13"}));
//! gateway.insert(ResourceKind::Subscription, "s3", json!({"status": "Active", "price": "14"}));
//!
//! let client = SearchClient::with_defaults(gateway);
//! let results = client
//!     .search(ResourceKind::Subscription, |search| {
//!         search.field("status")?.is_in(["Active", "Canceled"])?;
//!         search.field("price")?.is("13")?;
//!         Ok(())
//!     })
//!     .await?;
//!
//! assert_eq!(results.size(), 2);
//! let records = results.collect_records().await?;
//! assert!(records.iter().all(|r| r.id() != "s3"));
//! # Ok(())
//! # }
//! ```
//!
//! # Usage Errors
//!
//! Builder misuse fails immediately, before anything is sent:
//!
//! ```
//! use gateway_search::error::QueryError;
//! use gateway_search::search::QueryBuilder;
//! use gateway_search::types::ResourceKind;
//!
//! let mut search = QueryBuilder::for_resource(ResourceKind::Subscription);
//! assert!(matches!(
//!     search.field("nonexistent_field"),
//!     Err(QueryError::UnknownField { .. })
//! ));
//! assert!(matches!(
//!     search.field("price").unwrap().between("20", "10"),
//!     Err(QueryError::InvalidRange { .. })
//! ));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod config;
pub mod core;
pub mod error;
pub mod search;
pub mod types;

// Re-export commonly used types at crate root
pub use config::{MissingRecordPolicy, SearchConfig};
pub use error::{QueryError, SearchError, SearchResult, TransportError};
pub use search::{FieldKind, QueryBuilder};
pub use types::{GatewayRecord, Query, ResourceId, ResourceKind};

// Re-export core traits
pub use crate::core::{GatewayTransport, SearchClient, SearchHit, SearchResultCollection};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
