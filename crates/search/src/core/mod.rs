//! Search execution.
//!
//! - [`GatewayTransport`] - The network seam: id-list search and bulk fetch
//! - [`SearchClient`] - Builds and executes queries in one round trip
//! - [`SearchResultCollection`] - The captured id list with lazy pagination
//! - [`ResultCursor`], [`PageCursor`] - Fresh passes over a collection
//!
//! # Flow
//!
//! ```text
//! QueryBuilder ──build──▶ Query ──execute──▶ GatewayTransport::search
//!                                                   │ ids
//!                                                   ▼
//!                                       SearchResultCollection
//!                                                   │ batch of ids
//!                                                   ▼
//!                                       GatewayTransport::fetch ──▶ Page<SearchHit>
//! ```

mod client;
mod collection;
mod transport;

pub use client::SearchClient;
pub use collection::{PageCursor, ResultCursor, SearchHit, SearchResultCollection};
pub use transport::{GatewayTransport, IdListResponse, SearchRequest};
