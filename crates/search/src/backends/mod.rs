//! Gateway transport implementations.
//!
//! | Backend | Description |
//! |---------|-------------|
//! | [`InMemoryGateway`] | In-process records with wire-level query evaluation and fault injection |
//!
//! An HTTP client for a live gateway implements
//! [`GatewayTransport`](crate::core::GatewayTransport) in the host
//! application.

mod memory;

pub use memory::InMemoryGateway;
