//! Test infrastructure for gateway search.
//!
//! Shared fixtures and assertions for driving search collections against
//! the in-memory gateway.

#![allow(dead_code)]

pub mod assertions;
pub mod fixtures;

pub use assertions::*;
pub use fixtures::*;
