//! Query construction.
//!
//! - [`FieldRegistry`] - Per-resource table of searchable fields
//! - [`QueryBuilder`], [`FieldHandle`] - Fluent, validated predicate building
//! - Catalog constants for the closed value sets of built-in fields

mod builder;
mod catalog;
mod registry;

pub use builder::{FieldHandle, QueryBuilder};
pub use catalog::{
    CARD_TYPES, DISPUTE_STATUSES, SUBSCRIPTION_STATUSES, TRANSACTION_STATUSES,
    VERIFICATION_STATUSES,
};
pub use registry::{FieldDescriptor, FieldKind, FieldRegistry, Operator};
