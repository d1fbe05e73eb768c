//! Core types for gateway search.
//!
//! - [`ResourceId`], [`ResourceKind`] - Identity of gateway resources
//! - [`GatewayRecord`] - A hydrated resource returned by a bulk fetch
//! - [`Operand`], [`RangeValue`] - Predicate operands
//! - [`Criterion`], [`Query`] - Accumulated search criteria
//! - [`Page`], [`PageInfo`] - Batches of fetched results
//!
//! # Examples
//!
//! ```
//! use gateway_search::types::{Operand, RangeValue, RangeValueKind};
//! use chrono::{FixedOffset, TimeZone};
//!
//! // Zoned timestamps are normalized to UTC before serialization
//! let pacific = FixedOffset::west_opt(8 * 3600).unwrap();
//! let operand = Operand::from(pacific.with_ymd_and_hms(2024, 1, 1, 16, 0, 0).unwrap());
//! let bound = RangeValue::coerce("created_at", operand, Some(RangeValueKind::Timestamp)).unwrap();
//! assert_eq!(bound.to_wire(), "2024-01-02T00:00:00Z");
//! ```

mod operand;
mod page;
mod query;
mod record;
mod resource;
mod resource_id;

pub use operand::{parse_amount, parse_timestamp, Operand, RangeValue, RangeValueKind};
pub use page::{page_count, Page, PageInfo};
pub use query::{Criterion, Query, RangeBounds, TextOperator};
pub use record::GatewayRecord;
pub use resource::ResourceKind;
pub use resource_id::ResourceId;
