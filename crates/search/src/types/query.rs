//! Search criteria and queries.
//!
//! A [`Query`] is the immutable result of
//! [`QueryBuilder::build`](crate::search::QueryBuilder::build): an
//! insertion-ordered map from field name to one [`Criterion`].

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{RangeValue, ResourceKind};

/// Text comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextOperator {
    /// Exact match.
    Is,
    /// Anything but an exact match.
    IsNot,
    /// Prefix match.
    StartsWith,
    /// Suffix match.
    EndsWith,
    /// Substring match.
    Contains,
}

impl TextOperator {
    /// Returns the wire key for this operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            TextOperator::Is => "is",
            TextOperator::IsNot => "is_not",
            TextOperator::StartsWith => "starts_with",
            TextOperator::EndsWith => "ends_with",
            TextOperator::Contains => "contains",
        }
    }

    /// Parses a wire key.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "is" => Some(TextOperator::Is),
            "is_not" => Some(TextOperator::IsNot),
            "starts_with" => Some(TextOperator::StartsWith),
            "ends_with" => Some(TextOperator::EndsWith),
            "contains" => Some(TextOperator::Contains),
            _ => None,
        }
    }

    /// Applies the operator to a candidate value.
    pub fn matches(&self, candidate: &str, operand: &str) -> bool {
        match self {
            TextOperator::Is => candidate == operand,
            TextOperator::IsNot => candidate != operand,
            TextOperator::StartsWith => candidate.starts_with(operand),
            TextOperator::EndsWith => candidate.ends_with(operand),
            TextOperator::Contains => candidate.contains(operand),
        }
    }
}

impl fmt::Display for TextOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bounds of a range criterion.
///
/// Either `is` is set alone, or any combination of `min` and `max`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeBounds {
    /// Exact value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is: Option<RangeValue>,
    /// Inclusive lower bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<RangeValue>,
    /// Inclusive upper bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<RangeValue>,
}

impl RangeBounds {
    /// An exact-value range.
    pub fn exactly(value: RangeValue) -> Self {
        Self {
            is: Some(value),
            ..Default::default()
        }
    }

    /// An inclusive range with both bounds.
    pub fn between(min: RangeValue, max: RangeValue) -> Self {
        Self {
            is: None,
            min: Some(min),
            max: Some(max),
        }
    }
}

/// The accumulated constraint on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "criterion", rename_all = "snake_case")]
pub enum Criterion {
    /// A text comparison.
    Text {
        /// The operator.
        op: TextOperator,
        /// The operand.
        value: String,
    },
    /// Set membership; values are unique and in first-seen order.
    Members {
        /// The accepted values.
        values: Vec<String>,
    },
    /// Exclusion of one value.
    NotMember {
        /// The excluded value.
        value: String,
    },
    /// A range constraint.
    Range(RangeBounds),
}

impl Criterion {
    /// Returns the wire encoding of this criterion.
    pub fn to_wire(&self) -> Value {
        match self {
            Criterion::Text { op, value } => {
                let mut node = Map::new();
                node.insert(op.as_str().to_string(), Value::String(value.clone()));
                Value::Object(node)
            }
            Criterion::Members { values } => {
                Value::Array(values.iter().cloned().map(Value::String).collect())
            }
            Criterion::NotMember { value } => {
                let mut node = Map::new();
                node.insert("is_not".to_string(), Value::String(value.clone()));
                Value::Object(node)
            }
            Criterion::Range(bounds) => {
                let mut node = Map::new();
                if let Some(is) = &bounds.is {
                    node.insert("is".to_string(), Value::String(is.to_wire()));
                }
                if let Some(min) = &bounds.min {
                    node.insert("min".to_string(), Value::String(min.to_wire()));
                }
                if let Some(max) = &bounds.max {
                    node.insert("max".to_string(), Value::String(max.to_wire()));
                }
                Value::Object(node)
            }
        }
    }
}

/// An immutable search query for one resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// The resource type being searched.
    resource: ResourceKind,

    /// Criteria keyed by field name, in the order fields were first set.
    criteria: IndexMap<String, Criterion>,
}

impl Query {
    pub(crate) fn new(resource: ResourceKind, criteria: IndexMap<String, Criterion>) -> Self {
        Self { resource, criteria }
    }

    /// Returns the resource type.
    pub fn resource(&self) -> &ResourceKind {
        &self.resource
    }

    /// Returns the criterion for a field.
    pub fn get(&self, field: &str) -> Option<&Criterion> {
        self.criteria.get(field)
    }

    /// Iterates over `(field, criterion)` pairs in insertion order.
    pub fn criteria(&self) -> impl Iterator<Item = (&str, &Criterion)> {
        self.criteria.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of constrained fields.
    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    /// Returns true if the query matches every resource.
    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Serializes the criteria into the gateway's search payload shape.
    ///
    /// ```
    /// use gateway_search::search::QueryBuilder;
    /// use gateway_search::types::ResourceKind;
    /// use serde_json::json;
    ///
    /// let mut search = QueryBuilder::for_resource(ResourceKind::Subscription);
    /// search.field("status").unwrap().is_in(["Active", "Canceled"]).unwrap();
    /// search.field("price").unwrap().is("13").unwrap();
    ///
    /// assert_eq!(
    ///     search.build().to_wire(),
    ///     json!({"status": ["Active", "Canceled"], "price": {"is": "13"}})
    /// );
    /// ```
    pub fn to_wire(&self) -> Value {
        let mut payload = Map::new();
        for (field, criterion) in &self.criteria {
            payload.insert(field.clone(), criterion.to_wire());
        }
        Value::Object(payload)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_text_operator_matches() {
        assert!(TextOperator::StartsWith.matches("Jonathan", "Jon"));
        assert!(!TextOperator::EndsWith.matches("Jonathan", "Jon"));
        assert!(TextOperator::Contains.matches("Jonathan", "nat"));
        assert!(TextOperator::IsNot.matches("a", "b"));
        assert_eq!(TextOperator::parse("ends_with"), Some(TextOperator::EndsWith));
        assert_eq!(TextOperator::parse("like"), None);
    }

    #[test]
    fn test_wire_shapes() {
        let mut criteria = IndexMap::new();
        criteria.insert(
            "first_name".to_string(),
            Criterion::Text {
                op: TextOperator::StartsWith,
                value: "Jo".to_string(),
            },
        );
        criteria.insert(
            "merchant_account_id".to_string(),
            Criterion::NotMember {
                value: "eu".to_string(),
            },
        );
        criteria.insert(
            "created_at".to_string(),
            Criterion::Range(RangeBounds {
                is: None,
                min: Some(RangeValue::Timestamp(
                    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                )),
                max: None,
            }),
        );
        criteria.insert(
            "price".to_string(),
            Criterion::Range(RangeBounds::between(
                RangeValue::Amount(Decimal::new(1000, 2)),
                RangeValue::Amount(Decimal::new(2050, 2)),
            )),
        );
        let query = Query::new(ResourceKind::Customer, criteria);

        assert_eq!(
            query.to_wire(),
            json!({
                "first_name": {"starts_with": "Jo"},
                "merchant_account_id": {"is_not": "eu"},
                "created_at": {"min": "2024-01-01T00:00:00Z"},
                "price": {"min": "10", "max": "20.5"}
            })
        );
    }

    #[test]
    fn test_wire_preserves_insertion_order() {
        let mut criteria = IndexMap::new();
        for field in ["zeta", "alpha", "mid"] {
            criteria.insert(
                field.to_string(),
                Criterion::Members {
                    values: vec!["x".to_string()],
                },
            );
        }
        let query = Query::new(ResourceKind::Dispute, criteria);
        let wire = query.to_wire();
        let keys: Vec<&String> = wire.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_empty_query() {
        let query = Query::new(ResourceKind::Subscription, IndexMap::new());
        assert!(query.is_empty());
        assert_eq!(query.to_wire(), json!({}));
    }
}
