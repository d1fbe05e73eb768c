//! Search field registry.
//!
//! The registry maps field names to [`FieldDescriptor`]s for one resource
//! type. It is built once and shared through `Arc` by every
//! [`QueryBuilder`](super::QueryBuilder) for that type, so dispatching a
//! field name to its operators is a table lookup.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, QueryError};
use crate::types::{RangeValueKind, ResourceKind};

/// The kind of a search field, which fixes its legal operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// is, is_not, starts_with, ends_with, contains.
    Text,
    /// is, is_not, in.
    MultiValue,
    /// is, `<=`, `>=`, between.
    Range,
    /// Union of MultiValue and Text.
    MultiValueOrText,
    /// is, is_not.
    Equality,
    /// starts_with, ends_with.
    PartialMatch,
}

impl FieldKind {
    /// Returns true if the operator is legal for this kind.
    pub fn allows(&self, operator: Operator) -> bool {
        use Operator::*;

        match self {
            FieldKind::Text => matches!(operator, Is | IsNot | StartsWith | EndsWith | Contains),
            FieldKind::MultiValue => matches!(operator, Is | IsNot | In),
            FieldKind::Range => matches!(
                operator,
                Is | LessThanOrEqualTo | GreaterThanOrEqualTo | Between
            ),
            FieldKind::MultiValueOrText => {
                matches!(operator, Is | IsNot | In | StartsWith | EndsWith | Contains)
            }
            FieldKind::Equality => matches!(operator, Is | IsNot),
            FieldKind::PartialMatch => matches!(operator, StartsWith | EndsWith),
        }
    }

    /// Returns true if values of this kind can be restricted to a closed set.
    pub fn is_multi_value(&self) -> bool {
        matches!(self, FieldKind::MultiValue | FieldKind::MultiValueOrText)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Text => write!(f, "text"),
            FieldKind::MultiValue => write!(f, "multi-value"),
            FieldKind::Range => write!(f, "range"),
            FieldKind::MultiValueOrText => write!(f, "multi-value-or-text"),
            FieldKind::Equality => write!(f, "equality"),
            FieldKind::PartialMatch => write!(f, "partial-match"),
        }
    }
}

/// Operators a caller can apply through a field handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Exact match.
    Is,
    /// Exclusion.
    IsNot,
    /// Prefix.
    StartsWith,
    /// Suffix.
    EndsWith,
    /// Substring.
    Contains,
    /// Set membership.
    In,
    /// Upper bound.
    LessThanOrEqualTo,
    /// Lower bound.
    GreaterThanOrEqualTo,
    /// Both bounds.
    Between,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operator::Is => "is",
            Operator::IsNot => "is_not",
            Operator::StartsWith => "starts_with",
            Operator::EndsWith => "ends_with",
            Operator::Contains => "contains",
            Operator::In => "in",
            Operator::LessThanOrEqualTo => "<=",
            Operator::GreaterThanOrEqualTo => ">=",
            Operator::Between => "between",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Operator {
    type Err = QueryError;

    /// Accepts the display names plus the long and wire spellings of the
    /// bound operators.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "is" => Ok(Operator::Is),
            "is_not" => Ok(Operator::IsNot),
            "starts_with" => Ok(Operator::StartsWith),
            "ends_with" => Ok(Operator::EndsWith),
            "contains" => Ok(Operator::Contains),
            "in" => Ok(Operator::In),
            "<=" | "less_than_or_equal_to" | "max" => Ok(Operator::LessThanOrEqualTo),
            ">=" | "greater_than_or_equal_to" | "min" => Ok(Operator::GreaterThanOrEqualTo),
            "between" => Ok(Operator::Between),
            other => Err(QueryError::UnknownOperator {
                operator: other.to_string(),
            }),
        }
    }
}

/// Definition of one searchable field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name as sent on the wire.
    pub name: String,

    /// Field kind.
    pub kind: FieldKind,

    /// Closed value set for multi-value fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<String>>,

    /// Value type for range fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_value: Option<RangeValueKind>,
}

impl FieldDescriptor {
    /// Creates a descriptor of the given kind.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            allowed_values: None,
            range_value: None,
        }
    }

    /// A text field.
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    /// A multi-value field accepting any value.
    pub fn multi_value(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::MultiValue)
    }

    /// A field accepting both multi-value and text operators.
    pub fn multi_value_or_text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::MultiValueOrText)
    }

    /// A range field over decimal amounts.
    pub fn amount_range(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Range).with_range_value(RangeValueKind::Amount)
    }

    /// A range field over timestamps.
    pub fn timestamp_range(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Range).with_range_value(RangeValueKind::Timestamp)
    }

    /// An equality-only field.
    pub fn equality(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Equality)
    }

    /// A prefix/suffix-only field.
    pub fn partial_match(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::PartialMatch)
    }

    /// Restricts the accepted values.
    pub fn with_allowed_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the range value type.
    pub fn with_range_value(mut self, kind: RangeValueKind) -> Self {
        self.range_value = Some(kind);
        self
    }

    /// Returns true if `value` is accepted by the allowed value set.
    pub fn accepts(&self, value: &str) -> bool {
        self.allowed_values
            .as_ref()
            .map(|allowed| allowed.iter().any(|a| a == value))
            .unwrap_or(true)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.allowed_values.is_some() && !self.kind.is_multi_value() {
            return Err(ConfigError::InvalidField {
                field: self.name.clone(),
                message: format!("allowed values are not supported on {} fields", self.kind),
            });
        }
        if self.range_value.is_some() && self.kind != FieldKind::Range {
            return Err(ConfigError::InvalidField {
                field: self.name.clone(),
                message: format!("a range value type is not supported on {} fields", self.kind),
            });
        }
        Ok(())
    }
}

/// Registry of searchable fields for one resource type.
#[derive(Debug, Clone)]
pub struct FieldRegistry {
    resource: ResourceKind,
    fields: IndexMap<String, FieldDescriptor>,
}

impl FieldRegistry {
    /// Creates an empty registry.
    pub fn new(resource: ResourceKind) -> Self {
        Self {
            resource,
            fields: IndexMap::new(),
        }
    }

    /// Creates a registry from a list of descriptors.
    pub fn from_fields<I>(resource: ResourceKind, fields: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = FieldDescriptor>,
    {
        let mut registry = Self::new(resource);
        for field in fields {
            registry.register(field)?;
        }
        Ok(registry)
    }

    pub(crate) fn from_catalog<I>(resource: ResourceKind, fields: I) -> Self
    where
        I: IntoIterator<Item = FieldDescriptor>,
    {
        let fields = fields
            .into_iter()
            .map(|field| (field.name.clone(), field))
            .collect();
        Self { resource, fields }
    }

    /// Registers a field, rejecting duplicates and inconsistent declarations.
    pub fn register(&mut self, field: FieldDescriptor) -> Result<(), ConfigError> {
        field.validate()?;
        if self.fields.contains_key(&field.name) {
            return Err(ConfigError::DuplicateField { field: field.name });
        }
        self.fields.insert(field.name.clone(), field);
        Ok(())
    }

    /// Returns the resource type.
    pub fn resource(&self) -> &ResourceKind {
        &self.resource
    }

    /// Looks up a field by name.
    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    /// Returns true if the field is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Iterates over fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    /// Returns the number of registered fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no fields are registered.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
