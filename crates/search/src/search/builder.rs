//! Fluent query builder.
//!
//! [`QueryBuilder::field`] looks a name up in the builder's
//! [`FieldRegistry`] and returns a [`FieldHandle`] bound to that field's
//! descriptor. Every operator call is checked against the field kind and
//! operand rules immediately, so misuse fails at the offending call rather
//! than when the query is executed.
//!
//! Accumulation is keyed by field: text and membership operators replace the
//! field's criterion, `in` with no values removes it, and the `<=` / `>=`
//! range operators merge into existing bounds.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{QueryError, QueryResult};
use crate::types::{
    Criterion, Operand, Query, RangeBounds, RangeValue, ResourceKind, TextOperator,
};

use super::registry::{FieldDescriptor, FieldKind, FieldRegistry, Operator};

/// Accumulates field predicates into a [`Query`].
///
/// # Example
///
/// ```
/// use gateway_search::search::QueryBuilder;
/// use gateway_search::types::ResourceKind;
///
/// let query = QueryBuilder::for_resource(ResourceKind::Subscription)
///     .configure(|search| {
///         search.field("plan_id")?.starts_with("gold")?;
///         search.field("price")?.greater_than_or_equal_to("10")?;
///         search.field("price")?.less_than_or_equal_to("20")?;
///         Ok(())
///     })
///     .unwrap()
///     .build();
///
/// assert_eq!(query.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    registry: Arc<FieldRegistry>,
    criteria: IndexMap<String, Criterion>,
}

impl QueryBuilder {
    /// Creates a builder over a shared registry.
    pub fn new(registry: Arc<FieldRegistry>) -> Self {
        Self {
            registry,
            criteria: IndexMap::new(),
        }
    }

    /// Creates a builder over the standard catalog of a resource kind.
    pub fn for_resource(resource: ResourceKind) -> Self {
        Self::new(Arc::new(resource.registry()))
    }

    /// Passes the builder to a configuration function and returns it.
    pub fn configure<F>(mut self, configure: F) -> QueryResult<Self>
    where
        F: FnOnce(&mut QueryBuilder) -> QueryResult<()>,
    {
        configure(&mut self)?;
        Ok(self)
    }

    /// Returns the resource type being searched.
    pub fn resource(&self) -> &ResourceKind {
        self.registry.resource()
    }

    /// Returns the registry backing this builder.
    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    /// Returns a handle for the named field.
    ///
    /// # Errors
    ///
    /// `QueryError::UnknownField` if the field is not registered.
    pub fn field(&mut self, name: &str) -> QueryResult<FieldHandle<'_>> {
        let descriptor = self
            .registry
            .get(name)
            .cloned()
            .ok_or_else(|| QueryError::UnknownField {
                resource: self.registry.resource().to_string(),
                field: name.to_string(),
            })?;

        Ok(FieldHandle {
            builder: self,
            descriptor,
        })
    }

    /// Applies an operator chosen at runtime.
    ///
    /// `Between` takes two operands; `In` takes any number; every other
    /// operator takes exactly one.
    pub fn apply(
        &mut self,
        field: &str,
        operator: Operator,
        operands: Vec<Operand>,
    ) -> QueryResult<&mut Self> {
        let handle = self.field(field)?;

        if operator == Operator::In {
            return handle.is_in(operands);
        }

        match (operator, operands.as_slice()) {
            (Operator::Between, [min, max]) => handle.between(min.clone(), max.clone()),
            (Operator::Is, [value]) => handle.is(value.clone()),
            (Operator::IsNot, [value]) => handle.is_not(value.clone()),
            (Operator::StartsWith, [value]) => handle.starts_with(value.clone()),
            (Operator::EndsWith, [value]) => handle.ends_with(value.clone()),
            (Operator::Contains, [value]) => handle.contains(value.clone()),
            (Operator::LessThanOrEqualTo, [value]) => handle.less_than_or_equal_to(value.clone()),
            (Operator::GreaterThanOrEqualTo, [value]) => {
                handle.greater_than_or_equal_to(value.clone())
            }
            (Operator::Between, _) => Err(arity_error(field, operator, 2, &operands)),
            _ => Err(arity_error(field, operator, 1, &operands)),
        }
    }

    /// Removes any criterion on the field.
    pub fn clear(&mut self, field: &str) -> &mut Self {
        self.criteria.shift_remove(field);
        self
    }

    /// Returns the number of constrained fields.
    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    /// Returns true if no field is constrained.
    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Snapshots the accumulated criteria into an immutable query.
    ///
    /// Calling this repeatedly is harmless; each call reflects the state at
    /// that moment.
    pub fn build(&self) -> Query {
        Query::new(self.registry.resource().clone(), self.criteria.clone())
    }

    fn set(&mut self, field: &str, criterion: Criterion) {
        // Keep the original position when a field is overwritten.
        if let Some(existing) = self.criteria.get_mut(field) {
            *existing = criterion;
        } else {
            self.criteria.insert(field.to_string(), criterion);
        }
    }
}

fn arity_error(field: &str, operator: Operator, expected: usize, operands: &[Operand]) -> QueryError {
    QueryError::InvalidOperand {
        field: field.to_string(),
        value: operands
            .iter()
            .map(Operand::to_text)
            .collect::<Vec<_>>()
            .join(","),
        message: format!("'{}' takes {} operand(s)", operator, expected),
    }
}

/// A handle bound to one field of a [`QueryBuilder`].
///
/// Each operator consumes the handle and returns the builder so further
/// fields can be chained.
#[derive(Debug)]
pub struct FieldHandle<'a> {
    builder: &'a mut QueryBuilder,
    descriptor: FieldDescriptor,
}

impl<'a> FieldHandle<'a> {
    /// Returns the field's descriptor.
    pub fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    /// Returns the field's kind.
    pub fn kind(&self) -> FieldKind {
        self.descriptor.kind
    }

    /// Exact match.
    ///
    /// On multi-value fields this is `is_in([value])`; on range fields it
    /// pins the value.
    pub fn is(self, value: impl Into<Operand>) -> QueryResult<&'a mut QueryBuilder> {
        self.check(Operator::Is)?;
        match self.descriptor.kind {
            FieldKind::MultiValue | FieldKind::MultiValueOrText => self.is_in([value.into()]),
            FieldKind::Range => {
                let value = self.coerce(value.into())?;
                self.commit(Criterion::Range(RangeBounds::exactly(value)))
            }
            _ => self.text(TextOperator::Is, value.into()),
        }
    }

    /// Exclusion of a single value.
    pub fn is_not(self, value: impl Into<Operand>) -> QueryResult<&'a mut QueryBuilder> {
        self.check(Operator::IsNot)?;
        match self.descriptor.kind {
            FieldKind::MultiValue | FieldKind::MultiValueOrText => {
                let value = value.into().to_text();
                self.check_allowed(&value)?;
                self.commit(Criterion::NotMember { value })
            }
            _ => self.text(TextOperator::IsNot, value.into()),
        }
    }

    /// Prefix match.
    pub fn starts_with(self, value: impl Into<Operand>) -> QueryResult<&'a mut QueryBuilder> {
        self.check(Operator::StartsWith)?;
        self.text(TextOperator::StartsWith, value.into())
    }

    /// Suffix match.
    pub fn ends_with(self, value: impl Into<Operand>) -> QueryResult<&'a mut QueryBuilder> {
        self.check(Operator::EndsWith)?;
        self.text(TextOperator::EndsWith, value.into())
    }

    /// Substring match.
    pub fn contains(self, value: impl Into<Operand>) -> QueryResult<&'a mut QueryBuilder> {
        self.check(Operator::Contains)?;
        self.text(TextOperator::Contains, value.into())
    }

    /// Set membership.
    ///
    /// Accepts any iterable: arrays, vectors, slices of strings or operands.
    /// Values are de-duplicated keeping first-seen order. An empty set
    /// removes the field's criterion, matching every value.
    pub fn is_in<I, V>(self, values: I) -> QueryResult<&'a mut QueryBuilder>
    where
        I: IntoIterator<Item = V>,
        V: Into<Operand>,
    {
        self.check(Operator::In)?;

        let mut seen = HashSet::new();
        let mut members = Vec::new();
        for value in values {
            let value = value.into().to_text();
            self.check_allowed(&value)?;
            if seen.insert(value.clone()) {
                members.push(value);
            }
        }

        if members.is_empty() {
            return Ok(self.builder.clear(&self.descriptor.name));
        }
        self.commit(Criterion::Members { values: members })
    }

    /// Inclusive upper bound, merged with an existing lower bound.
    pub fn less_than_or_equal_to(
        self,
        value: impl Into<Operand>,
    ) -> QueryResult<&'a mut QueryBuilder> {
        self.check(Operator::LessThanOrEqualTo)?;
        let value = self.coerce(value.into())?;
        let mut bounds = self.current_bounds();
        bounds.max = Some(value);
        self.commit_range(bounds)
    }

    /// Inclusive lower bound, merged with an existing upper bound.
    pub fn greater_than_or_equal_to(
        self,
        value: impl Into<Operand>,
    ) -> QueryResult<&'a mut QueryBuilder> {
        self.check(Operator::GreaterThanOrEqualTo)?;
        let value = self.coerce(value.into())?;
        let mut bounds = self.current_bounds();
        bounds.min = Some(value);
        self.commit_range(bounds)
    }

    /// Inclusive range; fails if `min > max`.
    pub fn between(
        self,
        min: impl Into<Operand>,
        max: impl Into<Operand>,
    ) -> QueryResult<&'a mut QueryBuilder> {
        self.check(Operator::Between)?;
        let min = self.coerce(min.into())?;
        let max = self.coerce(max.into())?;
        self.commit_range(RangeBounds::between(min, max))
    }

    fn check(&self, operator: Operator) -> QueryResult<()> {
        if self.descriptor.kind.allows(operator) {
            Ok(())
        } else {
            Err(QueryError::IllegalOperator {
                field: self.descriptor.name.clone(),
                operator: operator.to_string(),
                kind: self.descriptor.kind.to_string(),
            })
        }
    }

    fn check_allowed(&self, value: &str) -> QueryResult<()> {
        match &self.descriptor.allowed_values {
            Some(allowed) if !allowed.iter().any(|a| a == value) => {
                Err(QueryError::InvalidValue {
                    field: self.descriptor.name.clone(),
                    value: value.to_string(),
                    allowed: allowed.join(", "),
                })
            }
            _ => Ok(()),
        }
    }

    fn coerce(&self, operand: Operand) -> QueryResult<RangeValue> {
        RangeValue::coerce(&self.descriptor.name, operand, self.descriptor.range_value)
    }

    /// Existing min/max bounds; an exact `is` is discarded.
    fn current_bounds(&self) -> RangeBounds {
        match self.builder.criteria.get(&self.descriptor.name) {
            Some(Criterion::Range(bounds)) if bounds.is.is_none() => bounds.clone(),
            _ => RangeBounds::default(),
        }
    }

    fn commit_range(self, bounds: RangeBounds) -> QueryResult<&'a mut QueryBuilder> {
        if let (Some(min), Some(max)) = (&bounds.min, &bounds.max) {
            match min.compare(max) {
                None => {
                    return Err(QueryError::InvalidRange {
                        field: self.descriptor.name.clone(),
                        message: format!(
                            "bounds have different types ({} and {})",
                            min.kind(),
                            max.kind()
                        ),
                    });
                }
                Some(std::cmp::Ordering::Greater) => {
                    return Err(QueryError::InvalidRange {
                        field: self.descriptor.name.clone(),
                        message: format!("min {} is greater than max {}", min, max),
                    });
                }
                Some(_) => {}
            }
        }
        self.commit(Criterion::Range(bounds))
    }

    fn text(self, op: TextOperator, value: Operand) -> QueryResult<&'a mut QueryBuilder> {
        let value = value.to_text();
        self.commit(Criterion::Text { op, value })
    }

    fn commit(self, criterion: Criterion) -> QueryResult<&'a mut QueryBuilder> {
        self.builder.set(&self.descriptor.name, criterion);
        Ok(self.builder)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;

    fn subscriptions() -> QueryBuilder {
        QueryBuilder::for_resource(ResourceKind::Subscription)
    }

    #[test]
    fn test_unknown_field() {
        let mut search = subscriptions();
        let err = search.field("nonexistent_field").unwrap_err();
        assert!(matches!(err, QueryError::UnknownField { ref field, .. } if field == "nonexistent_field"));
    }

    #[test]
    fn test_illegal_operator_for_kind() {
        let mut search = subscriptions();
        let err = search.field("price").unwrap().starts_with("1").unwrap_err();
        assert_eq!(
            err,
            QueryError::IllegalOperator {
                field: "price".to_string(),
                operator: "starts_with".to_string(),
                kind: "range".to_string(),
            }
        );

        let err = search.field("id").unwrap().is_in(["a"]).unwrap_err();
        assert!(matches!(err, QueryError::IllegalOperator { .. }));
        assert!(search.is_empty());
    }

    #[test]
    fn test_text_last_write_wins() {
        let mut search = subscriptions();
        search.field("id").unwrap().starts_with("a").unwrap();
        search.field("id").unwrap().ends_with("z").unwrap();

        let query = search.build();
        assert_eq!(query.len(), 1);
        assert_eq!(
            query.get("id"),
            Some(&Criterion::Text {
                op: TextOperator::EndsWith,
                value: "z".to_string()
            })
        );
    }

    #[test]
    fn test_in_dedupes_in_first_seen_order() {
        let mut search = subscriptions();
        search
            .field("status")
            .unwrap()
            .is_in(vec!["Canceled", "Active", "Canceled"])
            .unwrap();

        assert_eq!(
            search.build().to_wire(),
            json!({"status": ["Canceled", "Active"]})
        );
    }

    #[test]
    fn test_empty_in_is_match_all() {
        let mut search = subscriptions();
        search.field("status").unwrap().is_in(["Active"]).unwrap();
        search.field("status").unwrap().is_in(Vec::<String>::new()).unwrap();

        assert_eq!(search.build(), subscriptions().build());
    }

    #[test]
    fn test_is_on_multi_value_equals_single_in() {
        let mut with_is = subscriptions();
        with_is.field("status").unwrap().is("Active").unwrap();

        let mut with_in = subscriptions();
        with_in.field("status").unwrap().is_in(["Active"]).unwrap();

        assert_eq!(with_is.build(), with_in.build());
    }

    #[test]
    fn test_allowed_values_enforced() {
        let mut search = subscriptions();
        let err = search
            .field("status")
            .unwrap()
            .is_in(["Active", "Paused"])
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidValue { ref value, .. } if value == "Paused"));

        let err = search.field("status").unwrap().is_not("Paused").unwrap_err();
        assert!(matches!(err, QueryError::InvalidValue { .. }));
    }

    #[test]
    fn test_between_rejects_inverted_bounds() {
        let mut search = subscriptions();
        let err = search
            .field("price")
            .unwrap()
            .between(Decimal::new(20, 0), Decimal::new(10, 0))
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidRange { .. }));
        assert!(search.build().is_empty());
    }

    #[test]
    fn test_range_bounds_merge() {
        let mut search = subscriptions();
        search
            .field("price")
            .unwrap()
            .greater_than_or_equal_to("10.00")
            .unwrap();
        search
            .field("price")
            .unwrap()
            .less_than_or_equal_to(Decimal::new(2000, 2))
            .unwrap();

        let mut between = subscriptions();
        between.field("price").unwrap().between("10", "20").unwrap();

        assert_eq!(search.build(), between.build());
        assert_eq!(
            search.build().to_wire(),
            json!({"price": {"min": "10", "max": "20"}})
        );

        let err = search
            .field("price")
            .unwrap()
            .greater_than_or_equal_to("25")
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidRange { .. }));
    }

    #[test]
    fn test_range_is_replaces_bounds() {
        let mut search = subscriptions();
        search.field("price").unwrap().between("1", "5").unwrap();
        search.field("price").unwrap().is("13").unwrap();
        assert_eq!(search.build().to_wire(), json!({"price": {"is": "13"}}));

        search.field("price").unwrap().less_than_or_equal_to("4").unwrap();
        assert_eq!(search.build().to_wire(), json!({"price": {"max": "4"}}));
    }

    #[test]
    fn test_timestamp_range_normalizes_to_utc() {
        let mut search = subscriptions();
        let tokyo = chrono::FixedOffset::east_opt(9 * 3600).unwrap();
        search
            .field("created_at")
            .unwrap()
            .between(
                tokyo.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
                NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
            )
            .unwrap();

        assert_eq!(
            search.build().to_wire(),
            json!({"created_at": {"min": "2024-06-01T00:00:00Z", "max": "2024-06-02T00:00:00Z"}})
        );
    }

    #[test]
    fn test_timestamp_field_rejects_amount() {
        let mut search = subscriptions();
        let err = search
            .field("created_at")
            .unwrap()
            .greater_than_or_equal_to(Decimal::ONE)
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidOperand { .. }));

        let err = search
            .field("next_billing_date")
            .unwrap()
            .between(Utc::now(), "soon")
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidOperand { .. }));
    }

    #[test]
    fn test_multi_value_or_text_accepts_both() {
        let mut search = subscriptions();
        search.field("plan_id").unwrap().contains("gold").unwrap();
        search.field("plan_id").unwrap().is_in(["gold", "silver"]).unwrap();
        assert_eq!(
            search.build().to_wire(),
            json!({"plan_id": ["gold", "silver"]})
        );
    }

    #[test]
    fn test_chaining_preserves_field_order() {
        let mut search = subscriptions();
        search
            .field("status")
            .unwrap()
            .is("Active")
            .unwrap()
            .field("id")
            .unwrap()
            .is_not("sub_1")
            .unwrap();
        search.field("status").unwrap().is("Canceled").unwrap();

        let wire = search.build().to_wire();
        let keys: Vec<&String> = wire.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["status", "id"]);
    }

    #[test]
    fn test_build_is_idempotent_snapshot() {
        let mut search = subscriptions();
        search.field("id").unwrap().is("a").unwrap();
        let first = search.build();
        assert_eq!(first, search.build());

        search.field("price").unwrap().is("1").unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(search.build().len(), 2);
    }

    #[test]
    fn test_apply_runtime_operators() {
        let mut search = subscriptions();
        let criteria = [
            ("id", "starts_with", vec![Operand::from("sub_")]),
            ("status", "in", vec!["Active".into(), "Pending".into()]),
            ("price", "between", vec!["1".into(), "2".into()]),
        ];
        for (field, op, operands) in criteria {
            search.apply(field, op.parse().unwrap(), operands).unwrap();
        }
        assert_eq!(search.len(), 3);

        let err = search
            .apply("price", Operator::Between, vec!["1".into()])
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidOperand { .. }));
        assert!(matches!(
            "like".parse::<Operator>(),
            Err(QueryError::UnknownOperator { .. })
        ));
    }

    #[test]
    fn test_partial_match_and_equality_kinds() {
        let mut customers = QueryBuilder::for_resource(ResourceKind::Customer);
        customers
            .field("credit_card_number")
            .unwrap()
            .ends_with("1111")
            .unwrap();
        assert!(customers.field("credit_card_number").unwrap().is("4111").is_err());

        customers
            .field("credit_card_expiration_date")
            .unwrap()
            .is("05/2030")
            .unwrap();
        assert!(customers
            .field("credit_card_expiration_date")
            .unwrap()
            .contains("2030")
            .is_err());
    }
}
