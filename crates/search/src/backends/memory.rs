//! In-memory gateway.
//!
//! [`InMemoryGateway`] stores JSON records per resource kind and evaluates
//! wire-shaped criteria against them, so collections can be exercised end to
//! end without a network. Records can be inserted and deleted at any time,
//! including between a search and the fetches that follow it, and faults can
//! be injected into either call.
//!
//! Range fields compare as decimals or UTC timestamps; every other field
//! compares exactly. Field kinds come from each resource's standard catalog
//! unless a registry is installed with [`InMemoryGateway::register`].

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;

use crate::config::MAX_BATCH_SIZE;
use crate::core::{GatewayTransport, IdListResponse, SearchRequest};
use crate::error::{TransportError, TransportResult};
use crate::search::{FieldKind, FieldRegistry};
use crate::types::{parse_amount, parse_timestamp, GatewayRecord, ResourceId, ResourceKind, TextOperator};

const BACKEND_NAME: &str = "memory";

#[derive(Default)]
struct Faults {
    next_search: Option<TransportError>,
    fetch: Option<(usize, TransportError)>,
}

/// A simulated gateway backed by in-process maps.
///
/// Records keep insertion order, which is the order searches list them in.
///
/// # Example
///
/// ```
/// use gateway_search::backends::InMemoryGateway;
/// use gateway_search::types::ResourceKind;
/// use serde_json::json;
///
/// let gateway = InMemoryGateway::new();
/// gateway.insert(ResourceKind::Subscription, "sub_1", json!({"status": "Active"}));
/// assert_eq!(gateway.len(&ResourceKind::Subscription), 1);
/// assert!(gateway.delete(&ResourceKind::Subscription, "sub_1"));
/// ```
#[derive(Default)]
pub struct InMemoryGateway {
    records: RwLock<HashMap<ResourceKind, IndexMap<ResourceId, Value>>>,
    registries: RwLock<HashMap<ResourceKind, Arc<FieldRegistry>>>,
    faults: Mutex<Faults>,
    search_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
}

impl std::fmt::Debug for InMemoryGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryGateway")
            .field("search_calls", &self.search_calls())
            .field("fetch_calls", &self.fetch_calls())
            .finish_non_exhaustive()
    }
}

impl InMemoryGateway {
    /// Creates an empty gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a record, replacing any record with the same id in place.
    pub fn insert(&self, resource: ResourceKind, id: impl Into<ResourceId>, content: Value) {
        self.records
            .write()
            .entry(resource)
            .or_default()
            .insert(id.into(), content);
    }

    /// Removes a record; returns false if it did not exist.
    pub fn delete(&self, resource: &ResourceKind, id: &str) -> bool {
        self.records
            .write()
            .get_mut(resource)
            .and_then(|records| records.shift_remove(id))
            .is_some()
    }

    /// Installs the field registry used to evaluate criteria for its
    /// resource type, replacing the standard catalog.
    pub fn register(&self, registry: FieldRegistry) {
        self.registries
            .write()
            .insert(registry.resource().clone(), Arc::new(registry));
    }

    fn registry(&self, resource: &ResourceKind) -> Arc<FieldRegistry> {
        if let Some(registry) = self.registries.read().get(resource) {
            return registry.clone();
        }
        self.registries
            .write()
            .entry(resource.clone())
            .or_insert_with(|| Arc::new(resource.registry()))
            .clone()
    }

    /// Returns the number of stored records of a kind.
    pub fn len(&self, resource: &ResourceKind) -> usize {
        self.records.read().get(resource).map_or(0, IndexMap::len)
    }

    /// Returns true if no records of the kind are stored.
    pub fn is_empty(&self, resource: &ResourceKind) -> bool {
        self.len(resource) == 0
    }

    /// Returns the number of search calls received.
    pub fn search_calls(&self) -> usize {
        self.search_calls.load(AtomicOrdering::SeqCst)
    }

    /// Returns the number of fetch calls received.
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(AtomicOrdering::SeqCst)
    }

    /// Resets both call counters.
    pub fn reset_counters(&self) {
        self.search_calls.store(0, AtomicOrdering::SeqCst);
        self.fetch_calls.store(0, AtomicOrdering::SeqCst);
    }

    /// Makes the next search call fail with `error`.
    pub fn fail_next_search(&self, error: TransportError) {
        self.faults.lock().next_search = Some(error);
    }

    /// Lets `successful` fetch calls through, then fails the next one with
    /// `error`.
    pub fn fail_fetch_after(&self, successful: usize, error: TransportError) {
        self.faults.lock().fetch = Some((successful, error));
    }

    fn take_fetch_fault(&self) -> Option<TransportError> {
        let mut faults = self.faults.lock();
        match faults.fetch.take() {
            Some((0, error)) => Some(error),
            Some((remaining, error)) => {
                faults.fetch = Some((remaining - 1, error));
                None
            }
            None => None,
        }
    }
}

#[async_trait]
impl GatewayTransport for InMemoryGateway {
    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }

    async fn search(&self, request: &SearchRequest) -> TransportResult<IdListResponse> {
        self.search_calls.fetch_add(1, AtomicOrdering::SeqCst);
        if let Some(error) = self.faults.lock().next_search.take() {
            return Err(error);
        }

        let criteria = match &request.criteria {
            Value::Object(criteria) => criteria,
            other => {
                return Err(TransportError::Rejected {
                    message: format!("search criteria must be an object, got {}", other),
                });
            }
        };

        let registry = self.registry(&request.resource);
        let records = self.records.read();
        let mut ids = Vec::new();
        if let Some(stored) = records.get(&request.resource) {
            for (id, content) in stored {
                if matches_all(criteria, &registry, id, content)? {
                    ids.push(id.clone());
                }
            }
        }

        let count = ids.len() as u64;
        Ok(IdListResponse::new(ids).with_count(count))
    }

    async fn fetch(
        &self,
        resource: &ResourceKind,
        ids: &[ResourceId],
    ) -> TransportResult<Vec<GatewayRecord>> {
        self.fetch_calls.fetch_add(1, AtomicOrdering::SeqCst);
        if let Some(error) = self.take_fetch_fault() {
            return Err(error);
        }
        if ids.len() > MAX_BATCH_SIZE {
            return Err(TransportError::Rejected {
                message: format!(
                    "bulk fetch of {} ids exceeds the limit of {}",
                    ids.len(),
                    MAX_BATCH_SIZE
                ),
            });
        }

        let records = self.records.read();
        let Some(stored) = records.get(resource) else {
            return Ok(Vec::new());
        };

        Ok(ids
            .iter()
            .filter_map(|id| {
                stored
                    .get(id)
                    .map(|content| GatewayRecord::new(resource.clone(), id.clone(), content.clone()))
            })
            .collect())
    }
}

fn matches_all(
    criteria: &serde_json::Map<String, Value>,
    registry: &FieldRegistry,
    id: &ResourceId,
    content: &Value,
) -> TransportResult<bool> {
    for (field, condition) in criteria {
        let candidate = if field == "ids" {
            Some(id.as_str().to_string())
        } else {
            content.get(field).and_then(scalar_text)
        };
        let ordered = registry
            .get(field)
            .is_some_and(|descriptor| descriptor.kind == FieldKind::Range);
        if !matches_condition(field, ordered, condition, candidate.as_deref())? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Evaluates one wire condition. `ordered` selects value comparison for
/// range fields; other fields match `is` and `is_not` exactly.
fn matches_condition(
    field: &str,
    ordered: bool,
    condition: &Value,
    candidate: Option<&str>,
) -> TransportResult<bool> {
    match condition {
        Value::Array(values) => Ok(candidate.is_some_and(|candidate| {
            values.iter().any(|value| value.as_str() == Some(candidate))
        })),
        Value::Object(operators) => {
            for (key, operand) in operators {
                let operand = operand.as_str().ok_or_else(|| TransportError::Rejected {
                    message: format!("operand for {}.{} must be a string", field, key),
                })?;
                let matched = match key.as_str() {
                    "is" => candidate.is_some_and(|c| values_equal(ordered, c, operand)),
                    "is_not" => candidate.is_none_or(|c| !values_equal(ordered, c, operand)),
                    "min" => candidate
                        .and_then(|c| compare_values(c, operand))
                        .is_some_and(|ord| ord != Ordering::Less),
                    "max" => candidate
                        .and_then(|c| compare_values(c, operand))
                        .is_some_and(|ord| ord != Ordering::Greater),
                    other => match TextOperator::parse(other) {
                        Some(op) => candidate.is_some_and(|c| op.matches(c, operand)),
                        None => {
                            return Err(TransportError::Rejected {
                                message: format!("unknown operator '{}' on {}", other, field),
                            });
                        }
                    },
                };
                if !matched {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        other => Err(TransportError::Rejected {
            message: format!("unsupported condition for {}: {}", field, other),
        }),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Orders two values as decimals, then as timestamps.
fn compare_values(candidate: &str, operand: &str) -> Option<Ordering> {
    if let (Some(a), Some(b)) = (parse_amount(candidate), parse_amount(operand)) {
        return Some(a.cmp(&b));
    }
    if let (Some(a), Some(b)) = (parse_timestamp(candidate), parse_timestamp(operand)) {
        return Some(a.cmp(&b));
    }
    None
}

fn values_equal(ordered: bool, candidate: &str, operand: &str) -> bool {
    if !ordered {
        return candidate == operand;
    }
    match compare_values(candidate, operand) {
        Some(ordering) => ordering == Ordering::Equal,
        None => candidate == operand,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn request(criteria: Value) -> SearchRequest {
        request_for(ResourceKind::Transaction, criteria)
    }

    fn request_for(resource: ResourceKind, criteria: Value) -> SearchRequest {
        SearchRequest { resource, criteria }
    }

    async fn customer_ids(gateway: &InMemoryGateway, criteria: Value) -> Vec<String> {
        gateway
            .search(&request_for(ResourceKind::Customer, criteria))
            .await
            .unwrap()
            .ids
            .into_iter()
            .map(ResourceId::into_inner)
            .collect()
    }

    async fn search_ids(gateway: &InMemoryGateway, criteria: Value) -> Vec<String> {
        gateway
            .search(&request(criteria))
            .await
            .unwrap()
            .ids
            .into_iter()
            .map(ResourceId::into_inner)
            .collect()
    }

    fn seeded() -> InMemoryGateway {
        let gateway = InMemoryGateway::new();
        let rows = [
            ("t1", "sale", "10.00", "2024-01-01T00:00:00Z", "Jonathan"),
            ("t2", "credit", "25", "2024-02-01T12:00:00+02:00", "Joan"),
            ("t3", "sale", "7.5", "2024-03-01T00:00:00Z", "Mary"),
        ];
        for (id, kind, amount, created_at, name) in rows {
            gateway.insert(
                ResourceKind::Transaction,
                id,
                json!({"type": kind, "amount": amount, "created_at": created_at, "customer_first_name": name}),
            );
        }
        gateway
    }

    #[tokio::test]
    async fn test_membership_and_text() {
        let gateway = seeded();
        assert_eq!(search_ids(&gateway, json!({"type": ["sale"]})).await, ["t1", "t3"]);
        assert_eq!(
            search_ids(&gateway, json!({"customer_first_name": {"starts_with": "Jo"}})).await,
            ["t1", "t2"]
        );
        assert_eq!(
            search_ids(&gateway, json!({"customer_first_name": {"is_not": "Joan"}})).await,
            ["t1", "t3"]
        );
        assert_eq!(search_ids(&gateway, json!({"ids": ["t3", "t9"]})).await, ["t3"]);
    }

    #[tokio::test]
    async fn test_ranges_compare_numerically_and_in_utc() {
        let gateway = seeded();
        assert_eq!(
            search_ids(&gateway, json!({"amount": {"min": "8", "max": "25"}})).await,
            ["t1", "t2"]
        );
        assert_eq!(search_ids(&gateway, json!({"amount": {"is": "10"}})).await, ["t1"]);
        assert_eq!(
            search_ids(&gateway, json!({"created_at": {"max": "2024-02-01T10:00:00Z"}})).await,
            ["t1", "t2"]
        );
    }

    #[tokio::test]
    async fn test_text_equality_is_exact() {
        let gateway = InMemoryGateway::new();
        gateway.insert(
            ResourceKind::Customer,
            "c1",
            json!({"address_postal_code": "02134", "company": "2024-01-01T00:00:00Z"}),
        );

        assert!(customer_ids(&gateway, json!({"address_postal_code": {"is": "2134"}})).await.is_empty());
        assert_eq!(
            customer_ids(&gateway, json!({"address_postal_code": {"is": "02134"}})).await,
            ["c1"]
        );
        assert_eq!(
            customer_ids(&gateway, json!({"address_postal_code": {"is_not": "2134"}})).await,
            ["c1"]
        );
        assert!(customer_ids(&gateway, json!({"company": {"is": "2024-01-01"}})).await.is_empty());
    }

    #[tokio::test]
    async fn test_registered_fields_drive_comparison() {
        let gateway = InMemoryGateway::new();
        let widget = ResourceKind::Custom("widget".to_string());
        gateway.insert(widget.clone(), "w1", json!({"weight": "2.50", "code": "2.5"}));

        let unregistered = gateway
            .search(&request_for(widget.clone(), json!({"weight": {"is": "2.5"}})))
            .await
            .unwrap();
        assert!(unregistered.ids.is_empty());

        gateway.register(
            FieldRegistry::from_fields(
                widget.clone(),
                [
                    crate::search::FieldDescriptor::amount_range("weight"),
                    crate::search::FieldDescriptor::text("code"),
                ],
            )
            .unwrap(),
        );
        let registered = gateway
            .search(&request_for(widget.clone(), json!({"weight": {"is": "2.5"}})))
            .await
            .unwrap();
        assert_eq!(registered.ids, [ResourceId::from("w1")]);

        let text = gateway
            .search(&request_for(widget, json!({"code": {"is": "2.50"}})))
            .await
            .unwrap();
        assert!(text.ids.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_operator_rejected() {
        let gateway = seeded();
        let err = gateway
            .search(&request(json!({"amount": {"like": "1"}})))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Rejected { .. }));
    }

    #[tokio::test]
    async fn test_fetch_skips_deleted_ids() {
        let gateway = seeded();
        assert!(gateway.delete(&ResourceKind::Transaction, "t2"));
        assert!(!gateway.delete(&ResourceKind::Transaction, "t2"));

        let ids = [ResourceId::from("t1"), ResourceId::from("t2"), ResourceId::from("t3")];
        let records = gateway.fetch(&ResourceKind::Transaction, &ids).await.unwrap();
        let fetched: Vec<&str> = records.iter().map(|r| r.id().as_str()).collect();
        assert_eq!(fetched, ["t1", "t3"]);
        assert_eq!(gateway.fetch_calls(), 1);
    }

    #[tokio::test]
    async fn test_fetch_enforces_batch_limit() {
        let gateway = InMemoryGateway::new();
        let ids: Vec<ResourceId> = (0..51).map(|i| ResourceId::new(format!("x{}", i))).collect();
        let err = gateway.fetch(&ResourceKind::Customer, &ids).await.unwrap_err();
        assert!(matches!(err, TransportError::Rejected { .. }));
    }

    #[tokio::test]
    async fn test_injected_faults_fire_once() {
        let gateway = seeded();
        gateway.fail_next_search(TransportError::Maintenance);
        assert!(gateway.search(&request(json!({}))).await.is_err());
        assert!(gateway.search(&request(json!({}))).await.is_ok());
        assert_eq!(gateway.search_calls(), 2);

        gateway.fail_fetch_after(1, TransportError::Timeout { timeout_ms: 5 });
        let ids = [ResourceId::from("t1")];
        assert!(gateway.fetch(&ResourceKind::Transaction, &ids).await.is_ok());
        assert!(gateway.fetch(&ResourceKind::Transaction, &ids).await.is_err());
        assert!(gateway.fetch(&ResourceKind::Transaction, &ids).await.is_ok());
    }
}
