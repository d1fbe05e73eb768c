//! Assertion helpers for search results.

use std::collections::HashSet;

use gateway_search::core::{SearchHit, SearchResultCollection};
use gateway_search::types::GatewayRecord;

/// Walks a collection to the end and returns every hit.
///
/// # Panics
///
/// Panics if any page fails to load.
pub async fn drain(collection: &SearchResultCollection) -> Vec<SearchHit> {
    let mut cursor = collection.cursor();
    let mut hits = Vec::new();
    while let Some(hit) = cursor.next().await {
        hits.push(hit.expect("page fetch failed"));
    }
    hits
}

/// Returns the ids of hits as strings.
pub fn hit_ids(hits: &[SearchHit]) -> Vec<String> {
    hits.iter().map(|hit| hit.id().to_string()).collect()
}

/// Asserts that the ids are pairwise distinct.
pub fn assert_distinct(ids: &[String]) {
    let unique: HashSet<&String> = ids.iter().collect();
    assert_eq!(
        unique.len(),
        ids.len(),
        "Expected distinct ids, found {} duplicates",
        ids.len() - unique.len()
    );
}

/// Asserts that a record's string field has the expected value.
pub fn assert_field(record: &GatewayRecord, field: &str, expected: &str) {
    assert_eq!(
        record.field_str(field),
        Some(expected),
        "Field '{}' mismatch on {}",
        field,
        record.id()
    );
}

/// Returns the found records of a list of hits.
pub fn found_records(hits: Vec<SearchHit>) -> Vec<GatewayRecord> {
    hits.into_iter().filter_map(SearchHit::into_record).collect()
}
