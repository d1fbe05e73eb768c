//! Lazily paginated search results.
//!
//! A [`SearchResultCollection`] owns the id list returned by one advanced
//! search. Its size and membership are fixed at that moment: records created
//! on the gateway afterwards never show up, and records deleted afterwards
//! are handled per [`MissingRecordPolicy`] when their page is fetched.
//!
//! Iteration walks the id list in batches of
//! [`SearchConfig::batch_size`], issuing one bulk fetch per batch and
//! holding at most one page in memory.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use indexmap::IndexSet;
use indexmap::set::Slice;

use crate::config::{MissingRecordPolicy, SearchConfig};
use crate::error::{SearchError, SearchResult, TransportError, TransportResult};
use crate::types::{page_count, GatewayRecord, Page, PageInfo, ResourceId, ResourceKind};

use super::transport::{GatewayTransport, IdListResponse};

/// One position in a result collection.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchHit {
    /// The record was fetched.
    Found(GatewayRecord),
    /// The id was listed by the search but the gateway no longer has it.
    Missing(ResourceId),
}

impl SearchHit {
    /// Returns the id at this position.
    pub fn id(&self) -> &ResourceId {
        match self {
            SearchHit::Found(record) => record.id(),
            SearchHit::Missing(id) => id,
        }
    }

    /// Returns the record, if it was found.
    pub fn record(&self) -> Option<&GatewayRecord> {
        match self {
            SearchHit::Found(record) => Some(record),
            SearchHit::Missing(_) => None,
        }
    }

    /// Consumes the hit, returning the record if it was found.
    pub fn into_record(self) -> Option<GatewayRecord> {
        match self {
            SearchHit::Found(record) => Some(record),
            SearchHit::Missing(_) => None,
        }
    }

    /// Returns true if the record was found.
    pub fn is_found(&self) -> bool {
        matches!(self, SearchHit::Found(_))
    }

    /// Returns true if the record has disappeared since the search.
    pub fn is_missing(&self) -> bool {
        matches!(self, SearchHit::Missing(_))
    }
}

/// The executed result of a search.
///
/// Cloning is cheap relative to a fetch and shares the transport; each clone
/// still iterates independently.
#[derive(Clone)]
pub struct SearchResultCollection {
    resource: ResourceKind,
    ids: IndexSet<ResourceId>,
    reported_count: Option<u64>,
    transport: Arc<dyn GatewayTransport>,
    config: SearchConfig,
}

impl fmt::Debug for SearchResultCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchResultCollection")
            .field("resource", &self.resource)
            .field("size", &self.ids.len())
            .field("reported_count", &self.reported_count)
            .field("backend", &self.transport.backend_name())
            .field("config", &self.config)
            .finish()
    }
}

impl SearchResultCollection {
    /// Captures the id list of a completed search.
    ///
    /// Repeated ids keep their first position.
    pub(crate) fn new(
        resource: ResourceKind,
        response: IdListResponse,
        transport: Arc<dyn GatewayTransport>,
        config: SearchConfig,
    ) -> Self {
        let listed = response.ids.len();
        let ids: IndexSet<ResourceId> = response.ids.into_iter().collect();

        if ids.len() != listed {
            tracing::warn!(
                resource = %resource,
                listed,
                unique = ids.len(),
                "Search returned duplicate ids; keeping first occurrences"
            );
        }

        if let Some(count) = response.count
            && count != ids.len() as u64
        {
            tracing::warn!(
                resource = %resource,
                reported = count,
                captured = ids.len(),
                "Reported search count differs from the id list"
            );
        }

        Self {
            resource,
            ids,
            reported_count: response.count,
            transport,
            config,
        }
    }

    /// Returns the resource type of the results.
    pub fn resource(&self) -> &ResourceKind {
        &self.resource
    }

    /// Returns the number of ids captured by the search.
    ///
    /// This never changes and performs no I/O.
    pub fn size(&self) -> usize {
        self.ids.len()
    }

    /// Alias of [`size`](Self::size).
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if the search matched nothing.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the captured ids in gateway order.
    pub fn ids(&self) -> &Slice<ResourceId> {
        self.ids.as_slice()
    }

    /// Returns the match count the gateway reported alongside the ids.
    pub fn reported_count(&self) -> Option<u64> {
        self.reported_count
    }

    /// Returns the configuration this collection paginates with.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Returns true if the id is part of the result set.
    pub fn contains(&self, id: &ResourceId) -> bool {
        self.ids.contains(id)
    }

    /// Returns true if the record is part of the result set.
    ///
    /// Membership is decided by resource type and id only.
    pub fn contains_record(&self, record: &GatewayRecord) -> bool {
        record.resource() == &self.resource && self.contains(record.id())
    }

    /// Returns the number of pages a full iteration fetches.
    pub fn page_count(&self) -> usize {
        page_count(self.ids.len(), self.config.batch_size)
    }

    /// Starts a fresh iteration over individual results.
    pub fn cursor(&self) -> ResultCursor<'_> {
        ResultCursor {
            pages: self.pages(),
            buffer: Vec::new().into_iter(),
        }
    }

    /// Starts a fresh iteration over whole pages.
    pub fn pages(&self) -> PageCursor<'_> {
        PageCursor {
            collection: self,
            next_index: 0,
            done: false,
        }
    }

    /// Fetches one page by index.
    ///
    /// An index past the last page yields an empty page without I/O.
    ///
    /// # Errors
    ///
    /// `SearchError::PageFetch` if the bulk fetch fails or its response does
    /// not match the requested ids.
    pub async fn fetch_page(&self, index: usize) -> SearchResult<Page<SearchHit>> {
        let batch_size = self.config.batch_size;
        let info = PageInfo::for_index(index, batch_size, self.ids.len());
        if index >= self.page_count() || info.offset >= info.total {
            return Ok(Page::new(Vec::new(), info));
        }

        let end = info.end(batch_size);
        let batch: Vec<ResourceId> = self.ids[info.offset..end].iter().cloned().collect();

        tracing::debug!(
            resource = %self.resource,
            backend = self.transport.backend_name(),
            page = index,
            offset = info.offset,
            end,
            "Fetching result page"
        );

        let page_error = |source: TransportError| SearchError::PageFetch {
            page: index,
            offset: info.offset,
            end,
            source,
        };

        let records = self
            .transport
            .fetch(&self.resource, &batch)
            .await
            .map_err(page_error)?;
        let hits = self.reconcile(&batch, records).map_err(page_error)?;

        Ok(Page::new(hits, info))
    }

    /// Returns the first result, fetching only the first page.
    pub async fn first(&self) -> SearchResult<Option<SearchHit>> {
        self.cursor().next().await.transpose()
    }

    /// Counts the records that could be fetched.
    ///
    /// Unlike [`size`](Self::size) this walks the whole collection, so
    /// records deleted since the search are not counted.
    pub async fn count(&self) -> SearchResult<usize> {
        let mut cursor = self.cursor();
        let mut found = 0;
        while let Some(hit) = cursor.next().await {
            if hit?.is_found() {
                found += 1;
            }
        }
        Ok(found)
    }

    /// Returns true if every fetched record satisfies the predicate.
    ///
    /// Stops at the first record that does not. Missing records are not
    /// tested.
    pub async fn all<F>(&self, mut predicate: F) -> SearchResult<bool>
    where
        F: FnMut(&GatewayRecord) -> bool,
    {
        let mut cursor = self.cursor();
        while let Some(hit) = cursor.next().await {
            if let SearchHit::Found(record) = hit?
                && !predicate(&record)
            {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Returns true if any fetched record satisfies the predicate.
    ///
    /// Stops at the first match.
    pub async fn any<F>(&self, mut predicate: F) -> SearchResult<bool>
    where
        F: FnMut(&GatewayRecord) -> bool,
    {
        let mut cursor = self.cursor();
        while let Some(hit) = cursor.next().await {
            if let SearchHit::Found(record) = hit?
                && predicate(&record)
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Materializes every result, missing markers included.
    pub async fn collect_hits(&self) -> SearchResult<Vec<SearchHit>> {
        let mut cursor = self.cursor();
        let mut hits = Vec::with_capacity(self.ids.len());
        while let Some(hit) = cursor.next().await {
            hits.push(hit?);
        }
        Ok(hits)
    }

    /// Materializes every record that could be fetched.
    pub async fn collect_records(&self) -> SearchResult<Vec<GatewayRecord>> {
        let hits = self.collect_hits().await?;
        Ok(hits.into_iter().filter_map(SearchHit::into_record).collect())
    }

    /// Orders fetched records by the requested ids.
    fn reconcile(
        &self,
        requested: &[ResourceId],
        records: Vec<GatewayRecord>,
    ) -> TransportResult<Vec<SearchHit>> {
        let backend_name = self.transport.backend_name();
        let wanted: HashSet<&ResourceId> = requested.iter().collect();
        let mut by_id: HashMap<ResourceId, GatewayRecord> = HashMap::with_capacity(records.len());

        for record in records {
            if record.resource() != &self.resource {
                return Err(TransportError::MalformedResponse {
                    backend_name: backend_name.to_string(),
                    message: format!(
                        "fetch for {} returned a {} record ({})",
                        self.resource,
                        record.resource(),
                        record.id()
                    ),
                });
            }
            if !wanted.contains(record.id()) {
                return Err(TransportError::MalformedResponse {
                    backend_name: backend_name.to_string(),
                    message: format!("fetch returned unrequested id {}", record.id()),
                });
            }
            let id = record.id().clone();
            if by_id.insert(id.clone(), record).is_some() {
                return Err(TransportError::MalformedResponse {
                    backend_name: backend_name.to_string(),
                    message: format!("fetch returned id {} more than once", id),
                });
            }
        }

        let mut hits = Vec::with_capacity(requested.len());
        for id in requested {
            match by_id.remove(id) {
                Some(record) => hits.push(SearchHit::Found(record)),
                None => {
                    tracing::warn!(
                        resource = %self.resource,
                        id = %id,
                        policy = %self.config.missing_records,
                        "Listed record no longer exists"
                    );
                    if self.config.missing_records == MissingRecordPolicy::Report {
                        hits.push(SearchHit::Missing(id.clone()));
                    }
                }
            }
        }
        Ok(hits)
    }
}

/// Iterates over the pages of a collection.
///
/// Each call to [`next`](Self::next) performs one bulk fetch. After an error
/// the cursor is exhausted.
#[derive(Debug)]
pub struct PageCursor<'a> {
    collection: &'a SearchResultCollection,
    next_index: usize,
    done: bool,
}

impl PageCursor<'_> {
    /// Fetches the next page, or returns `None` at the end.
    pub async fn next(&mut self) -> Option<SearchResult<Page<SearchHit>>> {
        if self.done || self.next_index >= self.collection.page_count() {
            self.done = true;
            return None;
        }

        let result = self.collection.fetch_page(self.next_index).await;
        match &result {
            Ok(_) => self.next_index += 1,
            Err(_) => self.done = true,
        }
        Some(result)
    }

    /// Returns the index of the page the next call fetches.
    pub fn next_index(&self) -> usize {
        self.next_index
    }
}

/// Iterates over the individual results of a collection.
///
/// ```
/// # use std::sync::Arc;
/// # use gateway_search::backends::InMemoryGateway;
/// # use gateway_search::core::SearchClient;
/// # use gateway_search::types::ResourceKind;
/// # use serde_json::json;
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), gateway_search::error::SearchError> {
/// let gateway = Arc::new(InMemoryGateway::new());
/// gateway.insert(ResourceKind::Customer, "c1", json!({"first_name": "Ada"}));
///
/// let client = SearchClient::with_defaults(gateway);
/// let results = client
///     .search(ResourceKind::Customer, |search| {
///         search.field("first_name")?.starts_with("A")?;
///         Ok(())
///     })
///     .await?;
///
/// let mut cursor = results.cursor();
/// while let Some(hit) = cursor.next().await {
///     println!("{}", hit?.id());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ResultCursor<'a> {
    pages: PageCursor<'a>,
    buffer: std::vec::IntoIter<SearchHit>,
}

impl ResultCursor<'_> {
    /// Returns the next result, fetching a page when the current one is used
    /// up.
    ///
    /// `None` means the collection is exhausted; `Some(Err(_))` means a page
    /// could not be fetched and iteration has stopped.
    pub async fn next(&mut self) -> Option<SearchResult<SearchHit>> {
        loop {
            if let Some(hit) = self.buffer.next() {
                return Some(Ok(hit));
            }
            match self.pages.next().await? {
                Ok(page) => self.buffer = page.items.into_iter(),
                Err(err) => return Some(Err(err)),
            }
        }
    }
}
