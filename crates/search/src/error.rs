//! Error types for gateway search.
//!
//! Errors are split into families so callers can branch on them:
//! usage errors raised synchronously by the query builder, transport errors
//! raised at the network boundary, and configuration errors raised when a
//! registry or [`SearchConfig`](crate::config::SearchConfig) is assembled.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The primary error type for all search operations.
#[derive(Error, Debug)]
pub enum SearchError {
    /// Caller misuse of the query builder.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Failure talking to the gateway while executing a search.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Failure fetching one page of an already-executed search.
    #[error("failed to fetch page {page} ({offset}..{end}): {source}")]
    PageFetch {
        page: usize,
        offset: usize,
        end: usize,
        #[source]
        source: TransportError,
    },

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SearchError {
    /// Returns true for caller errors that must never be retried.
    pub fn is_usage_error(&self) -> bool {
        matches!(self, SearchError::Query(_) | SearchError::Config(_))
    }

    /// Returns true if repeating the failed call may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SearchError::Transport(err) | SearchError::PageFetch { source: err, .. } => {
                err.is_retryable()
            }
            _ => false,
        }
    }

    /// Returns the underlying transport error, if any.
    pub fn transport_error(&self) -> Option<&TransportError> {
        match self {
            SearchError::Transport(err) | SearchError::PageFetch { source: err, .. } => Some(err),
            _ => None,
        }
    }
}

/// Errors raised synchronously while building a query.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The field name is not registered for the resource type.
    #[error("unknown search field '{field}' for {resource}")]
    UnknownField { resource: String, field: String },

    /// The operator is not legal for the field's kind.
    #[error("operator '{operator}' is not supported by {kind} field '{field}'")]
    IllegalOperator {
        field: String,
        operator: String,
        kind: String,
    },

    /// Range bounds are inverted or of mismatched types.
    #[error("invalid range for '{field}': {message}")]
    InvalidRange { field: String, message: String },

    /// The operand cannot be interpreted for the field.
    #[error("invalid operand '{value}' for '{field}': {message}")]
    InvalidOperand {
        field: String,
        value: String,
        message: String,
    },

    /// The value is outside the field's allowed value set.
    #[error("invalid value '{value}' for '{field}', expected one of: {allowed}")]
    InvalidValue {
        field: String,
        value: String,
        allowed: String,
    },

    /// The operator name is not recognized.
    #[error("unknown search operator '{operator}'")]
    UnknownOperator { operator: String },
}

/// Errors raised by a [`GatewayTransport`](crate::core::GatewayTransport).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Credentials were rejected.
    #[error("authentication failed: {message}")]
    Authentication { message: String },

    /// Credentials lack permission for the operation.
    #[error("authorization failed: {message}")]
    Authorization { message: String },

    /// The request did not complete in time.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The gateway is down for maintenance.
    #[error("gateway unavailable for maintenance")]
    Maintenance,

    /// The gateway could not be reached.
    #[error("connection to {backend_name} failed: {message}")]
    ConnectionFailed {
        backend_name: String,
        message: String,
    },

    /// The response did not match the expected contract.
    #[error("malformed response from {backend_name}: {message}")]
    MalformedResponse {
        backend_name: String,
        message: String,
    },

    /// The gateway rejected the search criteria.
    #[error("search rejected by gateway: {message}")]
    Rejected { message: String },

    /// Any other gateway failure.
    #[error("internal error in {backend_name}: {message}")]
    Internal {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl TransportError {
    /// Returns true for failures that are expected to be transient.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TransportError::Timeout { .. }
                | TransportError::Maintenance
                | TransportError::ConnectionFailed { .. }
        )
    }
}

/// Errors raised while assembling configuration or field registries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Batch size outside the bulk-fetch limit.
    #[error("batch size {size} out of range (1..={max})")]
    InvalidBatchSize { size: usize, max: usize },

    /// A field was declared twice in one registry.
    #[error("duplicate search field '{field}'")]
    DuplicateField { field: String },

    /// A field declaration is internally inconsistent.
    #[error("invalid declaration for field '{field}': {message}")]
    InvalidField { field: String, message: String },

    /// An environment variable held an unparseable value.
    #[error("invalid value '{value}' for {key}")]
    InvalidSetting { key: String, value: String },
}

/// Result type alias for search operations.
pub type SearchResult<T> = Result<T, SearchError>;

/// Result type alias for query-building operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Result type alias for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::MalformedResponse {
            backend_name: "unknown".to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_error_display() {
        let err = QueryError::UnknownField {
            resource: "subscription".to_string(),
            field: "nonexistent_field".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unknown search field 'nonexistent_field' for subscription"
        );
    }

    #[test]
    fn test_usage_errors_are_not_retryable() {
        let err: SearchError = QueryError::InvalidRange {
            field: "price".to_string(),
            message: "min 2 is greater than max 1".to_string(),
        }
        .into();
        assert!(err.is_usage_error());
        assert!(!err.is_retryable());
        assert!(err.transport_error().is_none());
    }

    #[test]
    fn test_transport_retryability() {
        assert!(TransportError::Timeout { timeout_ms: 60_000 }.is_retryable());
        assert!(TransportError::Maintenance.is_retryable());
        assert!(
            !TransportError::Authentication {
                message: "bad key".to_string()
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_page_fetch_error_keeps_source() {
        let err = SearchError::PageFetch {
            page: 2,
            offset: 100,
            end: 150,
            source: TransportError::Maintenance,
        };
        assert!(err.to_string().contains("page 2"));
        assert!(err.is_retryable());
        assert!(!err.is_usage_error());
        assert!(matches!(
            err.transport_error(),
            Some(TransportError::Maintenance)
        ));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidBatchSize { size: 0, max: 50 };
        assert_eq!(err.to_string(), "batch size 0 out of range (1..=50)");
    }
}
