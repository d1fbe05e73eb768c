//! Search configuration.
//!
//! [`SearchConfig`] is injected into a [`SearchClient`](crate::core::SearchClient)
//! and copied into every collection it executes. Nothing in this crate reads
//! global state; [`SearchConfig::from_env`] is a convenience for hosts.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GATEWAY_SEARCH_BATCH_SIZE` | 50 | Ids per bulk fetch (1..=50) |
//! | `GATEWAY_SEARCH_MISSING_RECORDS` | report | `report` or `skip` |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Bulk-fetch limit of the gateway; also the default batch size.
pub const MAX_BATCH_SIZE: usize = 50;

/// What a collection does when a listed id can no longer be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MissingRecordPolicy {
    /// Yield a [`SearchHit::Missing`](crate::core::SearchHit::Missing) marker.
    #[default]
    Report,
    /// Log and continue with the next id.
    Skip,
}

impl fmt::Display for MissingRecordPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingRecordPolicy::Report => write!(f, "report"),
            MissingRecordPolicy::Skip => write!(f, "skip"),
        }
    }
}

impl FromStr for MissingRecordPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "report" => Ok(MissingRecordPolicy::Report),
            "skip" => Ok(MissingRecordPolicy::Skip),
            _ => Err(format!("unknown missing record policy: {}", s)),
        }
    }
}

/// Configuration for search execution and pagination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Number of ids submitted per bulk fetch.
    pub batch_size: usize,

    /// Handling of ids that disappear between search and fetch.
    pub missing_records: MissingRecordPolicy,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            batch_size: MAX_BATCH_SIZE,
            missing_records: MissingRecordPolicy::Report,
        }
    }
}

impl SearchConfig {
    /// Creates a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads overrides from the environment, falling back to defaults.
    ///
    /// Unparseable values are reported rather than ignored.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(value) = std::env::var("GATEWAY_SEARCH_BATCH_SIZE") {
            config.batch_size = value.trim().parse().map_err(|_| ConfigError::InvalidSetting {
                key: "GATEWAY_SEARCH_BATCH_SIZE".to_string(),
                value: value.clone(),
            })?;
        }

        if let Ok(value) = std::env::var("GATEWAY_SEARCH_MISSING_RECORDS") {
            config.missing_records =
                value.trim().parse().map_err(|_| ConfigError::InvalidSetting {
                    key: "GATEWAY_SEARCH_MISSING_RECORDS".to_string(),
                    value: value.clone(),
                })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Sets the batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Sets the missing record policy.
    pub fn with_missing_records(mut self, policy: MissingRecordPolicy) -> Self {
        self.missing_records = policy;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(ConfigError::InvalidBatchSize {
                size: self.batch_size,
                max: MAX_BATCH_SIZE,
            });
        }
        Ok(())
    }

    /// Creates a configuration suitable for testing.
    ///
    /// Small batches make page boundaries visible with few records.
    pub fn for_testing() -> Self {
        Self {
            batch_size: 5,
            missing_records: MissingRecordPolicy::Report,
        }
    }
}
