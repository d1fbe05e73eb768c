//! Resource identifier type.
//!
//! This module defines the [`ResourceId`] type, the opaque identifier the
//! gateway returns from a search and accepts in a bulk fetch.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque, stable gateway resource identifier.
///
/// Ids are compared byte-for-byte. The gateway never reuses an id for a
/// different resource, which is what makes membership checks against an
/// unhydrated id list meaningful.
///
/// # Examples
///
/// ```
/// use gateway_search::types::ResourceId;
///
/// let id = ResourceId::new("sub_8kq2");
/// assert_eq!(id.as_str(), "sub_8kq2");
/// assert_eq!(id, "sub_8kq2");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    /// Creates a new resource id from the given string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the id and returns the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceId({})", self.0)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ResourceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ResourceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ResourceId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ResourceId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_display_and_debug() {
        let id = ResourceId::new("cus_123");
        assert_eq!(id.to_string(), "cus_123");
        assert_eq!(format!("{:?}", id), "ResourceId(cus_123)");
    }

    #[test]
    fn test_borrow_lookup() {
        let ids: HashSet<ResourceId> = ["a", "b"].into_iter().map(ResourceId::from).collect();
        assert!(ids.contains("a"));
        assert!(!ids.contains("c"));
    }

    #[test]
    fn test_serde_transparent() {
        let id = ResourceId::new("dp_1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"dp_1\"");
        let back: ResourceId = serde_json::from_str("\"dp_1\"").unwrap();
        assert_eq!(back, id);
    }
}
