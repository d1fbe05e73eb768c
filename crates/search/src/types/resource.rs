//! Gateway resource kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The searchable resource types exposed by the gateway.
///
/// The wire name is the snake_case discriminator sent with every search and
/// bulk-fetch request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ResourceKind {
    /// Vault customers.
    Customer,
    /// Recurring billing subscriptions.
    Subscription,
    /// Sales, credits and their settlement state.
    Transaction,
    /// Chargebacks and retrievals.
    Dispute,
    /// Card verification attempts.
    CreditCardVerification,
    /// Vaulted payment methods across all method types.
    PaymentMethod,
    /// Any other resource type, identified by its wire name.
    Custom(String),
}

impl ResourceKind {
    /// Returns the wire discriminator.
    pub fn as_str(&self) -> &str {
        match self {
            ResourceKind::Customer => "customer",
            ResourceKind::Subscription => "subscription",
            ResourceKind::Transaction => "transaction",
            ResourceKind::Dispute => "dispute",
            ResourceKind::CreditCardVerification => "credit_card_verification",
            ResourceKind::PaymentMethod => "payment_method",
            ResourceKind::Custom(name) => name,
        }
    }

    /// Returns true for the built-in kinds that ship a field catalog.
    pub fn is_builtin(&self) -> bool {
        !matches!(self, ResourceKind::Custom(_))
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "customer" => ResourceKind::Customer,
            "subscription" => ResourceKind::Subscription,
            "transaction" => ResourceKind::Transaction,
            "dispute" => ResourceKind::Dispute,
            "credit_card_verification" => ResourceKind::CreditCardVerification,
            "payment_method" => ResourceKind::PaymentMethod,
            other => ResourceKind::Custom(other.to_string()),
        })
    }
}

impl From<String> for ResourceKind {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl From<&str> for ResourceKind {
    fn from(s: &str) -> Self {
        ResourceKind::from(s.to_string())
    }
}

impl From<ResourceKind> for String {
    fn from(kind: ResourceKind) -> Self {
        kind.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        assert_eq!(ResourceKind::Subscription.to_string(), "subscription");
        assert_eq!(
            ResourceKind::CreditCardVerification.as_str(),
            "credit_card_verification"
        );
    }

    #[test]
    fn test_parse_roundtrip_and_custom() {
        assert_eq!(ResourceKind::from("dispute"), ResourceKind::Dispute);
        let custom = ResourceKind::from("merchant_account");
        assert_eq!(custom, ResourceKind::Custom("merchant_account".to_string()));
        assert!(!custom.is_builtin());
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&ResourceKind::Customer).unwrap();
        assert_eq!(json, "\"customer\"");
        let back: ResourceKind = serde_json::from_str("\"payment_method\"").unwrap();
        assert_eq!(back, ResourceKind::PaymentMethod);
    }
}
