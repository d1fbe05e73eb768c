//! Standard field catalogs for the built-in resource kinds.
//!
//! These mirror the gateway's advanced search surface field for field.
//! Custom resource kinds start with an empty catalog and register their own
//! fields.

use crate::types::ResourceKind;

use super::registry::{FieldDescriptor, FieldRegistry};

/// Subscription status values.
pub const SUBSCRIPTION_STATUSES: &[&str] = &["Active", "Canceled", "Expired", "PastDue", "Pending"];

/// Transaction status values.
pub const TRANSACTION_STATUSES: &[&str] = &[
    "authorization_expired",
    "authorized",
    "authorizing",
    "settlement_pending",
    "settlement_declined",
    "failed",
    "gateway_rejected",
    "processor_declined",
    "settled",
    "settling",
    "submitted_for_settlement",
    "voided",
];

/// Dispute status values.
pub const DISPUTE_STATUSES: &[&str] = &[
    "accepted",
    "auto_accepted",
    "disputed",
    "expired",
    "lost",
    "open",
    "under_review",
    "won",
];

/// Verification status values.
pub const VERIFICATION_STATUSES: &[&str] = &[
    "failed",
    "gateway_rejected",
    "processor_declined",
    "verified",
];

/// Card brands accepted by card-type filters.
pub const CARD_TYPES: &[&str] = &[
    "American Express",
    "Carte Blanche",
    "China UnionPay",
    "Discover",
    "Diners Club",
    "Elo",
    "JCB",
    "Laser",
    "Maestro",
    "MasterCard",
    "Solo",
    "Switch",
    "UK Maestro",
    "Visa",
    "Unknown",
];

impl ResourceKind {
    /// Returns the standard searchable fields for this kind.
    pub fn standard_fields(&self) -> Vec<FieldDescriptor> {
        match self {
            ResourceKind::Customer => customer_fields(),
            ResourceKind::Subscription => subscription_fields(),
            ResourceKind::Transaction => transaction_fields(),
            ResourceKind::Dispute => dispute_fields(),
            ResourceKind::CreditCardVerification => verification_fields(),
            ResourceKind::PaymentMethod => payment_method_fields(),
            ResourceKind::Custom(_) => Vec::new(),
        }
    }

    /// Builds the standard field registry for this kind.
    ///
    /// Catalog entries are fixed at compile time, so they are inserted
    /// without re-validation; custom registries go through
    /// [`FieldRegistry::from_fields`].
    pub fn registry(&self) -> FieldRegistry {
        FieldRegistry::from_catalog(self.clone(), self.standard_fields())
    }
}

fn texts(names: &[&str]) -> impl Iterator<Item = FieldDescriptor> {
    names.iter().map(|name| FieldDescriptor::text(*name))
}

fn customer_fields() -> Vec<FieldDescriptor> {
    let mut fields: Vec<FieldDescriptor> = texts(&[
        "address_country_name",
        "address_extended_address",
        "address_first_name",
        "address_last_name",
        "address_locality",
        "address_postal_code",
        "address_region",
        "address_street_address",
        "cardholder_name",
        "company",
        "email",
        "fax",
        "first_name",
        "id",
        "last_name",
        "payment_method_token",
        "paypal_account_email",
        "phone",
        "website",
    ])
    .collect();

    fields.extend([
        FieldDescriptor::equality("credit_card_expiration_date"),
        FieldDescriptor::partial_match("credit_card_number"),
        FieldDescriptor::multi_value("ids"),
        FieldDescriptor::multi_value("payment_method_token_with_duplicates"),
        FieldDescriptor::timestamp_range("created_at"),
    ]);
    fields
}

fn subscription_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::text("id"),
        FieldDescriptor::text("transaction_id"),
        FieldDescriptor::multi_value_or_text("plan_id"),
        FieldDescriptor::multi_value("status").with_allowed_values(SUBSCRIPTION_STATUSES.iter().copied()),
        FieldDescriptor::multi_value("merchant_account_id"),
        FieldDescriptor::multi_value("ids"),
        FieldDescriptor::multi_value("in_trial_period").with_allowed_values(["true", "false"]),
        FieldDescriptor::amount_range("price"),
        FieldDescriptor::amount_range("days_past_due"),
        FieldDescriptor::amount_range("billing_cycles_remaining"),
        FieldDescriptor::timestamp_range("next_billing_date"),
        FieldDescriptor::timestamp_range("created_at"),
    ]
}

fn transaction_fields() -> Vec<FieldDescriptor> {
    let mut fields: Vec<FieldDescriptor> = texts(&[
        "billing_company",
        "billing_country_name",
        "billing_first_name",
        "billing_last_name",
        "billing_locality",
        "billing_postal_code",
        "billing_region",
        "billing_street_address",
        "credit_card_cardholder_name",
        "currency",
        "customer_company",
        "customer_email",
        "customer_first_name",
        "customer_id",
        "customer_last_name",
        "customer_phone",
        "id",
        "order_id",
        "payment_method_token",
        "paypal_payer_email",
        "processor_authorization_code",
        "settlement_batch_id",
        "shipping_first_name",
        "shipping_last_name",
        "shipping_postal_code",
    ])
    .collect();

    fields.extend([
        FieldDescriptor::equality("credit_card_expiration_date"),
        FieldDescriptor::partial_match("credit_card_number"),
        FieldDescriptor::multi_value("created_using").with_allowed_values(["full_information", "token"]),
        FieldDescriptor::multi_value("credit_card_card_type").with_allowed_values(CARD_TYPES.iter().copied()),
        FieldDescriptor::multi_value("credit_card_customer_location")
            .with_allowed_values(["us", "international"]),
        FieldDescriptor::multi_value("ids"),
        FieldDescriptor::multi_value("merchant_account_id"),
        FieldDescriptor::multi_value("payment_instrument_type"),
        FieldDescriptor::multi_value("source"),
        FieldDescriptor::multi_value("status").with_allowed_values(TRANSACTION_STATUSES.iter().copied()),
        FieldDescriptor::multi_value("type").with_allowed_values(["sale", "credit"]),
        FieldDescriptor::amount_range("amount"),
        FieldDescriptor::timestamp_range("created_at"),
        FieldDescriptor::timestamp_range("authorized_at"),
        FieldDescriptor::timestamp_range("settled_at"),
        FieldDescriptor::timestamp_range("submitted_for_settlement_at"),
        FieldDescriptor::timestamp_range("voided_at"),
        FieldDescriptor::timestamp_range("disbursement_date"),
        FieldDescriptor::timestamp_range("dispute_date"),
    ]);
    fields
}

fn dispute_fields() -> Vec<FieldDescriptor> {
    let mut fields: Vec<FieldDescriptor> = texts(&[
        "case_number",
        "customer_id",
        "id",
        "reference_number",
        "transaction_id",
    ])
    .collect();

    fields.extend([
        FieldDescriptor::multi_value("kind")
            .with_allowed_values(["chargeback", "pre_arbitration", "retrieval"]),
        FieldDescriptor::multi_value("merchant_account_id"),
        FieldDescriptor::multi_value("reason"),
        FieldDescriptor::multi_value("reason_code"),
        FieldDescriptor::multi_value("status").with_allowed_values(DISPUTE_STATUSES.iter().copied()),
        FieldDescriptor::multi_value("transaction_source"),
        FieldDescriptor::amount_range("amount_disputed"),
        FieldDescriptor::amount_range("amount_won"),
        FieldDescriptor::timestamp_range("created_at"),
        FieldDescriptor::timestamp_range("disbursement_date"),
        FieldDescriptor::timestamp_range("effective_date"),
        FieldDescriptor::timestamp_range("received_date"),
        FieldDescriptor::timestamp_range("reply_by_date"),
    ]);
    fields
}

fn verification_fields() -> Vec<FieldDescriptor> {
    let mut fields: Vec<FieldDescriptor> = texts(&[
        "billing_address_details_postal_code",
        "credit_card_cardholder_name",
        "customer_email",
        "customer_id",
        "id",
        "payment_method_token",
    ])
    .collect();

    fields.extend([
        FieldDescriptor::equality("credit_card_expiration_date"),
        FieldDescriptor::partial_match("credit_card_number"),
        FieldDescriptor::multi_value("credit_card_card_type").with_allowed_values(CARD_TYPES.iter().copied()),
        FieldDescriptor::multi_value("ids"),
        FieldDescriptor::multi_value("status").with_allowed_values(VERIFICATION_STATUSES.iter().copied()),
        FieldDescriptor::timestamp_range("created_at"),
    ]);
    fields
}

fn payment_method_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::text("token"),
        FieldDescriptor::text("customer_id"),
        FieldDescriptor::text("cardholder_name"),
        FieldDescriptor::text("email"),
        FieldDescriptor::partial_match("last_4"),
        FieldDescriptor::multi_value("payment_instrument_type"),
        FieldDescriptor::multi_value("card_type").with_allowed_values(CARD_TYPES.iter().copied()),
        FieldDescriptor::timestamp_range("created_at"),
    ]
}
