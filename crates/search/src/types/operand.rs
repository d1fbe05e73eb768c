//! Predicate operands.
//!
//! Operands arrive from callers as strings, decimals or timestamps. Range
//! predicates coerce them into a [`RangeValue`]; binary floating point is
//! deliberately not convertible so amounts never pick up rounding error.

use std::cmp::Ordering;
use std::fmt;

use chrono::{
    DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryResult};

/// A caller-supplied predicate operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// Free text; parsed on demand for range fields.
    Text(String),
    /// An exact decimal amount.
    Amount(Decimal),
    /// An instant, already normalized to UTC.
    Timestamp(DateTime<Utc>),
}

impl Operand {
    /// Returns the operand's canonical string form.
    ///
    /// Amounts are normalized (`13.00` becomes `13`) and timestamps are
    /// rendered as RFC 3339 UTC.
    pub fn to_text(&self) -> String {
        match self {
            Operand::Text(s) => s.clone(),
            Operand::Amount(d) => format_amount(d),
            Operand::Timestamp(t) => format_timestamp(t),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<&str> for Operand {
    fn from(s: &str) -> Self {
        Operand::Text(s.to_string())
    }
}

impl From<String> for Operand {
    fn from(s: String) -> Self {
        Operand::Text(s)
    }
}

impl From<&String> for Operand {
    fn from(s: &String) -> Self {
        Operand::Text(s.clone())
    }
}

impl From<bool> for Operand {
    fn from(b: bool) -> Self {
        Operand::Text(b.to_string())
    }
}

impl From<Decimal> for Operand {
    fn from(d: Decimal) -> Self {
        Operand::Amount(d)
    }
}

impl From<i32> for Operand {
    fn from(n: i32) -> Self {
        Operand::Amount(Decimal::from(n))
    }
}

impl From<i64> for Operand {
    fn from(n: i64) -> Self {
        Operand::Amount(Decimal::from(n))
    }
}

impl From<u32> for Operand {
    fn from(n: u32) -> Self {
        Operand::Amount(Decimal::from(n))
    }
}

impl From<u64> for Operand {
    fn from(n: u64) -> Self {
        Operand::Amount(Decimal::from(n))
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Operand {
    fn from(t: DateTime<Tz>) -> Self {
        Operand::Timestamp(t.with_timezone(&Utc))
    }
}

/// Naive timestamps are interpreted as UTC.
impl From<NaiveDateTime> for Operand {
    fn from(t: NaiveDateTime) -> Self {
        Operand::Timestamp(t.and_utc())
    }
}

/// Dates become midnight UTC.
impl From<NaiveDate> for Operand {
    fn from(d: NaiveDate) -> Self {
        Operand::Timestamp(d.and_time(NaiveTime::MIN).and_utc())
    }
}

/// The value type a range field compares on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeValueKind {
    /// Decimal amounts and counts.
    Amount,
    /// Instants compared in UTC.
    Timestamp,
}

impl fmt::Display for RangeValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeValueKind::Amount => write!(f, "amount"),
            RangeValueKind::Timestamp => write!(f, "timestamp"),
        }
    }
}

/// A coerced range bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum RangeValue {
    /// A decimal amount.
    Amount(Decimal),
    /// A UTC instant.
    Timestamp(DateTime<Utc>),
}

impl RangeValue {
    /// Coerces an operand for the named field.
    ///
    /// When `expected` is `None` text is tried as a decimal first and then as
    /// a timestamp.
    pub fn coerce(
        field: &str,
        operand: Operand,
        expected: Option<RangeValueKind>,
    ) -> QueryResult<Self> {
        let invalid = |operand: &Operand, message: String| QueryError::InvalidOperand {
            field: field.to_string(),
            value: operand.to_text(),
            message,
        };

        match (operand, expected) {
            (Operand::Amount(d), None | Some(RangeValueKind::Amount)) => Ok(RangeValue::Amount(d)),
            (Operand::Timestamp(t), None | Some(RangeValueKind::Timestamp)) => {
                Ok(RangeValue::Timestamp(t))
            }
            (Operand::Text(s), Some(RangeValueKind::Amount)) => parse_amount(&s)
                .map(RangeValue::Amount)
                .ok_or_else(|| invalid(&Operand::Text(s.clone()), "expected a decimal".into())),
            (Operand::Text(s), Some(RangeValueKind::Timestamp)) => parse_timestamp(&s)
                .map(RangeValue::Timestamp)
                .ok_or_else(|| invalid(&Operand::Text(s.clone()), "expected a timestamp".into())),
            (Operand::Text(s), None) => parse_amount(&s)
                .map(RangeValue::Amount)
                .or_else(|| parse_timestamp(&s).map(RangeValue::Timestamp))
                .ok_or_else(|| {
                    invalid(
                        &Operand::Text(s.clone()),
                        "expected a decimal or a timestamp".into(),
                    )
                }),
            (other, Some(kind)) => {
                let message = format!("expected {}", kind);
                Err(invalid(&other, message))
            }
        }
    }

    /// Returns the kind of this value.
    pub fn kind(&self) -> RangeValueKind {
        match self {
            RangeValue::Amount(_) => RangeValueKind::Amount,
            RangeValue::Timestamp(_) => RangeValueKind::Timestamp,
        }
    }

    /// Compares two values of the same kind; `None` across kinds.
    pub fn compare(&self, other: &RangeValue) -> Option<Ordering> {
        match (self, other) {
            (RangeValue::Amount(a), RangeValue::Amount(b)) => Some(a.cmp(b)),
            (RangeValue::Timestamp(a), RangeValue::Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Returns the wire encoding.
    pub fn to_wire(&self) -> String {
        match self {
            RangeValue::Amount(d) => format_amount(d),
            RangeValue::Timestamp(t) => format_timestamp(t),
        }
    }
}

impl fmt::Display for RangeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wire())
    }
}

/// Parses a decimal amount, rejecting anything with stray characters.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    s.trim().parse::<Decimal>().ok()
}

/// Parses a timestamp into UTC.
///
/// Accepts RFC 3339 with any offset, naive `YYYY-MM-DDTHH:MM:SS` or
/// `YYYY-MM-DD HH:MM:SS` (taken as UTC), and bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, format) {
            return Some(t.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
}

fn format_amount(d: &Decimal) -> String {
    d.normalize().to_string()
}

fn format_timestamp(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}
