//! Fields Document Access
//!
//! Read-only typed access to a nested JSON fields document, plus the
//! normalisation applied when a persisted document is loaded.
//!
//! Readers are lenient: a missing node, a `null`, or a value of the wrong
//! type reads as "empty". Strictness lives in the validator.

use chrono::NaiveDate;
use ob_onboarding_types::{FieldPath, PathSegment};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Parsed state of a date leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateValue {
    Missing,
    Invalid,
    Valid(NaiveDate),
}

/// Borrowed view over a fields document (or any sub-tree of one).
#[derive(Debug, Clone, Copy)]
pub struct Doc<'a> {
    root: &'a Value,
}

impl<'a> Doc<'a> {
    pub fn new(root: &'a Value) -> Self {
        Self { root }
    }

    pub fn value(&self) -> &'a Value {
        self.root
    }

    /// Node at a structured path.
    pub fn node(&self, path: &FieldPath) -> Option<&'a Value> {
        lookup(self.root, path)
    }

    /// Node at a dotted path.
    pub fn get(&self, dotted: &str) -> Option<&'a Value> {
        self.node(&FieldPath::parse(dotted))
    }

    /// Sub-document at a dotted path; reads as empty when absent.
    pub fn at(&self, dotted: &str) -> Doc<'a> {
        static NULL: Value = Value::Null;
        Doc::new(self.get(dotted).unwrap_or(&NULL))
    }

    /// Trimmed text, `""` when absent or not a string.
    pub fn text(&self, dotted: &str) -> &'a str {
        self.get(dotted)
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or("")
    }

    pub fn has_text(&self, dotted: &str) -> bool {
        !self.text(dotted).is_empty()
    }

    pub fn flag(&self, dotted: &str) -> bool {
        self.get(dotted).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn is_null(&self, dotted: &str) -> bool {
        self.get(dotted).map(Value::is_null).unwrap_or(true)
    }

    /// Numeric leaf as a decimal.
    pub fn decimal(&self, dotted: &str) -> Option<Decimal> {
        self.get(dotted).and_then(to_decimal)
    }

    /// Numeric leaf, zero when absent.
    pub fn amount(&self, dotted: &str) -> Decimal {
        self.decimal(dotted).unwrap_or(Decimal::ZERO)
    }

    /// Whole-number leaf. Accepts integral floats such as `2019.0`.
    pub fn integer(&self, dotted: &str) -> Option<i64> {
        let Some(Value::Number(n)) = self.get(dotted) else {
            return None;
        };
        n.as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
    }

    /// Date leaf: ISO `YYYY-MM-DD`, optionally followed by a time part.
    pub fn date(&self, dotted: &str) -> DateValue {
        match self.get(dotted) {
            None | Some(Value::Null) => DateValue::Missing,
            Some(Value::String(s)) if s.trim().is_empty() => DateValue::Missing,
            Some(Value::String(s)) => parse_date(s.trim())
                .map(DateValue::Valid)
                .unwrap_or(DateValue::Invalid),
            Some(_) => DateValue::Invalid,
        }
    }

    pub fn items(&self, dotted: &str) -> &'a [Value] {
        self.get(dotted)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

fn lookup<'a>(root: &'a Value, path: &FieldPath) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(root, |node, seg| match (seg, node) {
            (PathSegment::Key(k), Value::Object(map)) => map.get(k),
            (PathSegment::Index(i), Value::Array(items)) => items.get(*i),
            _ => None,
        })
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = match raw.find('T') {
        Some(10) => &raw[..10],
        _ => raw,
    };
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// JSON number to decimal. Non-numbers yield `None`.
pub fn to_decimal(value: &Value) -> Option<Decimal> {
    let Value::Number(n) = value else {
        return None;
    };
    n.as_i64()
        .map(Decimal::from)
        .or_else(|| n.as_u64().map(Decimal::from))
        .or_else(|| n.as_f64().and_then(Decimal::from_f64))
}

/// Decimal to a JSON number, integral values staying integers.
pub fn decimal_to_json(value: Decimal) -> Value {
    if value.fract().is_zero() {
        if let Some(i) = value.to_i64() {
            return Value::from(i);
        }
    }
    value
        .to_f64()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

// ============================================================================
// NORMALISATION
// ============================================================================

/// Fill every key present in `defaults` but missing (or `null` where the
/// default is a container) in `stored`. Values already present are kept
/// as they are, including keys unknown to the defaults.
pub fn fill_defaults(defaults: &Value, stored: &Value) -> Value {
    match (defaults, stored) {
        (Value::Object(template), Value::Object(existing)) => {
            let mut merged = existing.clone();
            for (key, default_child) in template {
                let child = match existing.get(key) {
                    Some(v) => fill_defaults(default_child, v),
                    None => default_child.clone(),
                };
                merged.insert(key.clone(), child);
            }
            Value::Object(merged)
        }
        (Value::Object(_), _) => defaults.clone(),
        (Value::Array(_) | Value::Bool(_), Value::Null) => defaults.clone(),
        _ => stored.clone(),
    }
}

/// SHA-256 hex of the canonical (sorted-key) JSON encoding.
pub fn fingerprint(fields: &Value) -> String {
    // serde_json maps are BTreeMap-backed, so the encoding is key-sorted.
    let bytes = serde_json::to_vec(fields).unwrap_or_default();
    hex::encode(Sha256::digest(&bytes))
}
