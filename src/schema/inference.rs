//! Schema inference from JSON values

use super::types::{Field, Kind, Schema};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;

/// Schema inferrer with configuration options
#[derive(Debug, Clone)]
pub struct SchemaInferrer {
    /// Detect date-time formats
    detect_datetime: bool,
    /// Detect URI formats
    detect_uri: bool,
    /// Detect email formats
    detect_email: bool,
    /// Detect UUID formats
    detect_uuid: bool,
    /// Maximum depth for nested values
    max_depth: usize,
}

impl Default for SchemaInferrer {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaInferrer {
    /// Create a new schema inferrer with default settings
    pub fn new() -> Self {
        Self {
            detect_datetime: true,
            detect_uri: true,
            detect_email: true,
            detect_uuid: true,
            max_depth: 32,
        }
    }

    /// Enable/disable every string format detector at once
    #[must_use]
    pub fn with_format_detection(mut self, enabled: bool) -> Self {
        self.detect_datetime = enabled;
        self.detect_uri = enabled;
        self.detect_email = enabled;
        self.detect_uuid = enabled;
        self
    }

    /// Set maximum depth for nested values
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Infer schema from a single JSON value
    ///
    /// Object fields are all required; only merging relaxes that.
    pub fn infer(&self, value: &Value) -> Schema {
        let schema = self.infer_at(value, 0);
        debug_assert!(schema.is_normalized(), "inferred a non-normalized schema: {schema:?}");
        schema
    }

    /// Infer one schema covering every value, `None` when there are none
    pub fn infer_all<'a, I>(&self, values: I) -> Option<Schema>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let merged = values
            .into_iter()
            .map(|v| self.infer(v))
            .reduce(|acc, next| merge(&acc, &next));
        debug_assert!(merged.as_ref().map_or(true, Schema::is_normalized));
        merged
    }

    /// Infer a schema for a textual value such as a path segment or query value
    ///
    /// Numeric text is typed as a number, anything else as a string.
    pub fn infer_text(&self, text: &str) -> Schema {
        if text.parse::<i64>().is_ok() || text.parse::<u64>().is_ok() {
            return Schema::Integer;
        }
        if text.parse::<f64>().is_ok_and(f64::is_finite) && looks_decimal(text) {
            return Schema::Number;
        }
        self.infer_string(text)
    }

    fn infer_at(&self, value: &Value, depth: usize) -> Schema {
        if depth >= self.max_depth {
            return Schema::Any;
        }

        match value {
            Value::Null => Schema::Null,
            Value::Bool(_) => Schema::Boolean,
            Value::Number(n) => {
                if n.is_i64() || n.is_u64() {
                    Schema::Integer
                } else {
                    Schema::Number
                }
            }
            Value::String(s) => self.infer_string(s),
            Value::Array(arr) => self.infer_array(arr, depth),
            Value::Object(map) => {
                let fields = map
                    .iter()
                    .map(|(key, val)| (key.clone(), Field::required(self.infer_at(val, depth + 1))))
                    .collect();
                Schema::object(fields)
            }
        }
    }

    /// Infer string schema, attaching a detected format
    fn infer_string(&self, s: &str) -> Schema {
        if self.detect_datetime && is_datetime(s) {
            Schema::string_with_format("date-time")
        } else if self.detect_datetime && is_date(s) {
            Schema::string_with_format("date")
        } else if self.detect_uri && is_uri(s) {
            Schema::string_with_format("uri")
        } else if self.detect_email && is_email(s) {
            Schema::string_with_format("email")
        } else if self.detect_uuid && is_uuid(s) {
            Schema::string_with_format("uuid")
        } else {
            Schema::string()
        }
    }

    /// Items are the merge of every element, not just the first
    fn infer_array(&self, arr: &[Value], depth: usize) -> Schema {
        let items = arr
            .iter()
            .map(|item| self.infer_at(item, depth + 1))
            .reduce(|acc, next| merge(&acc, &next))
            .unwrap_or(Schema::Any);
        Schema::array(items)
    }
}

/// Merge two schemas into one accepting both value populations
///
/// Commutative and associative: folding samples in any order yields the
/// same schema. `Any` is the identity.
pub fn merge_schemas(a: &Schema, b: &Schema) -> Schema {
    let merged = merge(a, b);
    debug_assert!(merged.is_normalized(), "merge produced a non-normalized schema: {merged:?}");
    merged
}

/// Unchecked merge used for recursion; callers assert normalization once
fn merge(a: &Schema, b: &Schema) -> Schema {
    match (a, b) {
        (Schema::Any, other) | (other, Schema::Any) => other.clone(),
        _ => {
            let mut members: Vec<Schema> = Vec::new();
            for member in a.members().iter().chain(b.members()) {
                absorb(&mut members, member);
            }
            members.sort_by_key(Schema::kind);
            if members.len() == 1 {
                members.remove(0)
            } else {
                Schema::Union { members }
            }
        }
    }
}

/// Fold a non-union member into a per-kind member list
fn absorb(members: &mut Vec<Schema>, member: &Schema) {
    if matches!(member, Schema::Any) {
        return;
    }
    match members.iter_mut().find(|m| m.kind() == member.kind()) {
        Some(existing) => *existing = merge_same_kind(existing, member),
        None => members.push(member.clone()),
    }
}

fn merge_same_kind(a: &Schema, b: &Schema) -> Schema {
    debug_assert_eq!(a.kind(), b.kind());
    match (a, b) {
        (Schema::Integer, Schema::Integer) => Schema::Integer,
        (Schema::String { format: fa }, Schema::String { format: fb }) => Schema::String {
            // Keep a format only when every sample agreed on it
            format: if fa == fb { fa.clone() } else { None },
        },
        (Schema::Array { items: ia }, Schema::Array { items: ib }) => {
            Schema::array(merge(ia, ib))
        }
        (Schema::Object { fields: fa }, Schema::Object { fields: fb }) => {
            Schema::object(merge_fields(fa, fb))
        }
        _ if a.kind() == Some(Kind::Number) => Schema::Number,
        _ => a.clone(),
    }
}

/// A field stays required only if required on both sides
fn merge_fields(
    a: &BTreeMap<String, Field>,
    b: &BTreeMap<String, Field>,
) -> BTreeMap<String, Field> {
    let mut merged = BTreeMap::new();
    for (key, a_field) in a {
        let field = match b.get(key) {
            Some(b_field) => Field {
                schema: merge(&a_field.schema, &b_field.schema),
                required: a_field.required && b_field.required,
            },
            None => Field::optional(a_field.schema.clone()),
        };
        merged.insert(key.clone(), field);
    }
    for (key, b_field) in b {
        if !a.contains_key(key) {
            merged.insert(key.clone(), Field::optional(b_field.schema.clone()));
        }
    }
    merged
}

// Format detection helpers

static DATETIME_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}").ok());

static DATE_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").ok());

static UUID_RE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .ok()
});

fn regex_matches(re: &Lazy<Option<Regex>>, s: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(s))
}

fn is_datetime(s: &str) -> bool {
    // 2024-01-15T10:30:00Z, 2024-01-15 10:30:00, 2024-01-15T10:30:00.123+00:00
    regex_matches(&DATETIME_RE, s)
}

fn is_date(s: &str) -> bool {
    regex_matches(&DATE_RE, s)
}

fn is_uri(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

fn is_email(s: &str) -> bool {
    // Simple email check - contains @ and .
    s.contains('@') && s.contains('.') && s.len() > 5 && !s.contains(char::is_whitespace)
}

pub(crate) fn is_uuid(s: &str) -> bool {
    regex_matches(&UUID_RE, s)
}

/// Rejects "inf", "NaN" and friends that `f64::from_str` accepts
fn looks_decimal(s: &str) -> bool {
    s.bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'))
}
