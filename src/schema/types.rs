//! Schema types

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Structural kind of a schema; a union holds at most one member per kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

/// Inferred JSON Schema node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Schema {
    /// Placeholder for values never observed (items of an empty array)
    Any,
    Null,
    Boolean,
    Integer,
    Number,
    String {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<String>,
    },
    Array {
        items: Box<Schema>,
    },
    Object {
        fields: BTreeMap<String, Field>,
    },
    Union {
        members: Vec<Schema>,
    },
}

/// Object field with its requiredness
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub schema: Schema,
    pub required: bool,
}

impl Field {
    /// A field seen in every sample so far
    pub fn required(schema: Schema) -> Self {
        Self {
            schema,
            required: true,
        }
    }

    /// A field missing from at least one sample
    pub fn optional(schema: Schema) -> Self {
        Self {
            schema,
            required: false,
        }
    }
}

impl Schema {
    /// Plain string without a detected format
    pub fn string() -> Self {
        Schema::String { format: None }
    }

    /// String with a format hint (e.g. "date-time", "uuid")
    pub fn string_with_format(format: &str) -> Self {
        Schema::String {
            format: Some(format.to_string()),
        }
    }

    /// Array of the given item schema
    pub fn array(items: Schema) -> Self {
        Schema::Array {
            items: Box::new(items),
        }
    }

    /// Object from a field map
    pub fn object(fields: BTreeMap<String, Field>) -> Self {
        Schema::Object { fields }
    }

    /// Structural kind, `None` for [`Schema::Any`] and unions
    pub fn kind(&self) -> Option<Kind> {
        match self {
            Schema::Any | Schema::Union { .. } => None,
            Schema::Null => Some(Kind::Null),
            Schema::Boolean => Some(Kind::Boolean),
            Schema::Integer | Schema::Number => Some(Kind::Number),
            Schema::String { .. } => Some(Kind::String),
            Schema::Array { .. } => Some(Kind::Array),
            Schema::Object { .. } => Some(Kind::Object),
        }
    }

    /// Whether values of this schema are always numbers
    pub fn is_numeric(&self) -> bool {
        matches!(self, Schema::Integer | Schema::Number)
    }

    /// Whether this is a union
    pub fn is_union(&self) -> bool {
        matches!(self, Schema::Union { .. })
    }

    /// Get an object field
    pub fn field(&self, name: &str) -> Option<&Field> {
        match self {
            Schema::Object { fields } => fields.get(name),
            _ => None,
        }
    }

    /// Get array items
    pub fn items(&self) -> Option<&Schema> {
        match self {
            Schema::Array { items } => Some(items),
            _ => None,
        }
    }

    /// Union members, or the schema itself as the only member
    pub fn members(&self) -> &[Schema] {
        match self {
            Schema::Union { members } => members,
            other => std::slice::from_ref(other),
        }
    }

    /// JSON Schema `type` keyword for non-composite kinds
    fn type_name(&self) -> Option<&'static str> {
        match self {
            Schema::Any | Schema::Union { .. } => None,
            Schema::Null => Some("null"),
            Schema::Boolean => Some("boolean"),
            Schema::Integer => Some("integer"),
            Schema::Number => Some("number"),
            Schema::String { .. } => Some("string"),
            Schema::Array { .. } => Some("array"),
            Schema::Object { .. } => Some("object"),
        }
    }

    /// Scalars with no keywords besides `type`
    fn is_bare_scalar(&self) -> bool {
        matches!(
            self,
            Schema::Null
                | Schema::Boolean
                | Schema::Integer
                | Schema::Number
                | Schema::String { format: None }
        )
    }

    /// Checks the union invariant recursively: no nested unions, no `Any`
    /// member, at least two members, strictly ascending kinds.
    pub fn is_normalized(&self) -> bool {
        match self {
            Schema::Union { members } => {
                members.len() >= 2
                    && members.iter().all(|m| m.kind().is_some() && m.is_normalized())
                    && members.windows(2).all(|w| w[0].kind() < w[1].kind())
            }
            Schema::Array { items } => items.is_normalized(),
            Schema::Object { fields } => fields.values().all(|f| f.schema.is_normalized()),
            _ => true,
        }
    }

    /// Render as an OpenAPI 3.1 (JSON Schema 2020-12) schema object
    pub fn to_json_schema(&self) -> Value {
        match self {
            Schema::Any => json!({}),
            Schema::String {
                format: Some(format),
            } => json!({ "type": "string", "format": format }),
            Schema::Array { items } => json!({
                "type": "array",
                "items": items.to_json_schema(),
            }),
            Schema::Object { fields } => {
                let mut properties = Map::new();
                let mut required = Vec::new();
                for (name, field) in fields {
                    properties.insert(name.clone(), field.schema.to_json_schema());
                    if field.required {
                        required.push(Value::String(name.clone()));
                    }
                }
                let mut out = Map::new();
                out.insert("type".into(), json!("object"));
                out.insert("properties".into(), Value::Object(properties));
                if !required.is_empty() {
                    out.insert("required".into(), Value::Array(required));
                }
                Value::Object(out)
            }
            Schema::Union { members } => render_union(members),
            scalar => json!({ "type": scalar.type_name() }),
        }
    }
}

fn render_union(members: &[Schema]) -> Value {
    if members.iter().all(Schema::is_bare_scalar) {
        let types: Vec<&str> = members.iter().filter_map(Schema::type_name).collect();
        return json!({ "type": types });
    }

    // T | null collapses into a type array on T's own schema object
    if let [Schema::Null, other] = members {
        let mut rendered = other.to_json_schema();
        if let (Some(obj), Some(name)) = (rendered.as_object_mut(), other.type_name()) {
            obj.insert("type".into(), json!([name, "null"]));
            return rendered;
        }
    }

    json!({ "anyOf": members.iter().map(Schema::to_json_schema).collect::<Vec<_>>() })
}

impl std::fmt::Display for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_json_schema())
    }
}
