use indexmap::{IndexMap, IndexSet};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::data::property::PropertySchema;

/// Errors raised while reading or compiling a data schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The property declares a type outside string/number/integer/boolean.
    #[error("unsupported property type `{0}`")]
    UnsupportedType(String),
    /// A `pattern` keyword is not a valid regular expression.
    #[error("invalid pattern for `{property}`: {source}")]
    InvalidPattern {
        property: String,
        #[source]
        source: regex::Error,
    },
    /// The document has the wrong shape at `path`.
    #[error("type mismatch at `{path}`: expected {expected}, got {actual}")]
    TypeMismatch {
        path: String,
        expected: String,
        actual: String,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Flat data schema: named scalar properties plus the required set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Properties in declaration order.
    #[serde(default)]
    pub properties: IndexMap<String, PropertySchema>,
    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    pub required: IndexSet<String>,
}

impl DataSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, property: PropertySchema) -> Self {
        self.properties.insert(name.into(), property);
        self
    }

    pub fn with_required(mut self, name: impl Into<String>) -> Self {
        self.required.insert(name.into());
        self
    }

    /// Parse a schema document.
    ///
    /// Every property must be a flat scalar. Required names that are not
    /// declared are dropped.
    pub fn from_value(value: &Value) -> Result<Self, SchemaError> {
        check_object_root(value)?;
        let mut schema: DataSchema = serde_json::from_value(value.clone())?;
        schema.normalize();
        Ok(schema)
    }

    /// Derive a flat schema from a Rust type.
    ///
    /// Fields that do not map onto a scalar property (nested structs,
    /// arrays, referenced definitions) are skipped.
    pub fn for_type<T: JsonSchema>() -> Result<Self, SchemaError> {
        let root = schemars::schema_for!(T);
        let value = serde_json::to_value(&root)?;
        check_object_root(&value)?;

        let mut schema = DataSchema {
            title: value.get("title").and_then(Value::as_str).map(str::to_string),
            description: value
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
            ..Default::default()
        };

        if let Some(Value::Object(properties)) = value.get("properties") {
            for (name, raw) in properties {
                if is_compound(raw) {
                    warn!("skipping non-scalar property `{name}`");
                    continue;
                }
                match serde_json::from_value::<PropertySchema>(raw.clone()) {
                    Ok(property) => {
                        schema.properties.insert(name.clone(), property);
                    }
                    Err(e) => warn!("skipping property `{name}`: {e}"),
                }
            }
        }

        if let Some(Value::Array(required)) = value.get("required") {
            schema
                .required
                .extend(required.iter().filter_map(Value::as_str).map(str::to_string));
        }

        schema.normalize();
        Ok(schema)
    }

    pub fn property(&self, name: &str) -> Option<&PropertySchema> {
        self.properties.get(name)
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.contains(name)
    }

    /// Drop required names that are not declared.
    pub(crate) fn normalize(&mut self) {
        let properties = &self.properties;
        self.required.retain(|name| {
            let declared = properties.contains_key(name);
            if !declared {
                debug!("required property `{name}` is not declared, ignoring");
            }
            declared
        });
    }
}

fn check_object_root(value: &Value) -> Result<(), SchemaError> {
    if !value.is_object() {
        return Err(SchemaError::TypeMismatch {
            path: "#".to_string(),
            expected: "object".to_string(),
            actual: value.to_string(),
        });
    }
    match value.get("type") {
        None => Ok(()),
        Some(Value::String(t)) if t == "object" => Ok(()),
        Some(other) => Err(SchemaError::TypeMismatch {
            path: "#/type".to_string(),
            expected: "\"object\"".to_string(),
            actual: other.to_string(),
        }),
    }
}

fn is_compound(raw: &Value) -> bool {
    const COMPOUND_KEYS: [&str; 6] = ["$ref", "properties", "items", "allOf", "anyOf", "if"];
    COMPOUND_KEYS.iter().any(|k| raw.get(k).is_some())
}
