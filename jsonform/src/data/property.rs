use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::data::schema::SchemaError;

/// Scalar type declared by a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "RawType")]
pub enum PropertyType {
    /// Free text.
    #[default]
    String,
    /// Any finite number.
    Number,
    /// Whole number.
    Integer,
    /// `true` / `false`.
    Boolean,
}

impl PropertyType {
    /// Whether values of this type are coerced from strings on submit.
    pub fn is_numeric(self) -> bool {
        matches!(self, PropertyType::Number | PropertyType::Integer)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PropertyType::String => "string",
            PropertyType::Number => "number",
            PropertyType::Integer => "integer",
            PropertyType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(PropertyType::String),
            "number" => Ok(PropertyType::Number),
            "integer" => Ok(PropertyType::Integer),
            "boolean" => Ok(PropertyType::Boolean),
            other => Err(SchemaError::UnsupportedType(other.to_string())),
        }
    }
}

/// `type` as written in a schema: a single name or a list such as
/// `["string", "null"]`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawType {
    One(String),
    Many(Vec<String>),
}

impl TryFrom<RawType> for PropertyType {
    type Error = SchemaError;

    fn try_from(raw: RawType) -> Result<Self, Self::Error> {
        let name = match raw {
            RawType::One(name) => name,
            RawType::Many(names) => names
                .into_iter()
                .find(|n| n != "null")
                .unwrap_or_else(|| "null".to_string()),
        };
        name.parse()
    }
}

/// One labelled entry of a `oneOf` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// Stored value.
    #[serde(alias = "const")]
    pub value: Value,
    /// Display label; the value itself is shown when absent.
    #[serde(default, alias = "title", skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Choice {
    pub fn new(value: impl Into<Value>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: Some(label.into()),
        }
    }

    /// Label to display for this choice.
    pub fn label(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => display_value(&self.value),
        }
    }
}

/// Schema of a single named scalar property.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySchema {
    /// Declared scalar type. Defaults to `string` when the schema omits it.
    #[serde(rename = "type", default)]
    pub ty: PropertyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Closed list of allowed values.
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    /// Closed list of allowed values with labels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<Choice>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl PropertySchema {
    pub fn new(ty: PropertyType) -> Self {
        Self {
            ty,
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_enum<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_one_of(mut self, choices: Vec<Choice>) -> Self {
        self.one_of = Some(choices);
        self
    }

    /// `enum` or `oneOf` makes the property a closed-choice field regardless
    /// of its declared type.
    pub fn is_closed_choice(&self) -> bool {
        self.enum_values.is_some() || self.one_of.is_some()
    }

    /// Allowed values of a closed-choice property, `oneOf` first.
    pub fn allowed_values(&self) -> Vec<&Value> {
        let mut allowed = Vec::new();
        if let Some(one_of) = &self.one_of {
            allowed.extend(one_of.iter().map(|c| &c.value));
        }
        if let Some(values) = &self.enum_values {
            allowed.extend(values.iter());
        }
        allowed
    }

    /// Choices offered by a select widget.
    pub fn choices(&self) -> Vec<Choice> {
        if let Some(one_of) = &self.one_of {
            return one_of.clone();
        }
        self.enum_values
            .iter()
            .flatten()
            .map(|value| Choice {
                value: value.clone(),
                label: None,
            })
            .collect()
    }

    /// Value used when neither caller data nor a schema default is present.
    pub fn empty_value(&self) -> Value {
        match self.ty {
            PropertyType::Boolean => Value::Bool(false),
            PropertyType::Number | PropertyType::Integer => Value::Null,
            PropertyType::String => Value::String(String::new()),
        }
    }

    /// Seed value: caller data, then schema default, then the empty value.
    pub fn initial_value(&self, data: Option<&Value>) -> Value {
        data.or(self.default.as_ref())
            .cloned()
            .unwrap_or_else(|| self.empty_value())
    }
}

/// `""` and `null` count as "no value".
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Parse user input as a finite number.
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Numeric reading of a value, accepting numeric strings.
pub fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

/// Human-readable form of a value: strings without quotes, null as empty.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
