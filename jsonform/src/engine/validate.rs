use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;

use crate::data::{
    DataSchema, FormValues, PropertySchema, PropertyType, SchemaError,
    property::{is_empty, numeric_value},
};

/// Field-scoped validation failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    #[error("this field is required")]
    Required,
    #[error("invalid type: expected {expected}")]
    InvalidType { expected: PropertyType },
    #[error("not an allowed value")]
    NotAllowed,
    #[error("must be at least {min} characters")]
    TooShort { min: usize },
    #[error("must be at most {max} characters")]
    TooLong { max: usize },
    #[error("must be at least {min}")]
    BelowMinimum { min: f64 },
    #[error("must be at most {max}")]
    AboveMaximum { max: f64 },
    #[error("does not match pattern `{pattern}`")]
    PatternMismatch { pattern: String },
    #[error("invalid email address")]
    InvalidEmail,
}

/// Errors keyed by property name. A missing entry means the field is valid.
pub type FormErrors = IndexMap<String, FieldError>;

/// Compiled checks for one property.
#[derive(Debug, Clone)]
pub struct PropertyRules {
    ty: PropertyType,
    required: bool,
    choices: Option<Vec<Value>>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    minimum: Option<f64>,
    maximum: Option<f64>,
    pattern: Option<Regex>,
    email: bool,
}

impl PropertyRules {
    /// Compile the rules of `property`, failing on an invalid `pattern`.
    pub fn compile(name: &str, property: &PropertySchema, required: bool) -> Result<Self, SchemaError> {
        let pattern = property
            .pattern
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|source| SchemaError::InvalidPattern {
                property: name.to_string(),
                source,
            })?;
        Ok(Self::with_pattern(property, required, pattern))
    }

    /// Like [`PropertyRules::compile`], but an invalid pattern is dropped.
    fn lenient(property: &PropertySchema, required: bool) -> Self {
        let pattern = property
            .pattern
            .as_deref()
            .and_then(|p| match Regex::new(p) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!("ignoring invalid pattern {p:?}: {e}");
                    None
                }
            });
        Self::with_pattern(property, required, pattern)
    }

    fn with_pattern(property: &PropertySchema, required: bool, pattern: Option<Regex>) -> Self {
        let choices = property
            .is_closed_choice()
            .then(|| property.allowed_values().into_iter().cloned().collect());
        Self {
            ty: property.ty,
            required,
            choices,
            min_length: property.min_length,
            max_length: property.max_length,
            minimum: property.minimum,
            maximum: property.maximum,
            pattern,
            email: property.format.as_deref() == Some("email"),
        }
    }

    /// Check `value`; the first failing rule wins.
    pub fn check(&self, value: &Value) -> Option<FieldError> {
        if is_empty(value) {
            return self.required.then_some(FieldError::Required);
        }

        if !type_matches(self.ty, value) {
            return Some(FieldError::InvalidType { expected: self.ty });
        }

        if let Some(choices) = &self.choices
            && !choices.iter().any(|choice| choice_matches(choice, value))
        {
            return Some(FieldError::NotAllowed);
        }

        self.check_constraints(value)
    }

    fn check_constraints(&self, value: &Value) -> Option<FieldError> {
        match self.ty {
            PropertyType::String => {
                let s = value.as_str()?;
                let len = s.chars().count();
                if let Some(min) = self.min_length
                    && len < min
                {
                    return Some(FieldError::TooShort { min });
                }
                if let Some(max) = self.max_length
                    && len > max
                {
                    return Some(FieldError::TooLong { max });
                }
                if let Some(re) = &self.pattern
                    && !re.is_match(s)
                {
                    return Some(FieldError::PatternMismatch {
                        pattern: re.as_str().to_string(),
                    });
                }
                if self.email && !looks_like_email(s) {
                    return Some(FieldError::InvalidEmail);
                }
                None
            }
            PropertyType::Number | PropertyType::Integer => {
                let n = numeric_value(value)?;
                if let Some(min) = self.minimum
                    && n < min
                {
                    return Some(FieldError::BelowMinimum { min });
                }
                if let Some(max) = self.maximum
                    && n > max
                {
                    return Some(FieldError::AboveMaximum { max });
                }
                None
            }
            PropertyType::Boolean => None,
        }
    }
}

/// Validate a single value against its property schema.
///
/// Pure: the same `(property, value, is_required)` always gives the same
/// verdict. `None` means valid.
pub fn validate_property(property: &PropertySchema, value: &Value, is_required: bool) -> Option<FieldError> {
    PropertyRules::lenient(property, is_required).check(value)
}

/// Validate every declared property of `schema` against `values`.
pub fn validate_all(schema: &DataSchema, values: &FormValues) -> FormErrors {
    schema
        .properties
        .iter()
        .filter_map(|(name, property)| {
            let value = values.get(name).unwrap_or(&Value::Null);
            validate_property(property, value, schema.is_required(name)).map(|e| (name.clone(), e))
        })
        .collect()
}

/// Rule set compiled from a data schema.
///
/// Validation is schema-driven: every declared property is checked whether
/// or not the current layout renders it.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    rules: IndexMap<String, PropertyRules>,
}

impl Validator {
    pub fn compile(schema: &DataSchema) -> Result<Self, SchemaError> {
        let rules = schema
            .properties
            .iter()
            .map(|(name, property)| {
                PropertyRules::compile(name, property, schema.is_required(name))
                    .map(|rules| (name.clone(), rules))
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { rules })
    }

    /// Validate one property. Undeclared names are never in error.
    pub fn validate_field(&self, name: &str, value: &Value) -> Option<FieldError> {
        self.rules.get(name)?.check(value)
    }

    /// Validate every declared property exactly once.
    pub fn validate_all(&self, values: &FormValues) -> FormErrors {
        self.rules
            .iter()
            .filter_map(|(name, rules)| {
                let value = values.get(name).unwrap_or(&Value::Null);
                rules.check(value).map(|e| (name.clone(), e))
            })
            .collect()
    }

    /// Whole-form structural check, stopping at the first error.
    pub fn is_valid(&self, values: &FormValues) -> bool {
        self.rules
            .iter()
            .all(|(name, rules)| rules.check(values.get(name).unwrap_or(&Value::Null)).is_none())
    }
}

fn type_matches(ty: PropertyType, value: &Value) -> bool {
    match ty {
        PropertyType::String => value.is_string(),
        PropertyType::Number => numeric_value(value).is_some(),
        PropertyType::Integer => numeric_value(value).is_some_and(|n| n.fract() == 0.0),
        PropertyType::Boolean => value.is_boolean(),
    }
}

fn choice_matches(choice: &Value, value: &Value) -> bool {
    if choice == value {
        return true;
    }
    match (choice, value) {
        (Value::Number(_), Value::Number(_) | Value::String(_)) => {
            match (numeric_value(choice), numeric_value(value)) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            }
        }
        _ => false,
    }
}

fn looks_like_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|part| !part.is_empty())
}
