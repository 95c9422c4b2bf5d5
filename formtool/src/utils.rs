//! Common utilities and helper functions.
//!
//! Parsing of `--set NAME=VALUE` assignments and writing of submitted values.

use std::{path::Path, str::FromStr};

use anyhow::Context;
use jsonform::{PropertySchema, PropertyType, Value, data::FormValues};
use tokio::fs;

/// A `NAME=VALUE` pair given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub name: String,
    pub raw: String,
}

impl FromStr for Assignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((name, raw)) = s.split_once('=') else {
            return Err(format!("expected NAME=VALUE, got {s:?}"));
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(format!("missing field name in {s:?}"));
        }
        Ok(Self {
            name: name.to_string(),
            raw: raw.to_string(),
        })
    }
}

/// Turn raw text into the value a widget for `property` would produce.
///
/// Widgets hand over strings; checkboxes hand over booleans.
pub fn input_value(property: &PropertySchema, raw: &str) -> Value {
    if property.ty == PropertyType::Boolean {
        match raw.trim() {
            "true" => return Value::Bool(true),
            "false" => return Value::Bool(false),
            _ => {}
        }
    }
    Value::String(raw.to_string())
}

/// Write `values` as pretty JSON to `output`, or to stdout.
///
/// # Errors
///
/// Returns an error if the values cannot be serialized or the file cannot be
/// written.
pub async fn write_values(output: Option<&Path>, values: &FormValues) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(values)?;
    match output {
        Some(path) => {
            fs::write(path, format!("{json}\n"))
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("wrote {} value(s) to {}", values.len(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
