//! Form description data model.
//!
//! This module holds the declarative inputs of the form engine:
//!
//! - [`schema`] - The flat data schema (properties, required set)
//! - [`property`] - Scalar property schemas and value helpers
//! - [`layout`] - The layout tree (layouts, controls, labels)
//! - [`template`] - Complete form templates loaded from JSON or TOML

/// Flat data schema and schema errors.
pub mod schema;

/// Scalar property schema and value helpers.
pub mod property;

/// Layout tree read from the UI schema.
pub mod layout;

/// Form templates combining data schema, layout and initial data.
pub mod template;

use indexmap::IndexMap;
use serde_json::Value;

pub use layout::{Control, ControlLabel, ControlOptions, LayoutKind, LayoutNode};
pub use property::{Choice, PropertySchema, PropertyType};
pub use schema::{DataSchema, SchemaError};
pub use template::FormTemplate;

/// Values keyed by property name.
pub type FormValues = IndexMap<String, Value>;
