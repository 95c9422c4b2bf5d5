//! # jsonform
//!
//! A schema-driven dynamic form engine.
//!
//! A form is described by a data schema (the fields, their types and
//! constraints) and a UI schema (how the fields are laid out). jsonform turns
//! the pair into a render tree of bound widgets, keeps the form state, validates
//! user input and runs the submission pipeline.
//!
//! ## Features
//!
//! - JSON Schema subset: string, number, integer and boolean properties with
//!   `enum`/`oneOf`, length, range and pattern constraints
//! - UI-schema layouts: vertical, horizontal, group, control and label elements
//! - Widget inference with a pluggable [`WidgetRegistry`]
//! - Touched-gated error display and full-form validation on submit
//! - Numeric coercion of submitted values and an in-flight submission flag
//! - Form templates in JSON or TOML
//!
//! ## Quick Start
//!
//! ```rust
//! use jsonform::{DataSchema, FormStore, LayoutNode, PropertySchema, PropertyType, WidgetRegistry};
//!
//! let schema = DataSchema::new()
//!     .with_property("qty", PropertySchema::new(PropertyType::Number))
//!     .with_required("qty");
//! let layout = LayoutNode::for_schema(&schema);
//!
//! let mut store = FormStore::new(schema, None).unwrap();
//! store.set_value("qty", "12");
//!
//! let tree = store.render(&layout, &WidgetRegistry::default()).unwrap();
//! println!("{tree}");
//! ```
//!
//! ## Modules
//!
//! - [`data`] - Data schema, UI schema and form template models
//! - [`engine`] - Control resolution, widget inference, validation and form state
//! - [`ui`] - Layout walker, render tree and widgets

#[macro_use]
extern crate log;

/// Data schema, UI schema and form template models.
pub mod data;

/// Control resolution, widget inference, validation, form state and
/// submission.
pub mod engine;

/// Layout walker, render tree and widgets.
pub mod ui;

pub use data::{
    Choice, Control, ControlLabel, ControlOptions, DataSchema, FormTemplate, FormValues,
    LayoutKind, LayoutNode, PropertySchema, PropertyType, SchemaError,
};
pub use engine::{
    FieldError, FormErrors, FormHandle, FormState, FormStore, SubmitOutcome, SubmitStatus,
    WidgetKind,
};
pub use serde_json::Value;
pub use ui::{
    FieldBinding, FieldNode, FieldProps, RenderNode, render,
    widgets::{FieldWidget, WidgetRegistry},
};
