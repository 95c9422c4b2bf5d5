//! The form engine.
//!
//! - [`resolve`] - Match layout controls to schema properties
//! - [`classify`] - Choose the widget kind for a resolved control
//! - [`validate`] - Compile and run validation rules
//! - [`store`] - Form state: values, errors, touched flags
//! - [`submit`] - Submission pipeline and number coercion

/// Control-to-property resolution.
pub mod resolve;

/// Widget kind inference.
pub mod classify;

/// Validation rules and field errors.
pub mod validate;

/// Form state store.
pub mod store;

/// Submission pipeline.
pub mod submit;

pub use classify::{WidgetKind, classify};
pub use resolve::{ResolvedControl, resolve};
pub use store::{FormHandle, FormState, FormStore, SubmitStatus, Touched};
pub use submit::{SubmitOutcome, coerce_numbers};
pub use validate::{FieldError, FormErrors, Validator, validate_all, validate_property};
