use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use indexmap::IndexSet;
use serde_json::Value;

use crate::{
    data::{DataSchema, FormTemplate, FormValues, LayoutNode, SchemaError},
    engine::validate::{FieldError, FormErrors, Validator},
    ui::{RenderContext, RenderNode, render, widgets::WidgetRegistry},
};

/// Names of fields the user has interacted with.
pub type Touched = IndexSet<String>;

/// The accessor pair threaded through the render tree.
pub trait FormHandle {
    /// Record user input for `name`.
    fn set_value(&mut self, name: &str, value: Value);
    /// Record that `name` lost focus.
    fn set_touched(&mut self, name: &str);
}

/// Point-in-time copy of a form's state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormState {
    pub values: FormValues,
    pub errors: FormErrors,
    pub touched: Touched,
    pub is_submitting: bool,
    pub is_valid: bool,
}

/// Observer of a form's in-flight submission flag.
///
/// Clones share the flag, so a host can keep one to decide, for example,
/// whether the draft button is enabled while a submission is pending.
#[derive(Debug, Clone, Default)]
pub struct SubmitStatus(Arc<AtomicBool>);

impl SubmitStatus {
    pub fn is_submitting(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Raise the flag until the returned guard is dropped.
    pub(crate) fn begin(&self) -> InFlight {
        self.0.store(true, Ordering::Release);
        InFlight(self.0.clone())
    }
}

/// Clears the in-flight flag on drop: on completion, error, panic or
/// cancellation of the submission future alike.
pub(crate) struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owns the state of one mounted form.
///
/// `values` always holds exactly one entry per declared property. Validity is
/// recomputed on every value write; that is O(number of properties) per
/// change.
#[derive(Debug)]
pub struct FormStore {
    pub(crate) schema: DataSchema,
    validator: Validator,
    initial: FormValues,
    pub(crate) values: FormValues,
    errors: FormErrors,
    touched: Touched,
    is_valid: bool,
    pub(crate) status: SubmitStatus,
}

impl FormStore {
    /// Create the store for `schema`, seeding values from `data`.
    ///
    /// # Errors
    ///
    /// Returns an error when the schema's validation rules cannot be compiled.
    pub fn new(schema: DataSchema, data: Option<&FormValues>) -> Result<Self, SchemaError> {
        let validator = Validator::compile(&schema)?;
        let initial = Self::initial_values(&schema, data);
        let is_valid = validator.is_valid(&initial);
        debug!(
            "form store created with {} properties, valid: {is_valid}",
            schema.properties.len()
        );

        Ok(Self {
            schema,
            validator,
            values: initial.clone(),
            initial,
            errors: FormErrors::new(),
            touched: Touched::new(),
            is_valid,
            status: SubmitStatus::default(),
        })
    }

    /// Create the store for a template's schema and pre-filled data.
    pub fn from_template(template: &FormTemplate) -> Result<Self, SchemaError> {
        Self::new(template.json_schema.clone(), template.form_data.as_ref())
    }

    /// One value per declared property: caller data, then the schema
    /// default, then the type's empty value. Undeclared keys are dropped.
    pub fn initial_values(schema: &DataSchema, data: Option<&FormValues>) -> FormValues {
        if let Some(data) = data {
            for name in data.keys().filter(|k| !schema.properties.contains_key(*k)) {
                debug!("ignoring initial value for undeclared property `{name}`");
            }
        }
        schema
            .properties
            .iter()
            .map(|(name, property)| {
                let seeded = data.and_then(|d| d.get(name));
                (name.clone(), property.initial_value(seeded))
            })
            .collect()
    }

    pub fn schema(&self) -> &DataSchema {
        &self.schema
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn error(&self, name: &str) -> Option<&FieldError> {
        self.errors.get(name)
    }

    pub fn touched(&self) -> &Touched {
        &self.touched
    }

    pub fn is_touched(&self, name: &str) -> bool {
        self.touched.contains(name)
    }

    /// Whole-schema validity of the current values, independent of touched.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn is_submitting(&self) -> bool {
        self.status.is_submitting()
    }

    /// Handle on the in-flight flag.
    pub fn status(&self) -> SubmitStatus {
        self.status.clone()
    }

    pub fn snapshot(&self) -> FormState {
        FormState {
            values: self.values.clone(),
            errors: self.errors.clone(),
            touched: self.touched.clone(),
            is_submitting: self.is_submitting(),
            is_valid: self.is_valid,
        }
    }

    /// Write `value` and re-validate that property only.
    pub fn set_value(&mut self, name: &str, value: impl Into<Value>) {
        let Some(slot) = self.values.get_mut(name) else {
            debug!("set_value on undeclared property `{name}` ignored");
            return;
        };
        *slot = value.into();

        let error = self.validator.validate_field(name, &self.values[name]);
        self.record(name, error);
        self.is_valid = self.validator.is_valid(&self.values);
    }

    /// Mark `name` as touched. Idempotent.
    pub fn set_touched(&mut self, name: &str) {
        if !self.schema.properties.contains_key(name) {
            debug!("set_touched on undeclared property `{name}` ignored");
            return;
        }
        self.touched.insert(name.to_string());
    }

    /// Re-validate `name` against its current value.
    pub fn validate_field(&mut self, name: &str) -> Option<FieldError> {
        let value = self.values.get(name)?;
        let error = self.validator.validate_field(name, value);
        self.record(name, error.clone());
        error
    }

    /// Validate every property, replace all errors and touch every field.
    ///
    /// Returns whether the form passed.
    pub fn validate_form(&mut self) -> bool {
        self.errors = self.validator.validate_all(&self.values);
        self.touched = self.schema.properties.keys().cloned().collect();
        if !self.errors.is_empty() {
            debug!("form invalid: {} field(s) in error", self.errors.len());
        }
        self.errors.is_empty()
    }

    /// Restore the initial values and clear errors and touched flags.
    pub fn reset(&mut self) {
        self.values = self.initial.clone();
        self.errors.clear();
        self.touched.clear();
        self.is_valid = self.validator.is_valid(&self.values);
    }

    /// Render `layout` against the current state.
    pub fn render(&self, layout: &LayoutNode, widgets: &WidgetRegistry) -> Option<RenderNode> {
        let ctx = RenderContext {
            schema: &self.schema,
            values: &self.values,
            errors: &self.errors,
            touched: &self.touched,
            widgets,
        };
        render(layout, &ctx)
    }

    fn record(&mut self, name: &str, error: Option<FieldError>) {
        match error {
            Some(e) => {
                self.errors.insert(name.to_string(), e);
            }
            None => {
                self.errors.shift_remove(name);
            }
        }
    }
}

impl FormHandle for FormStore {
    fn set_value(&mut self, name: &str, value: Value) {
        FormStore::set_value(self, name, value);
    }

    fn set_touched(&mut self, name: &str) {
        FormStore::set_touched(self, name);
    }
}
