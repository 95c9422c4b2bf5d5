use std::future::Future;

use serde_json::Value;

use crate::{
    data::{DataSchema, FormValues, property::parse_number},
    engine::store::FormStore,
};

/// How a submission attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; the handler was not called and every error is now
    /// visible.
    Invalid,
    /// The handler was called and completed.
    Submitted,
}

/// Convert numeric strings of `number`/`integer` properties into numbers.
///
/// Strings that do not parse are left as they are. Whole numbers are
/// written as JSON integers.
pub fn coerce_numbers(schema: &DataSchema, values: &FormValues) -> FormValues {
    let mut coerced = values.clone();
    for (name, property) in &schema.properties {
        if !property.ty.is_numeric() {
            continue;
        }
        let Some(Value::String(raw)) = values.get(name) else {
            continue;
        };
        match parse_number(raw).and_then(number_value) {
            Some(number) => {
                coerced.insert(name.clone(), number);
            }
            None if !raw.is_empty() => {
                warn!("could not coerce `{name}` value {raw:?} to a number, sending it unchanged");
            }
            None => {}
        }
    }
    coerced
}

fn number_value(n: f64) -> Option<Value> {
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
        Some(Value::from(n as i64))
    } else {
        serde_json::Number::from_f64(n).map(Value::Number)
    }
}

impl FormStore {
    /// Run the submission pipeline.
    ///
    /// Validates the whole form; if it passes, raises the in-flight flag,
    /// coerces numeric fields and awaits `on_submit` with the coerced values.
    /// The flag is cleared whatever the handler does. Handler errors are
    /// returned to the caller unchanged.
    ///
    /// The store is borrowed exclusively for the whole call, so a second
    /// submission cannot overlap one in flight. A synchronous handler can
    /// return `std::future::ready(result)`.
    pub async fn handle_submit<F, Fut, E>(&mut self, on_submit: F) -> Result<SubmitOutcome, E>
    where
        F: FnOnce(FormValues) -> Fut,
        Fut: Future<Output = Result<(), E>>,
    {
        if !self.validate_form() {
            info!("submission blocked: {} invalid field(s)", self.errors().len());
            return Ok(SubmitOutcome::Invalid);
        }

        let _in_flight = self.status.begin();
        let values = coerce_numbers(&self.schema, &self.values);
        debug!("submitting {} value(s)", values.len());
        on_submit(values).await?;
        Ok(SubmitOutcome::Submitted)
    }

    /// Hand the raw current values to `on_draft`, skipping validation and
    /// coercion.
    pub fn save_draft<F, R>(&self, on_draft: F) -> R
    where
        F: FnOnce(FormValues) -> R,
    {
        debug!("saving draft");
        on_draft(self.values.clone())
    }
}
