use std::{collections::HashMap, fmt, sync::Arc};

use serde_json::Value;

use crate::{data::property::display_value, engine::WidgetKind, ui::FieldProps};

/// Something that can draw a field.
pub trait FieldWidget: Send + Sync {
    /// Short name used in logs and debug output.
    fn name(&self) -> &str;

    /// Text lines for the field in its current state.
    fn draw(&self, props: &FieldProps) -> Vec<String>;
}

fn heading(props: &FieldProps) -> String {
    let marker = if props.required { " *" } else { "" };
    format!("{}{marker}", props.label)
}

fn push_error(lines: &mut Vec<String>, props: &FieldProps) {
    if let Some(error) = &props.error {
        lines.push(format!("  ! {error}"));
    }
}

/// Single-line entry. Also used for email fields and as the fallback.
#[derive(Debug, Clone)]
pub struct TextField {
    name: &'static str,
}

impl TextField {
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl FieldWidget for TextField {
    fn name(&self) -> &str {
        self.name
    }

    fn draw(&self, props: &FieldProps) -> Vec<String> {
        let value = display_value(&props.value);
        let line = if props.label.is_empty() {
            value
        } else {
            format!("{}: {value}", heading(props))
        };
        let mut lines = vec![line.trim_end().to_string()];
        push_error(&mut lines, props);
        lines
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NumberField;

impl FieldWidget for NumberField {
    fn name(&self) -> &str {
        "number"
    }

    fn draw(&self, props: &FieldProps) -> Vec<String> {
        TextField::new("number").draw(props)
    }
}

/// Upper bound on the blank rows a textarea pads itself to.
pub const MAX_TEXTAREA_ROWS: usize = 64;

/// Multi-line entry; each value line is drawn behind a gutter.
#[derive(Debug, Clone, Copy)]
pub struct TextareaField;

impl FieldWidget for TextareaField {
    fn name(&self) -> &str {
        "textarea"
    }

    fn draw(&self, props: &FieldProps) -> Vec<String> {
        let mut lines = Vec::new();
        if !props.label.is_empty() {
            lines.push(format!("{}:", heading(props)));
        }
        let value = display_value(&props.value);
        let mut body: Vec<String> = value.lines().map(|line| format!("  | {line}")).collect();
        let rows = props.rows.map_or(1, |rows| (rows as usize).min(MAX_TEXTAREA_ROWS));
        if body.len() < rows {
            body.resize(rows, "  |".to_string());
        }
        lines.extend(body);
        push_error(&mut lines, props);
        lines
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SelectField;

impl FieldWidget for SelectField {
    fn name(&self) -> &str {
        "select"
    }

    fn draw(&self, props: &FieldProps) -> Vec<String> {
        let mut lines = Vec::new();
        if !props.label.is_empty() {
            lines.push(format!("{}:", heading(props)));
        }
        for choice in &props.choices {
            let mark = if choice.value == props.value { '*' } else { ' ' };
            lines.push(format!("  ({mark}) {}", choice.label()));
        }
        push_error(&mut lines, props);
        lines
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CheckboxField;

impl FieldWidget for CheckboxField {
    fn name(&self) -> &str {
        "checkbox"
    }

    fn draw(&self, props: &FieldProps) -> Vec<String> {
        let mark = if props.value == Value::Bool(true) { 'x' } else { ' ' };
        let line = format!("[{mark}] {}", heading(props));
        let mut lines = vec![line.trim_end().to_string()];
        push_error(&mut lines, props);
        lines
    }
}

/// Maps widget kinds onto widgets.
///
/// Kinds without a registration draw with the text widget.
#[derive(Clone)]
pub struct WidgetRegistry {
    widgets: HashMap<WidgetKind, Arc<dyn FieldWidget>>,
    fallback: Arc<dyn FieldWidget>,
}

impl WidgetRegistry {
    /// Registry holding only the built-in widgets.
    pub fn builtin() -> Self {
        let text: Arc<dyn FieldWidget> = Arc::new(TextField::new("text"));
        let mut widgets: HashMap<WidgetKind, Arc<dyn FieldWidget>> = HashMap::new();
        widgets.insert(WidgetKind::Text, text.clone());
        widgets.insert(WidgetKind::Email, Arc::new(TextField::new("email")));
        widgets.insert(WidgetKind::Number, Arc::new(NumberField));
        widgets.insert(WidgetKind::Textarea, Arc::new(TextareaField));
        widgets.insert(WidgetKind::Select, Arc::new(SelectField));
        widgets.insert(WidgetKind::Checkbox, Arc::new(CheckboxField));
        Self {
            widgets,
            fallback: text,
        }
    }

    /// Register or replace the widget for `kind`.
    pub fn register(&mut self, kind: WidgetKind, widget: impl FieldWidget + 'static) {
        self.widgets.insert(kind, Arc::new(widget));
    }

    pub fn with(mut self, kind: WidgetKind, widget: impl FieldWidget + 'static) -> Self {
        self.register(kind, widget);
        self
    }

    pub fn contains(&self, kind: &WidgetKind) -> bool {
        self.widgets.contains_key(kind)
    }

    pub fn get(&self, kind: &WidgetKind) -> Arc<dyn FieldWidget> {
        match self.widgets.get(kind) {
            Some(widget) => widget.clone(),
            None => {
                debug!("no widget registered for `{kind}`, using `{}`", self.fallback.name());
                self.fallback.clone()
            }
        }
    }
}

impl Default for WidgetRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for WidgetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&str> = self.widgets.keys().map(WidgetKind::as_str).collect();
        kinds.sort_unstable();
        f.debug_struct("WidgetRegistry")
            .field("kinds", &kinds)
            .field("fallback", &self.fallback.name())
            .finish()
    }
}
