//! Layout walker and render tree.
//!
//! [`render`] turns a [`LayoutNode`] tree plus the current form state into a
//! [`RenderNode`] tree. It keeps no state of its own, so hosts call it again
//! after every change. Rendered fields carry a [`FieldBinding`] through which
//! user input flows back into a [`FormHandle`].

/// Widget registry and built-in widgets.
pub mod widgets;

use std::{fmt, sync::Arc};

use serde_json::Value;

use crate::{
    data::{Choice, DataSchema, FormValues, LayoutKind, LayoutNode},
    engine::{
        FieldError, FormErrors, FormHandle, Touched, WidgetKind, classify, resolve,
    },
};

use widgets::{FieldWidget, WidgetRegistry};

/// Everything the walker reads while rendering.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub schema: &'a DataSchema,
    pub values: &'a FormValues,
    pub errors: &'a FormErrors,
    pub touched: &'a Touched,
    pub widgets: &'a WidgetRegistry,
}

/// Render instruction produced by the walker.
#[derive(Debug, Clone)]
pub enum RenderNode {
    /// Children stacked top to bottom.
    Stack(Vec<RenderNode>),
    /// Children side by side with an equal share each.
    Row(Vec<RenderNode>),
    /// Children inside a labelled boundary.
    Fieldset {
        legend: String,
        children: Vec<RenderNode>,
    },
    /// An input widget bound to one property.
    Field(FieldNode),
    /// Non-interactive text.
    Caption(String),
}

/// A widget instance with its props.
#[derive(Clone)]
pub struct FieldNode {
    pub widget: Arc<dyn FieldWidget>,
    pub props: FieldProps,
}

impl fmt::Debug for FieldNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldNode")
            .field("widget", &self.widget.name())
            .field("props", &self.props)
            .finish()
    }
}

/// Data handed to a widget.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldProps {
    pub binding: FieldBinding,
    pub kind: WidgetKind,
    pub label: String,
    pub description: Option<String>,
    pub required: bool,
    pub value: Value,
    /// Current error, only present once the field is touched.
    pub error: Option<FieldError>,
    pub touched: bool,
    /// Options of a closed-choice property.
    pub choices: Vec<Choice>,
    /// Requested visible rows for multi-line entry.
    pub rows: Option<u32>,
}

/// Connects a rendered widget back to the form state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBinding {
    name: String,
}

impl FieldBinding {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Bound property name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The widget's value changed.
    pub fn change(&self, form: &mut impl FormHandle, value: impl Into<Value>) {
        form.set_value(&self.name, value.into());
    }

    /// The widget lost focus.
    pub fn blur(&self, form: &mut impl FormHandle) {
        form.set_touched(&self.name);
    }
}

/// Render `node` against the state in `ctx`.
///
/// Depth-first, pre-order. A control whose scope does not resolve renders
/// nothing and is left out of its parent.
pub fn render(node: &LayoutNode, ctx: &RenderContext<'_>) -> Option<RenderNode> {
    match node {
        LayoutNode::Layout {
            kind,
            label,
            children,
        } => {
            let children = children.iter().filter_map(|child| render(child, ctx)).collect();
            Some(match (kind, label) {
                (LayoutKind::Horizontal, _) => RenderNode::Row(children),
                (LayoutKind::Group, Some(legend)) if !legend.is_empty() => RenderNode::Fieldset {
                    legend: legend.clone(),
                    children,
                },
                (LayoutKind::Group, _) | (LayoutKind::Vertical, _) => RenderNode::Stack(children),
            })
        }
        LayoutNode::Control(control) => {
            let resolved = resolve(control, ctx.schema)?;
            let kind = classify(&resolved);
            let touched = ctx.touched.contains(resolved.name);
            let props = FieldProps {
                binding: FieldBinding::new(resolved.name),
                label: resolved.label,
                description: resolved.property.description.clone(),
                required: resolved.required,
                value: ctx.values.get(resolved.name).cloned().unwrap_or(Value::Null),
                error: touched
                    .then(|| ctx.errors.get(resolved.name).cloned())
                    .flatten(),
                touched,
                choices: resolved.property.choices(),
                rows: resolved.options.rows,
                kind,
            };
            Some(RenderNode::Field(FieldNode {
                widget: ctx.widgets.get(&props.kind),
                props,
            }))
        }
        LayoutNode::Label { text } => Some(RenderNode::Caption(text.clone())),
    }
}

impl RenderNode {
    /// Fields of this tree in render order.
    pub fn fields(&self) -> Vec<&FieldProps> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a FieldProps>) {
        match self {
            RenderNode::Stack(children)
            | RenderNode::Row(children)
            | RenderNode::Fieldset { children, .. } => {
                for child in children {
                    child.collect_fields(out);
                }
            }
            RenderNode::Field(field) => out.push(&field.props),
            RenderNode::Caption(_) => {}
        }
    }

    /// Text lines of this tree as drawn by the bound widgets.
    pub fn lines(&self) -> Vec<String> {
        match self {
            RenderNode::Stack(children) => children.iter().flat_map(RenderNode::lines).collect(),
            RenderNode::Row(children) => row_lines(children),
            RenderNode::Fieldset { legend, children } => {
                let mut lines = vec![format!("[{legend}]")];
                lines.extend(
                    children
                        .iter()
                        .flat_map(RenderNode::lines)
                        .map(|line| format!("  {line}")),
                );
                lines
            }
            RenderNode::Field(field) => field.widget.draw(&field.props),
            RenderNode::Caption(text) => vec![text.clone()],
        }
    }
}

impl fmt::Display for RenderNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}

const COLUMN_GAP: &str = "   ";

/// Lay children out as equal-width columns.
fn row_lines(children: &[RenderNode]) -> Vec<String> {
    let columns: Vec<Vec<String>> = children.iter().map(RenderNode::lines).collect();
    let width = columns
        .iter()
        .flatten()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0);
    let height = columns.iter().map(Vec::len).max().unwrap_or(0);

    (0..height)
        .map(|i| {
            let cells: Vec<String> = columns
                .iter()
                .map(|col| {
                    let cell = col.get(i).map(String::as_str).unwrap_or("");
                    format!("{cell:<width$}")
                })
                .collect();
            cells.join(COLUMN_GAP).trim_end().to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::{Control, ControlOptions, PropertySchema, PropertyType},
        engine::FormStore,
    };
    use serde_json::json;

    fn schema() -> DataSchema {
        DataSchema::new()
            .with_property(
                "exporter",
                PropertySchema::new(PropertyType::String).with_title("Exporter"),
            )
            .with_property(
                "origin",
                PropertySchema::new(PropertyType::String).with_enum(["AU", "US"]),
            )
            .with_property("qty", PropertySchema::new(PropertyType::Number))
            .with_property("dangerous", PropertySchema::new(PropertyType::Boolean))
            .with_required("exporter")
    }

    fn layout() -> LayoutNode {
        LayoutNode::vertical(vec![
            LayoutNode::label("Shipment"),
            LayoutNode::group(
                Some("Parties"),
                vec![LayoutNode::control("#/properties/exporter")],
            ),
            LayoutNode::horizontal(vec![
                LayoutNode::control("#/properties/origin"),
                LayoutNode::control("#/properties/qty"),
                LayoutNode::control("#/properties/missing"),
            ]),
            LayoutNode::group(None, vec![LayoutNode::control("#/properties/dangerous")]),
        ])
    }

    #[test]
    fn test_tree_shape() {
        let store = FormStore::new(schema(), None).unwrap();
        let tree = store.render(&layout(), &WidgetRegistry::default()).unwrap();

        let RenderNode::Stack(top) = &tree else {
            panic!("expected a stack, got {tree:?}");
        };
        assert_eq!(top.len(), 4);
        assert!(matches!(&top[0], RenderNode::Caption(t) if t == "Shipment"));
        assert!(matches!(&top[1], RenderNode::Fieldset { legend, children } if legend == "Parties" && children.len() == 1));
        assert!(matches!(&top[2], RenderNode::Row(children) if children.len() == 2));
        assert!(matches!(&top[3], RenderNode::Stack(children) if children.len() == 1));

        let fields: Vec<_> = tree.fields().iter().map(|f| (f.binding.name().to_string(), f.kind.clone())).collect();
        assert_eq!(
            fields,
            [
                ("exporter".to_string(), WidgetKind::Text),
                ("origin".to_string(), WidgetKind::Select),
                ("qty".to_string(), WidgetKind::Number),
                ("dangerous".to_string(), WidgetKind::Checkbox),
            ]
        );
    }

    #[test]
    fn test_group_with_empty_label_is_vertical() {
        let store = FormStore::new(schema(), None).unwrap();
        let layout = LayoutNode::group(Some(""), vec![LayoutNode::control("#/properties/qty")]);
        let tree = store.render(&layout, &WidgetRegistry::default()).unwrap();
        assert!(matches!(&tree, RenderNode::Stack(children) if children.len() == 1));
    }

    #[test]
    fn test_unresolved_control_renders_nothing() {
        let mut store = FormStore::new(schema(), None).unwrap();
        let only_missing = LayoutNode::control("#/properties/missing");
        assert!(store.render(&only_missing, &WidgetRegistry::default()).is_none());

        store.validate_form();
        assert!(!store.errors().contains_key("missing"));
    }

    #[test]
    fn test_error_only_when_touched() {
        let mut store = FormStore::new(schema(), None).unwrap();
        let layout = LayoutNode::control("#/properties/exporter");
        let widgets = WidgetRegistry::default();

        store.set_value("exporter", "");
        let tree = store.render(&layout, &widgets).unwrap();
        assert_eq!(tree.fields()[0].error, None);

        store.set_touched("exporter");
        let tree = store.render(&layout, &widgets).unwrap();
        assert_eq!(tree.fields()[0].error, Some(FieldError::Required));
        assert!(tree.fields()[0].required);
    }

    #[test]
    fn test_binding_round_trip() {
        let mut store = FormStore::new(schema(), None).unwrap();
        let widgets = WidgetRegistry::default();
        let layout = LayoutNode::control("#/properties/qty");

        let tree = store.render(&layout, &widgets).unwrap();
        let binding = tree.fields()[0].binding.clone();
        binding.change(&mut store, "12");
        binding.blur(&mut store);

        let tree = store.render(&layout, &widgets).unwrap();
        let field = tree.fields()[0];
        assert_eq!(field.value, json!("12"));
        assert!(field.touched);
        assert_eq!(field.error, None);
    }

    #[test]
    fn test_props_from_control() {
        let store = FormStore::new(schema(), None).unwrap();
        let control = Control::new("#/properties/exporter")
            .with_label("Shipper")
            .with_options(ControlOptions {
                rows: Some(3),
                ..Default::default()
            });
        let tree = store
            .render(&control.into(), &WidgetRegistry::default())
            .unwrap();
        let field = tree.fields()[0];
        assert_eq!(field.label, "Shipper");
        assert_eq!(field.kind, WidgetKind::Textarea);
        assert_eq!(field.rows, Some(3));
    }

    #[test]
    fn test_text_output() {
        let mut store = FormStore::new(schema(), None).unwrap();
        store.set_value("exporter", "ACME");
        store.set_value("origin", "AU");
        store.set_value("qty", "12");
        let tree = store.render(&layout(), &WidgetRegistry::default()).unwrap();

        let text = tree.to_string();
        assert!(text.starts_with("Shipment\n[Parties]\n  Exporter *: ACME"));
        assert!(text.contains("(*) AU"));
        assert!(text.contains("qty: 12"));
        assert!(text.contains("[ ] dangerous"));
    }

    #[test]
    fn test_row_columns_equal_width() {
        let lines = row_lines(&[
            RenderNode::Caption("ab".to_string()),
            RenderNode::Stack(vec![
                RenderNode::Caption("c".to_string()),
                RenderNode::Caption("defg".to_string()),
            ]),
        ]);
        assert_eq!(lines, ["ab     c", "       defg"]);
    }
}
