use serde::{Deserialize, Serialize};

use crate::data::schema::DataSchema;

/// Arrangement of a layout node's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    /// Children stacked top to bottom.
    Vertical,
    /// Children side by side, equal share each.
    Horizontal,
    /// Vertical, wrapped in a labelled boundary when a label is present.
    Group,
}

/// A node of the layout tree.
///
/// Reads and writes the JSON-Forms UI schema dialect
/// (`VerticalLayout`, `HorizontalLayout`, `Group`, `Control`, `Label`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawNode", into = "RawNode")]
pub enum LayoutNode {
    Layout {
        kind: LayoutKind,
        label: Option<String>,
        /// Render order.
        children: Vec<LayoutNode>,
    },
    Control(Control),
    Label {
        text: String,
    },
}

impl LayoutNode {
    pub fn vertical(children: Vec<LayoutNode>) -> Self {
        LayoutNode::Layout {
            kind: LayoutKind::Vertical,
            label: None,
            children,
        }
    }

    pub fn horizontal(children: Vec<LayoutNode>) -> Self {
        LayoutNode::Layout {
            kind: LayoutKind::Horizontal,
            label: None,
            children,
        }
    }

    pub fn group(label: Option<&str>, children: Vec<LayoutNode>) -> Self {
        LayoutNode::Layout {
            kind: LayoutKind::Group,
            label: label.map(str::to_string),
            children,
        }
    }

    pub fn control(scope: impl Into<String>) -> Self {
        LayoutNode::Control(Control::new(scope))
    }

    pub fn label(text: impl Into<String>) -> Self {
        LayoutNode::Label { text: text.into() }
    }

    /// Layout used when a form carries no UI schema: one control per
    /// declared property, stacked in declaration order.
    pub fn for_schema(schema: &DataSchema) -> Self {
        LayoutNode::vertical(
            schema
                .properties
                .keys()
                .map(|name| LayoutNode::control(format!("#/properties/{}", escape_pointer(name))))
                .collect(),
        )
    }
}

/// A layout element bound to one data property.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Control {
    /// Reference to the bound property, e.g. `#/properties/quantity`.
    pub scope: String,
    #[serde(default, skip_serializing_if = "ControlLabel::is_inherit")]
    pub label: ControlLabel,
    #[serde(default, skip_serializing_if = "ControlOptions::is_empty")]
    pub options: ControlOptions,
}

impl Control {
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = ControlLabel::Text(label.into());
        self
    }

    pub fn hide_label(mut self) -> Self {
        self.label = ControlLabel::Hidden;
        self
    }

    pub fn with_options(mut self, options: ControlOptions) -> Self {
        self.options = options;
        self
    }
}

impl From<Control> for LayoutNode {
    fn from(control: Control) -> Self {
        LayoutNode::Control(control)
    }
}

/// Label setting of a control.
///
/// In the UI schema `label: false` hides the label, a string overrides it,
/// and absence (or `true`) falls back to the property title.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<RawLabel>", into = "Option<RawLabel>")]
pub enum ControlLabel {
    #[default]
    Inherit,
    Hidden,
    Text(String),
}

impl ControlLabel {
    pub fn is_inherit(&self) -> bool {
        matches!(self, ControlLabel::Inherit)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawLabel {
    Text(String),
    Flag(bool),
}

impl From<Option<RawLabel>> for ControlLabel {
    fn from(raw: Option<RawLabel>) -> Self {
        match raw {
            Some(RawLabel::Text(text)) => ControlLabel::Text(text),
            Some(RawLabel::Flag(false)) => ControlLabel::Hidden,
            Some(RawLabel::Flag(true)) | None => ControlLabel::Inherit,
        }
    }
}

impl From<ControlLabel> for Option<RawLabel> {
    fn from(label: ControlLabel) -> Self {
        match label {
            ControlLabel::Inherit => None,
            ControlLabel::Hidden => Some(RawLabel::Flag(false)),
            ControlLabel::Text(text) => Some(RawLabel::Text(text)),
        }
    }
}

/// Rendering hints attached to a control.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ControlOptions {
    /// Explicit widget kind, wins over every other rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Multi-line text entry.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub multi: bool,
    /// Visible text rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
}

impl ControlOptions {
    pub fn is_empty(&self) -> bool {
        self.format.is_none() && !self.multi && self.rows.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
enum RawNode {
    VerticalLayout(RawLayout),
    HorizontalLayout(RawLayout),
    Group(RawLayout),
    Control(Control),
    Label {
        #[serde(default)]
        text: String,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawLayout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(default)]
    elements: Vec<LayoutNode>,
}

impl From<RawNode> for LayoutNode {
    fn from(raw: RawNode) -> Self {
        let layout = |kind, raw: RawLayout| LayoutNode::Layout {
            kind,
            label: raw.label,
            children: raw.elements,
        };
        match raw {
            RawNode::VerticalLayout(l) => layout(LayoutKind::Vertical, l),
            RawNode::HorizontalLayout(l) => layout(LayoutKind::Horizontal, l),
            RawNode::Group(l) => layout(LayoutKind::Group, l),
            RawNode::Control(control) => LayoutNode::Control(control),
            RawNode::Label { text } => LayoutNode::Label { text },
            RawNode::Unknown => {
                warn!("unknown layout element type, rendering it empty");
                LayoutNode::vertical(Vec::new())
            }
        }
    }
}

impl From<LayoutNode> for RawNode {
    fn from(node: LayoutNode) -> Self {
        match node {
            LayoutNode::Layout {
                kind,
                label,
                children,
            } => {
                let raw = RawLayout {
                    label,
                    elements: children,
                };
                match kind {
                    LayoutKind::Vertical => RawNode::VerticalLayout(raw),
                    LayoutKind::Horizontal => RawNode::HorizontalLayout(raw),
                    LayoutKind::Group => RawNode::Group(raw),
                }
            }
            LayoutNode::Control(control) => RawNode::Control(control),
            LayoutNode::Label { text } => RawNode::Label { text },
        }
    }
}

fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}
