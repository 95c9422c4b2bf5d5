use std::fmt;

use crate::{data::PropertyType, engine::resolve::ResolvedControl};

/// Display-widget kind chosen for a control.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    Text,
    Email,
    Number,
    Textarea,
    Select,
    Checkbox,
    /// Any other name given through `options.format`.
    Custom(String),
}

impl WidgetKind {
    /// Map a widget name onto a kind; unknown names become [`WidgetKind::Custom`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "text" => WidgetKind::Text,
            "email" => WidgetKind::Email,
            "number" => WidgetKind::Number,
            "textarea" => WidgetKind::Textarea,
            "select" => WidgetKind::Select,
            "checkbox" => WidgetKind::Checkbox,
            other => WidgetKind::Custom(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            WidgetKind::Text => "text",
            WidgetKind::Email => "email",
            WidgetKind::Number => "number",
            WidgetKind::Textarea => "textarea",
            WidgetKind::Select => "select",
            WidgetKind::Checkbox => "checkbox",
            WidgetKind::Custom(name) => name,
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pick the widget kind for a resolved control.
///
/// First match wins:
/// 1. `options.format`, verbatim; an empty format counts as unset
/// 2. `options.multi` or `options.rows > 1` gives a textarea
/// 3. `enum` / `oneOf` gives a select
/// 4. the property type (`format: "email"` strings get an email field)
///
/// A boolean with `options.multi` is therefore a textarea, not a checkbox.
pub fn classify(resolved: &ResolvedControl<'_>) -> WidgetKind {
    let options = resolved.options;
    let property = resolved.property;

    if let Some(format) = options.format.as_deref().filter(|f| !f.is_empty()) {
        return WidgetKind::from_name(format);
    }

    if options.multi || options.rows.is_some_and(|rows| rows > 1) {
        return WidgetKind::Textarea;
    }

    if property.is_closed_choice() {
        return WidgetKind::Select;
    }

    match property.ty {
        PropertyType::Boolean => WidgetKind::Checkbox,
        PropertyType::Number | PropertyType::Integer => WidgetKind::Number,
        PropertyType::String if property.format.as_deref() == Some("email") => WidgetKind::Email,
        PropertyType::String => WidgetKind::Text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ControlOptions, PropertySchema};

    fn kind_of(property: PropertySchema, options: ControlOptions) -> WidgetKind {
        let resolved = ResolvedControl {
            name: "field",
            label: String::new(),
            property: &property,
            required: false,
            options: &options,
        };
        classify(&resolved)
    }

    fn multi() -> ControlOptions {
        ControlOptions {
            multi: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_type_switch() {
        let none = ControlOptions::default;
        assert_eq!(kind_of(PropertySchema::new(PropertyType::Boolean), none()), WidgetKind::Checkbox);
        assert_eq!(kind_of(PropertySchema::new(PropertyType::Integer), none()), WidgetKind::Number);
        assert_eq!(kind_of(PropertySchema::new(PropertyType::Number), none()), WidgetKind::Number);
        assert_eq!(kind_of(PropertySchema::new(PropertyType::String), none()), WidgetKind::Text);
        assert_eq!(
            kind_of(PropertySchema::new(PropertyType::String).with_format("email"), none()),
            WidgetKind::Email
        );
        assert_eq!(
            kind_of(PropertySchema::new(PropertyType::String).with_format("date"), none()),
            WidgetKind::Text
        );
    }

    #[test]
    fn test_multi_beats_boolean() {
        assert_eq!(kind_of(PropertySchema::new(PropertyType::Boolean), multi()), WidgetKind::Textarea);
    }

    #[test]
    fn test_rows() {
        let rows = |n| ControlOptions {
            rows: Some(n),
            ..Default::default()
        };
        assert_eq!(kind_of(PropertySchema::new(PropertyType::String), rows(3)), WidgetKind::Textarea);
        assert_eq!(kind_of(PropertySchema::new(PropertyType::String), rows(1)), WidgetKind::Text);
    }

    #[test]
    fn test_choice_beats_type() {
        let p = PropertySchema::new(PropertyType::Boolean).with_enum([true]);
        assert_eq!(kind_of(p.clone(), ControlOptions::default()), WidgetKind::Select);
        assert_eq!(kind_of(p, multi()), WidgetKind::Textarea);
    }

    #[test]
    fn test_format_override_wins() {
        let options = ControlOptions {
            format: Some("date".to_string()),
            multi: true,
            rows: Some(5),
        };
        let p = PropertySchema::new(PropertyType::String).with_enum(["a"]);
        assert_eq!(kind_of(p, options), WidgetKind::Custom("date".to_string()));

        let options = ControlOptions {
            format: Some("checkbox".to_string()),
            ..Default::default()
        };
        assert_eq!(kind_of(PropertySchema::new(PropertyType::String), options), WidgetKind::Checkbox);
    }

    #[test]
    fn test_empty_format_is_unset() {
        let empty = |multi| ControlOptions {
            format: Some(String::new()),
            multi,
            rows: None,
        };
        assert_eq!(kind_of(PropertySchema::new(PropertyType::Boolean), empty(false)), WidgetKind::Checkbox);
        assert_eq!(kind_of(PropertySchema::new(PropertyType::String), empty(true)), WidgetKind::Textarea);
    }
}
