use std::borrow::Cow;

use crate::data::{Control, ControlLabel, ControlOptions, DataSchema, PropertySchema};

/// A control matched to its schema property.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedControl<'a> {
    /// Property name as declared in the schema.
    pub name: &'a str,
    /// Display label; empty when the control hides it.
    pub label: String,
    pub property: &'a PropertySchema,
    pub required: bool,
    pub options: &'a ControlOptions,
}

/// Property name referenced by a scope: its final path segment,
/// JSON-pointer unescaped (`#/properties/a~1b` names `a/b`).
pub fn scope_to_property_name(scope: &str) -> Cow<'_, str> {
    let segment = scope.rsplit('/').next().unwrap_or(scope);
    if segment.contains('~') {
        Cow::Owned(segment.replace("~1", "/").replace("~0", "~"))
    } else {
        Cow::Borrowed(segment)
    }
}

/// Resolve `control` against `schema`.
///
/// Returns `None` when the scope names no declared property; the control
/// then does not apply to this form.
pub fn resolve<'a>(control: &'a Control, schema: &'a DataSchema) -> Option<ResolvedControl<'a>> {
    let name = scope_to_property_name(&control.scope);
    let Some((name, property)) = schema.properties.get_key_value(name.as_ref()) else {
        debug!("control scope `{}` does not resolve, skipping", control.scope);
        return None;
    };

    let label = match &control.label {
        ControlLabel::Hidden => String::new(),
        ControlLabel::Text(text) => text.clone(),
        ControlLabel::Inherit => property.title.clone().unwrap_or_else(|| name.clone()),
    };

    Some(ResolvedControl {
        name: name.as_str(),
        label,
        property,
        required: schema.is_required(name),
        options: &control.options,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PropertyType;

    fn schema() -> DataSchema {
        DataSchema::new()
            .with_property(
                "consignee",
                PropertySchema::new(PropertyType::String).with_title("Consignee Name"),
            )
            .with_property("weight", PropertySchema::new(PropertyType::Number))
            .with_property("a/b", PropertySchema::new(PropertyType::String))
            .with_required("consignee")
    }

    #[test]
    fn test_scope_segments() {
        assert_eq!(scope_to_property_name("#/properties/weight"), "weight");
        assert_eq!(scope_to_property_name("weight"), "weight");
        assert_eq!(scope_to_property_name("#/properties/a~1b"), "a/b");
        assert_eq!(scope_to_property_name("#/properties/x~0y"), "x~y");
    }

    #[test]
    fn test_label_priority() {
        let schema = schema();

        let inherit = Control::new("#/properties/consignee");
        let resolved = resolve(&inherit, &schema).unwrap();
        assert_eq!(resolved.label, "Consignee Name");
        assert!(resolved.required);

        let no_title = Control::new("#/properties/weight");
        let resolved = resolve(&no_title, &schema).unwrap();
        assert_eq!(resolved.label, "weight");
        assert!(!resolved.required);

        let explicit = Control::new("#/properties/consignee").with_label("Receiver");
        assert_eq!(resolve(&explicit, &schema).unwrap().label, "Receiver");

        let hidden = Control::new("#/properties/consignee").hide_label();
        assert_eq!(resolve(&hidden, &schema).unwrap().label, "");
    }

    #[test]
    fn test_escaped_scope() {
        let schema = schema();
        let control = Control::new("#/properties/a~1b");
        assert_eq!(resolve(&control, &schema).unwrap().name, "a/b");
    }

    #[test]
    fn test_missing_property() {
        let schema = schema();
        let control = Control::new("#/properties/ghost");
        assert!(resolve(&control, &schema).is_none());
    }
}
