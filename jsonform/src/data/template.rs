use std::{fs, path::Path};

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::data::{FormValues, layout::LayoutNode, schema::DataSchema};

/// A complete form description as delivered by the workflow backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormTemplate {
    /// Unique identifier of the form.
    #[serde(default)]
    pub form_id: String,
    /// Display title, falls back to the data schema title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Data schema defining properties and validation.
    #[serde(alias = "schema")]
    pub json_schema: DataSchema,
    /// Layout; a default layout is generated when absent.
    #[serde(default, alias = "uischema", skip_serializing_if = "Option::is_none")]
    pub ui_schema: Option<LayoutNode>,
    /// Pre-filled values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_data: Option<FormValues>,
}

/// Versioned screen payload: `{ "version": 0.1, "content": { "schema", "uischema" } }`.
#[derive(Debug, Deserialize)]
struct FormPayload {
    #[serde(default)]
    version: Value,
    content: FormPayloadContent,
}

#[derive(Debug, Deserialize)]
struct FormPayloadContent {
    schema: DataSchema,
    #[serde(default)]
    uischema: Option<LayoutNode>,
    #[serde(default)]
    data: Option<FormValues>,
}

impl From<FormPayload> for FormTemplate {
    fn from(payload: FormPayload) -> Self {
        FormTemplate {
            form_id: String::new(),
            title: None,
            json_schema: payload.content.schema,
            ui_schema: payload.content.uischema,
            form_data: payload.content.data,
        }
    }
}

impl FormTemplate {
    pub fn new(json_schema: DataSchema) -> Self {
        Self {
            form_id: String::new(),
            title: None,
            json_schema,
            ui_schema: None,
            form_data: None,
        }
    }

    pub fn with_layout(mut self, layout: LayoutNode) -> Self {
        self.ui_schema = Some(layout);
        self
    }

    /// Build a template from a parsed document, accepting both the
    /// command-set shape and the versioned payload shape.
    pub fn from_value(value: Value) -> anyhow::Result<Self> {
        let mut template = if value.get("content").is_some() {
            let payload: FormPayload =
                serde_json::from_value(value).context("invalid form payload")?;
            debug!("loaded form payload version {}", payload.version);
            FormTemplate::from(payload)
        } else {
            serde_json::from_value::<FormTemplate>(value).context("invalid form template")?
        };
        template.json_schema.normalize();
        Ok(template)
    }

    /// Parse template content written as `json` or `toml`.
    pub fn from_str(content: &str, ext: &str) -> anyhow::Result<Self> {
        Self::from_value(parse_document(content, ext)?)
    }

    /// Load a template file, choosing the format by extension.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_str(&content, extension(path))
            .with_context(|| format!("Failed to load form template {}", path.display()))
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().or(self.json_schema.title.as_deref())
    }

    /// The UI schema, or the generated default layout.
    pub fn layout(&self) -> LayoutNode {
        self.ui_schema
            .clone()
            .unwrap_or_else(|| LayoutNode::for_schema(&self.json_schema))
    }
}

/// Load a value map (`json` or `toml`) such as saved form data.
pub fn load_values(path: impl AsRef<Path>) -> anyhow::Result<FormValues> {
    let path = path.as_ref();
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(FormValues::new());
    }
    let value = parse_document(&content, extension(path))?;
    serde_json::from_value(value)
        .with_context(|| format!("{} is not a map of values", path.display()))
}

fn parse_document(content: &str, ext: &str) -> anyhow::Result<Value> {
    let value = match ext {
        "json" => serde_json::from_str(content)?,
        "toml" => {
            let v: toml::Value = toml::from_str(content)?;
            serde_json::to_value(v)?
        }
        ext => {
            bail!("Unsupported file extension: {ext:?}");
        }
    };
    Ok(value)
}

fn extension(path: &Path) -> &str {
    path.extension().and_then(|s| s.to_str()).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::property::{PropertySchema, PropertyType};
    use serde_json::json;

    const TRADER_FORM: &str = r##"{
        "formId": "export-permit",
        "title": "Export Permit",
        "jsonSchema": {
            "type": "object",
            "properties": {
                "exporter": {"type": "string"},
                "quantity": {"type": "number"}
            },
            "required": ["exporter"]
        },
        "uiSchema": {
            "type": "VerticalLayout",
            "elements": [{"type": "Control", "scope": "#/properties/exporter"}]
        },
        "formData": {"exporter": "ACME"}
    }"##;

    #[test]
    fn test_command_set_shape() {
        let t = FormTemplate::from_str(TRADER_FORM, "json").unwrap();
        assert_eq!(t.form_id, "export-permit");
        assert_eq!(t.title(), Some("Export Permit"));
        assert!(t.json_schema.is_required("exporter"));
        assert_eq!(t.form_data.unwrap()["exporter"], json!("ACME"));
    }

    #[test]
    fn test_payload_shape() {
        let t = FormTemplate::from_value(json!({
            "version": 2,
            "content": {
                "schema": {"title": "Permit", "properties": {"ok": {"type": "boolean"}}},
                "uischema": {"type": "VerticalLayout", "elements": []}
            }
        }))
        .unwrap();
        assert_eq!(t.title(), Some("Permit"));
        assert_eq!(t.json_schema.property("ok").unwrap().ty, PropertyType::Boolean);
        assert_eq!(t.layout(), LayoutNode::vertical(vec![]));
    }

    #[test]
    fn test_built_template() {
        let schema = DataSchema::new()
            .with_title("Permit")
            .with_property("qty", PropertySchema::new(PropertyType::Number));
        let layout = LayoutNode::group(Some("Goods"), vec![LayoutNode::control("#/properties/qty")]);

        let plain = FormTemplate::new(schema.clone());
        assert_eq!(plain.title(), Some("Permit"));
        assert_eq!(plain.layout(), LayoutNode::for_schema(&schema));

        let laid_out = FormTemplate::new(schema).with_layout(layout.clone());
        assert_eq!(laid_out.layout(), layout);
    }

    #[test]
    fn test_payload_fractional_version() {
        let t = FormTemplate::from_value(json!({
            "version": 0.1,
            "content": {
                "schema": {"type": "object", "properties": {"qty": {"type": "number"}}}
            }
        }))
        .unwrap();
        assert!(t.json_schema.property("qty").is_some());
        assert_eq!(t.layout(), LayoutNode::vertical(vec![LayoutNode::control("#/properties/qty")]));
    }

    #[test]
    fn test_toml_template_default_layout() {
        let content = r#"
formId = "cert"

[jsonSchema.properties.origin]
type = "string"
enum = ["AU", "US"]
"#;
        let t = FormTemplate::from_str(content, "toml").unwrap();
        assert_eq!(
            t.layout(),
            LayoutNode::vertical(vec![LayoutNode::control("#/properties/origin")])
        );
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(FormTemplate::from_str("{}", "yaml").is_err());
    }

    #[test]
    fn test_load_files() {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = tempfile::tempdir().unwrap();
        let template_path = dir.path().join("permit.json");
        fs::write(&template_path, TRADER_FORM).unwrap();
        let t = FormTemplate::load(&template_path).unwrap();
        assert_eq!(t.form_id, "export-permit");

        let values_path = dir.path().join("values.toml");
        fs::write(&values_path, "exporter = \"ACME\"\nquantity = 3\n").unwrap();
        let values = load_values(&values_path).unwrap();
        assert_eq!(values["quantity"], json!(3));

        let empty_path = dir.path().join("empty.json");
        fs::write(&empty_path, "  \n").unwrap();
        assert!(load_values(&empty_path).unwrap().is_empty());
    }
}
