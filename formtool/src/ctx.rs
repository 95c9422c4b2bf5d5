//! Application context and state management.
//!
//! This module provides the [`AppContext`] type which holds the loaded form
//! template, the live form state and the paths the command was given.

use std::path::PathBuf;

use jsonform::{
    FormStore, FormTemplate, LayoutNode, RenderNode, WidgetRegistry,
    data::{FormValues, template::load_values},
};

use crate::utils::{Assignment, input_value};

/// Path configuration grouping all path-related fields.
#[derive(Debug, Default, Clone)]
pub struct PathConfig {
    /// Form template file.
    pub template: PathBuf,
    /// Saved values layered over the template's own data.
    pub data: Option<PathBuf>,
    /// Where submitted or drafted values are written; stdout when unset.
    pub output: Option<PathBuf>,
}

/// The main application context holding all state.
#[derive(Debug)]
pub struct AppContext {
    pub paths: PathConfig,
    pub template: FormTemplate,
    pub layout: LayoutNode,
    pub store: FormStore,
    pub widgets: WidgetRegistry,
}

impl AppContext {
    /// Loads the template and seeds the form with its data and the data file.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or parsed, or the schema's
    /// rules cannot be compiled.
    pub fn load(paths: PathConfig) -> anyhow::Result<Self> {
        let mut template = FormTemplate::load(&paths.template)?;

        if let Some(path) = &paths.data {
            let saved = load_values(path)?;
            debug!("loaded {} saved value(s) from {}", saved.len(), path.display());
            template.form_data.get_or_insert_default().extend(saved);
        }

        let store = FormStore::from_template(&template)?;
        let layout = template.layout();
        info!(
            "loaded form `{}` with {} field(s)",
            template.title().unwrap_or(&template.form_id),
            store.schema().properties.len()
        );

        Ok(Self {
            paths,
            template,
            layout,
            store,
            widgets: WidgetRegistry::default(),
        })
    }

    /// Feeds `--set` assignments through the form as user input.
    ///
    /// Each assigned field is also marked touched, so its error shows.
    ///
    /// # Errors
    ///
    /// Returns an error for a name the schema does not declare.
    pub fn apply(&mut self, assignments: &[Assignment]) -> anyhow::Result<()> {
        for assignment in assignments {
            let Some(property) = self.store.schema().property(&assignment.name) else {
                bail!("unknown field `{}`", assignment.name);
            };
            let value = input_value(property, &assignment.raw);
            self.store.set_value(&assignment.name, value);
            self.store.set_touched(&assignment.name);
        }
        Ok(())
    }

    pub fn render(&self) -> Option<RenderNode> {
        self.store.render(&self.layout, &self.widgets)
    }

    pub fn values(&self) -> &FormValues {
        self.store.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonform::{FieldError, Value};
    use serde_json::json;
    use std::fs;

    const TEMPLATE: &str = r#"{
        "formId": "consignment",
        "title": "Consignment",
        "jsonSchema": {
            "type": "object",
            "properties": {
                "exporter": {"type": "string", "title": "Exporter"},
                "qty": {"type": "number"},
                "dangerous": {"type": "boolean"}
            },
            "required": ["exporter", "qty"]
        },
        "formData": {"exporter": "ACME"}
    }"#;

    fn paths(dir: &tempfile::TempDir, data: Option<&str>) -> PathConfig {
        let template = dir.path().join("form.json");
        fs::write(&template, TEMPLATE).unwrap();
        let data = data.map(|content| {
            let path = dir.path().join("data.toml");
            fs::write(&path, content).unwrap();
            path
        });
        PathConfig {
            template,
            data,
            output: None,
        }
    }

    #[test]
    fn test_load_layers_data() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = AppContext::load(paths(&dir, Some("qty = 3\nunknown = 1\n"))).unwrap();

        assert_eq!(ctx.values()["exporter"], json!("ACME"));
        assert_eq!(ctx.values()["qty"], json!(3));
        assert_eq!(ctx.values()["dangerous"], json!(false));
        assert!(!ctx.values().contains_key("unknown"));
        assert!(ctx.store.is_valid());
    }

    #[test]
    fn test_apply_assignments() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = AppContext::load(paths(&dir, None)).unwrap();

        let sets: Vec<Assignment> = ["qty=abc", "dangerous=true"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        ctx.apply(&sets).unwrap();

        assert_eq!(ctx.values()["dangerous"], Value::Bool(true));
        assert!(ctx.store.is_touched("qty"));
        assert_eq!(
            ctx.store.error("qty"),
            Some(&FieldError::InvalidType {
                expected: jsonform::PropertyType::Number
            })
        );

        let unknown: Assignment = "nope=1".parse().unwrap();
        assert!(ctx.apply(&[unknown]).is_err());
    }

    #[test]
    fn test_render_uses_default_layout() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = AppContext::load(paths(&dir, None)).unwrap();
        let text = ctx.render().unwrap().to_string();
        assert_eq!(text, "Exporter *: ACME\nqty *:\n[ ] dangerous");
    }
}
