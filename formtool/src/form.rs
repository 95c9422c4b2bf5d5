//! Command handlers.
//!
//! Each handler works on a loaded [`AppContext`]:
//!
//! - render: print the form as text
//! - check: validate the whole form
//! - submit: validate, coerce and write the submitted values
//! - draft: write the raw values without validation

use anyhow::Result;
use colored::Colorize;
use jsonform::{FormErrors, SubmitOutcome};

use crate::{ctx::AppContext, utils::write_values};

/// Handler for form operations.
pub struct FormCommandHandler;

impl FormCommandHandler {
    /// Prints the render tree.
    ///
    /// With `validate`, the whole form is validated first so that every
    /// error is shown, not only those of touched fields.
    pub fn handle_render(ctx: &mut AppContext, validate: bool) -> Result<()> {
        if validate {
            ctx.store.validate_form();
        }

        if let Some(title) = ctx.template.title() {
            println!("{}", title.bold());
        }
        match ctx.render() {
            Some(tree) => println!("{tree}"),
            None => warn!("the layout has no renderable elements"),
        }
        Ok(())
    }

    /// Validates the whole form and reports the result.
    ///
    /// # Errors
    ///
    /// Returns an error when any field is invalid.
    pub fn handle_check(ctx: &mut AppContext) -> Result<()> {
        if ctx.store.validate_form() {
            println!("{}", "form is valid".green());
            return Ok(());
        }
        print_errors(ctx.store.errors());
        bail!("{} invalid field(s)", ctx.store.errors().len())
    }

    /// Runs the submission pipeline, writing the coerced values.
    ///
    /// # Errors
    ///
    /// Returns an error when the form is invalid or the output cannot be
    /// written.
    pub async fn handle_submit(ctx: &mut AppContext) -> Result<()> {
        let output = ctx.paths.output.clone();
        let outcome = ctx
            .store
            .handle_submit(|values| async move { write_values(output.as_deref(), &values).await })
            .await?;

        match outcome {
            SubmitOutcome::Submitted => {
                println!("{}", "submitted".green());
                Ok(())
            }
            SubmitOutcome::Invalid => {
                print_errors(ctx.store.errors());
                bail!(
                    "submission blocked by {} invalid field(s)",
                    ctx.store.errors().len()
                )
            }
        }
    }

    /// Writes the raw values as a draft.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    pub async fn handle_draft(ctx: &mut AppContext) -> Result<()> {
        let output = ctx.paths.output.as_deref();
        ctx.store
            .save_draft(|values| async move { write_values(output, &values).await })
            .await?;
        println!("{}", "draft saved".yellow());
        Ok(())
    }
}

fn print_errors(errors: &FormErrors) {
    for (name, error) in errors {
        eprintln!("{}: {}", name.bold(), error.to_string().red());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ctx::PathConfig, utils::Assignment};
    use jsonform::Value;
    use serde_json::json;
    use std::fs;

    const TEMPLATE: &str = r#"
formId = "consignment"

[jsonSchema]
type = "object"
required = ["qty"]

[jsonSchema.properties.qty]
type = "integer"

[jsonSchema.properties.note]
type = "string"
"#;

    fn context(dir: &tempfile::TempDir, sets: &[&str]) -> AppContext {
        let template = dir.path().join("form.toml");
        fs::write(&template, TEMPLATE).unwrap();
        let mut ctx = AppContext::load(PathConfig {
            template,
            data: None,
            output: Some(dir.path().join("out.json")),
        })
        .unwrap();
        let sets: Vec<Assignment> = sets.iter().map(|s| s.parse().unwrap()).collect();
        ctx.apply(&sets).unwrap();
        ctx
    }

    fn written(dir: &tempfile::TempDir) -> Value {
        serde_json::from_str(&fs::read_to_string(dir.path().join("out.json")).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_submit_writes_coerced_values() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(&dir, &["qty=12", "note=fragile"]);

        FormCommandHandler::handle_submit(&mut ctx).await.unwrap();

        assert_eq!(written(&dir), json!({"qty": 12, "note": "fragile"}));
        assert!(!ctx.store.is_submitting());
    }

    #[tokio::test]
    async fn test_invalid_submit_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(&dir, &["qty=1.5"]);

        assert!(FormCommandHandler::handle_submit(&mut ctx).await.is_err());
        assert!(!dir.path().join("out.json").exists());
        assert!(ctx.store.error("qty").is_some());
    }

    #[tokio::test]
    async fn test_draft_keeps_raw_input() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(&dir, &["qty=twelve"]);

        FormCommandHandler::handle_draft(&mut ctx).await.unwrap();

        assert_eq!(written(&dir), json!({"qty": "twelve", "note": ""}));
    }

    #[test]
    fn test_check() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(&dir, &[]);
        assert!(FormCommandHandler::handle_check(&mut ctx).is_err());
        assert!(ctx.store.is_touched("note"));

        let mut ctx = context(&dir, &["qty=7"]);
        assert!(FormCommandHandler::handle_check(&mut ctx).is_ok());
    }
}
