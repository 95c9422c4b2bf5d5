//! # formtool
//!
//! Command-line host for the [`jsonform`] engine.
//!
//! `formtool` loads a form template (JSON or TOML), seeds it with saved data
//! and `--set` input, and then renders, validates, submits or drafts the form.
//!
//! ## Modules
//!
//! - [`ctx`] - Application context: loaded template and form state
//! - [`form`] - Command handlers
//! - [`utils`] - Input parsing and output helpers

/// Application context and state management.
pub mod ctx;

/// Handlers for the render, check, submit and draft commands.
pub mod form;

/// Common utilities and helper functions.
pub mod utils;

#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;
