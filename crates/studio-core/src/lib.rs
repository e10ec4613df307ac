//! # studio-core
//!
//! Prompt templating, dataset indexing requests and shared types for the
//! studio console.
//!
//! This crate is pure and synchronous apart from the service traits in
//! [`traits`]. It provides:
//! - Prompt variables, input values and the user input form converter
//! - A `{{key}}` template tokenizer with plain and HTML preview renderers
//! - Process rule, creation, reconfiguration and estimate payload builders
//! - The dataset creation wizard as an explicit state machine

pub mod defaults;
pub mod error;
pub mod indexing;
pub mod logging;
pub mod model_config;
pub mod models;
pub mod process_rule;
pub mod template;
pub mod traits;
pub mod wizard;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use indexing::*;
pub use model_config::{
    prompt_variables_to_user_inputs_form, user_inputs_form_to_prompt_variables, SelectField,
    TextInputField, UserInputFormItem,
};
pub use models::*;
pub use process_rule::*;
pub use template::{render_plain, render_preview, tokenize, Segment};
pub use traits::*;
pub use wizard::{reduce, WizardAction, WizardContext, WizardState};
