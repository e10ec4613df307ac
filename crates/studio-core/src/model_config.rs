//! Conversion between prompt variables and the app's user input form.
//!
//! The backend stores an app's inputs as a list of single-key objects, one
//! per variable, keyed by control type:
//!
//! ```json
//! [
//!   {"text-input": {"label": "Name", "variable": "name", "required": true, "max_length": 48, "default": ""}},
//!   {"select": {"label": "Tone", "variable": "tone", "required": false, "options": ["a", "b"], "default": ""}}
//! ]
//! ```

use serde::{Deserialize, Serialize};

use crate::models::{default_required, PromptVariable, VariableType};

/// Settings of a `text-input` or `paragraph` form control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextInputField {
    pub label: String,
    pub variable: String,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default)]
    pub default: String,
}

/// Settings of a `select` form control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectField {
    pub label: String,
    pub variable: String,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub default: String,
}

/// One entry of an app's user input form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserInputFormItem {
    #[serde(rename = "text-input")]
    TextInput(TextInputField),
    #[serde(rename = "paragraph")]
    Paragraph(TextInputField),
    #[serde(rename = "select")]
    Select(SelectField),
}

impl UserInputFormItem {
    /// Variable key this control fills.
    pub fn variable(&self) -> &str {
        match self {
            Self::TextInput(f) | Self::Paragraph(f) => &f.variable,
            Self::Select(f) => &f.variable,
        }
    }
}

/// Convert a stored user input form into prompt variables. A missing form
/// yields no variables.
pub fn user_inputs_form_to_prompt_variables(
    form: Option<&[UserInputFormItem]>,
) -> Vec<PromptVariable> {
    let Some(form) = form else {
        return Vec::new();
    };

    form.iter()
        .map(|item| match item {
            UserInputFormItem::TextInput(field) | UserInputFormItem::Paragraph(field) => {
                let var_type = if matches!(item, UserInputFormItem::Paragraph(_)) {
                    VariableType::Paragraph
                } else {
                    VariableType::String
                };
                PromptVariable {
                    key: field.variable.clone(),
                    name: field.label.clone(),
                    var_type,
                    required: field.required,
                    max_length: field.max_length,
                    options: Vec::new(),
                }
            }
            UserInputFormItem::Select(field) => PromptVariable {
                key: field.variable.clone(),
                name: field.label.clone(),
                var_type: VariableType::Select,
                required: field.required,
                max_length: None,
                options: field.options.clone(),
            },
        })
        .collect()
}

/// Convert prompt variables into the stored user input form. Variables with
/// a blank key or name are dropped and every default value starts empty.
pub fn prompt_variables_to_user_inputs_form(variables: &[PromptVariable]) -> Vec<UserInputFormItem> {
    variables
        .iter()
        .filter(|v| v.is_valid())
        .map(|v| match v.var_type {
            VariableType::String | VariableType::Paragraph => {
                let field = TextInputField {
                    label: v.name.clone(),
                    variable: v.key.clone(),
                    required: v.required,
                    max_length: v.max_length,
                    default: String::new(),
                };
                if v.var_type == VariableType::String {
                    UserInputFormItem::TextInput(field)
                } else {
                    UserInputFormItem::Paragraph(field)
                }
            }
            VariableType::Select => UserInputFormItem::Select(SelectField {
                label: v.name.clone(),
                variable: v.key.clone(),
                required: v.required,
                options: v.options.clone(),
                default: String::new(),
            }),
        })
        .collect()
}
