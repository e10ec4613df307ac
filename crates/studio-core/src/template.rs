//! Prompt template tokenizer and renderer.
//!
//! A template is free text containing `{{key}}` placeholders, where `key` is
//! any non-empty run of characters other than `}`. Rendering is two passes:
//! [`tokenize`] splits the template into literal and placeholder segments,
//! then a [`PlaceholderFormat`] turns each segment into output text.
//!
//! Every placeholder resolves the same way regardless of output format:
//!
//! 1. a non-empty input value for the key wins;
//! 2. otherwise a declared (valid) variable with that key renders as unset;
//! 3. otherwise the placeholder is passed through untouched.
//!
//! Rendering never fails. Unmatched or malformed placeholders come out as
//! literal text.
//!
//! # Example
//!
//! ```rust
//! use studio_core::template::{render_plain, render_preview};
//! use studio_core::{InputValues, PromptVariable};
//!
//! let vars = vec![PromptVariable::string("city", "City")];
//! let mut inputs = InputValues::new();
//!
//! assert_eq!(render_plain("Weather in {{city}}", &vars, &inputs), "Weather in {{City}}");
//!
//! inputs.set(&vars, "city", "Oslo");
//! assert_eq!(render_plain("Weather in {{city}}", &vars, &inputs), "Weather in Oslo");
//! assert!(render_preview("Weather in {{city}}", &vars, &inputs).contains("Oslo</span>"));
//! ```

use crate::models::{InputValues, PromptVariable};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Opening tag wrapped around a substituted value in the preview.
pub const RESOLVED_OPEN: &str = r#"<span class="prompt-var prompt-var-resolved">"#;

/// Opening tag wrapped around an unset variable's name in the preview.
pub const UNRESOLVED_OPEN: &str = r#"<span class="prompt-var prompt-var-unresolved">"#;

const MARKER_CLOSE: &str = "</span>";

/// One piece of a tokenized template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text outside any placeholder.
    Literal(&'a str),
    /// A `{{key}}` placeholder. `raw` is the full matched text.
    Placeholder { key: &'a str, raw: &'a str },
}

/// Split `template` into literal and placeholder segments.
///
/// Matches are found left to right and never overlap. Adjacent literal text
/// is always emitted as a single segment.
pub fn tokenize(template: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut cursor = 0;

    while let Some(offset) = template[cursor..].find(OPEN) {
        let open = cursor + offset;
        let key_start = open + OPEN.len();
        let key_end = template[key_start..]
            .find('}')
            .map_or(template.len(), |i| key_start + i);

        if key_end > key_start && template[key_end..].starts_with(CLOSE) {
            if literal_start < open {
                segments.push(Segment::Literal(&template[literal_start..open]));
            }
            let end = key_end + CLOSE.len();
            segments.push(Segment::Placeholder {
                key: &template[key_start..key_end],
                raw: &template[open..end],
            });
            cursor = end;
            literal_start = end;
        } else {
            // No placeholder starts here; retry one byte later ('{' is ASCII).
            cursor = open + 1;
        }
    }

    if literal_start < template.len() {
        segments.push(Segment::Literal(&template[literal_start..]));
    }

    segments
}

/// Distinct placeholder keys in order of first appearance.
pub fn placeholder_keys(template: &str) -> Vec<&str> {
    let mut keys: Vec<&str> = Vec::new();
    for segment in tokenize(template) {
        if let Segment::Placeholder { key, .. } = segment {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
    }
    keys
}

/// How a single placeholder resolved against the declared variables and the
/// current inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// A non-empty input value.
    Value(&'a str),
    /// A declared variable with no value set.
    Unset(&'a PromptVariable),
    /// No value and no declared variable; render the raw text.
    Unknown,
}

/// Resolve `key` against `values` first, then the valid declared variables.
pub fn resolve<'a>(
    key: &str,
    variables: &'a [PromptVariable],
    values: &'a InputValues,
) -> Resolution<'a> {
    if let Some(value) = values.value_for(key) {
        return Resolution::Value(value);
    }
    match variables.iter().find(|v| v.is_valid() && v.key == key) {
        Some(var) => Resolution::Unset(var),
        None => Resolution::Unknown,
    }
}

/// Output formatting for rendered segments.
pub trait PlaceholderFormat {
    /// Text outside placeholders.
    fn literal(&self, out: &mut String, text: &str);

    /// A placeholder that resolved to an input value.
    fn value(&self, out: &mut String, value: &str);

    /// A placeholder naming a declared variable without a value.
    fn unset(&self, out: &mut String, variable: &PromptVariable);

    /// A placeholder matching nothing. Defaults to the literal formatting of
    /// the raw `{{key}}` text.
    fn unknown(&self, out: &mut String, raw: &str) {
        self.literal(out, raw);
    }
}

/// Plain substitution used when building request bodies: values are inserted
/// verbatim and unset variables become `{{name}}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainFormat;

impl PlaceholderFormat for PlainFormat {
    fn literal(&self, out: &mut String, text: &str) {
        out.push_str(text);
    }

    fn value(&self, out: &mut String, value: &str) {
        out.push_str(value);
    }

    fn unset(&self, out: &mut String, variable: &PromptVariable) {
        out.push_str(OPEN);
        out.push_str(&variable.name);
        out.push_str(CLOSE);
    }
}

/// HTML preview for on-screen display. Angle brackets are escaped, newlines
/// become `<br>`, and resolved/unset placeholders are wrapped in styled
/// inline markers.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreviewFormat;

impl PreviewFormat {
    fn push_escaped(out: &mut String, text: &str) {
        for ch in text.chars() {
            match ch {
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '\n' => out.push_str("<br>"),
                _ => out.push(ch),
            }
        }
    }
}

impl PlaceholderFormat for PreviewFormat {
    fn literal(&self, out: &mut String, text: &str) {
        Self::push_escaped(out, text);
    }

    fn value(&self, out: &mut String, value: &str) {
        out.push_str(RESOLVED_OPEN);
        Self::push_escaped(out, value);
        out.push_str(MARKER_CLOSE);
    }

    fn unset(&self, out: &mut String, variable: &PromptVariable) {
        out.push_str(UNRESOLVED_OPEN);
        Self::push_escaped(out, &variable.name);
        out.push_str(MARKER_CLOSE);
    }
}

/// Render `template` with an arbitrary output format.
pub fn render_with<F: PlaceholderFormat + ?Sized>(
    format: &F,
    template: &str,
    variables: &[PromptVariable],
    values: &InputValues,
) -> String {
    let mut out = String::with_capacity(template.len());
    for segment in tokenize(template) {
        match segment {
            Segment::Literal(text) => format.literal(&mut out, text),
            Segment::Placeholder { key, raw } => match resolve(key, variables, values) {
                Resolution::Value(value) => format.value(&mut out, value),
                Resolution::Unset(var) => format.unset(&mut out, var),
                Resolution::Unknown => format.unknown(&mut out, raw),
            },
        }
    }
    out
}

/// Plain rendering, see [`PlainFormat`].
pub fn render_plain(template: &str, variables: &[PromptVariable], values: &InputValues) -> String {
    render_with(&PlainFormat, template, variables, values)
}

/// HTML preview rendering, see [`PreviewFormat`].
pub fn render_preview(
    template: &str,
    variables: &[PromptVariable],
    values: &InputValues,
) -> String {
    render_with(&PreviewFormat, template, variables, values)
}
