//! Placeholder substitution

use perfscan_rules::Captures;
use thiserror::Error;

/// Placeholders a template may use; each names a rule capture
pub const PLACEHOLDERS: &[&str] = &[
    "callee", "receiver", "loop_var", "iterable", "target", "source", "scope", "release",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template `{key}` needs capture `{placeholder}`")]
    MissingCapture { key: String, placeholder: String },

    #[error("template `{key}` uses unknown placeholder `{placeholder}`")]
    UnknownPlaceholder { key: String, placeholder: String },

    #[error("no suggestion template named `{key}`")]
    UnknownTemplate { key: String },
}

impl TemplateError {
    pub fn code(&self) -> &'static str {
        match self {
            TemplateError::MissingCapture { .. } => "E-SUGGEST-001",
            TemplateError::UnknownPlaceholder { .. } => "E-SUGGEST-002",
            TemplateError::UnknownTemplate { .. } => "E-SUGGEST-003",
        }
    }
}

/// Replace every `{name}` slot in `text` with the capture of that name
///
/// Braces that do not enclose a lowercase identifier (code blocks, `{}`
/// format strings) are copied as they are.
pub fn fill(key: &str, text: &str, captures: &Captures) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match placeholder_at(after) {
            Some(name) => {
                if !PLACEHOLDERS.contains(&name) {
                    return Err(TemplateError::UnknownPlaceholder {
                        key: key.to_string(),
                        placeholder: name.to_string(),
                    });
                }
                let value = captures.text(name).ok_or_else(|| TemplateError::MissingCapture {
                    key: key.to_string(),
                    placeholder: name.to_string(),
                })?;
                out.push_str(value);
                rest = &after[name.len() + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    Ok(out)
}

/// Placeholder names used by `text`, in order of appearance
pub fn placeholders(text: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match placeholder_at(after) {
            Some(name) => {
                names.push(name);
                rest = &after[name.len() + 1..];
            }
            None => rest = after,
        }
    }
    names
}

/// `name` when `text` starts with `name}` and name is `[a-z_]+`
fn placeholder_at(text: &str) -> Option<&str> {
    let close = text.find('}')?;
    let name = &text[..close];
    let valid = !name.is_empty() && name.chars().all(|c| c.is_ascii_lowercase() || c == '_');
    valid.then_some(name)
}
