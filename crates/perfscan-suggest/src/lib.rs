//! perfscan Suggestion Synthesizer
//!
//! Maps a finding's template key to remediation guidance:
//! - Advice text, available for every key in every language
//! - A before/after example in the finding's language, filled from the
//!   identifiers its rule captured
//!
//! Rendering fails closed. When no example exists for the language or a
//! required capture is missing, the finding keeps its advice and simply
//! has no example; it is never dropped.

mod render;
mod templates;

pub use render::{fill, placeholders, TemplateError, PLACEHOLDERS};
pub use templates::{advice_for, examples_for, ExampleTemplate, ADVICE, EXAMPLES};

use perfscan_findings::{Example, Finding, Suggestion};
use perfscan_isg::Language;
use perfscan_rules::Captures;

/// Render the first example for `key` whose placeholders can all be filled
///
/// `Ok(None)` means the language has no example for this key.
pub fn render_example(key: &str, language: Language, captures: &Captures) -> Result<Option<Example>, TemplateError> {
    if advice_for(key).is_none() {
        return Err(TemplateError::UnknownTemplate { key: key.to_string() });
    }
    let mut last_error = None;
    for template in examples_for(key, language) {
        let rendered = fill(key, template.before, captures)
            .and_then(|before| fill(key, template.after, captures).map(|after| Example { before, after }));
        match rendered {
            Ok(example) => return Ok(Some(example)),
            Err(err) => last_error = Some(err),
        }
    }
    match last_error {
        Some(err) => Err(err),
        None => Ok(None),
    }
}

/// Advice and, when it can be rendered, an example for one finding
pub fn suggest(finding: &Finding, language: Language) -> Suggestion {
    let advice = advice_for(finding.template)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Review this {}.", finding.title));
    let example = render_example(finding.template, language, &finding.captures)
        .ok()
        .flatten();
    Suggestion { advice, example }
}

/// Attach a suggestion to every finding
pub fn attach_suggestions(findings: &mut [Finding], language: Language) {
    for finding in findings.iter_mut() {
        let suggestion = suggest(finding, language);
        finding.suggestion = Some(suggestion);
    }
}
