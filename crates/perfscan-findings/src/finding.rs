//! Findings: the user-facing unit of a report
//!
//! A finding is built from one or more matches, or from a complexity
//! observation, and carries everything a front end needs to present it:
//! severity, span, message, an optional complexity annotation and an
//! optional remediation.

use std::fmt;

use perfscan_complexity::ComplexityClass;
use perfscan_isg::{ScopeId, Span};
use perfscan_rules::{Captures, Category, Severity};
use serde::Serialize;

/// A reported performance issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Pattern identifier: a rule id or a complexity pattern id
    pub id: &'static str,
    /// Human-readable pattern name (e.g. "N+1 query pattern")
    pub title: &'static str,
    pub category: Category,
    pub severity: Severity,
    /// Primary source span
    pub span: Span,
    /// Scope the span belongs to
    pub scope: ScopeId,
    pub message: String,
    /// Complexity of the enclosing scope, when it is not constant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complexity: Option<ComplexityNote>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<Suggestion>,
    /// Suggestion template key
    #[serde(skip)]
    pub template: &'static str,
    /// Identifiers available to the suggestion template
    pub captures: Captures,
    /// Matches merged into this finding
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<RelatedMatch>,
}

/// Complexity annotation, e.g. `O(n²): 2 nested loops at lines 3–9`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplexityNote {
    pub class: ComplexityClass,
    pub reason: String,
}

impl fmt::Display for ComplexityNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.class, self.reason)
    }
}

/// Another match collapsed into a finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedMatch {
    pub rule_id: &'static str,
    pub span: Span,
}

/// Remediation guidance for a finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    /// Language-independent advice, always present
    pub advice: String,
    /// Before/after code in the finding's language
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Example>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Example {
    pub before: String,
    pub after: String,
}

impl Finding {
    /// Create a new finding with no annotation, suggestion or captures
    pub fn new(
        id: &'static str,
        title: &'static str,
        category: Category,
        severity: Severity,
        span: Span,
        scope: ScopeId,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title,
            category,
            severity,
            span,
            scope,
            message: message.into(),
            complexity: None,
            suggestion: None,
            template: "",
            captures: Captures::new(),
            related: Vec::new(),
        }
    }

    pub fn with_template(mut self, template: &'static str) -> Self {
        self.template = template;
        self
    }

    pub fn with_captures(mut self, captures: Captures) -> Self {
        self.captures = captures;
        self
    }

    pub fn with_complexity(mut self, note: ComplexityNote) -> Self {
        self.complexity = Some(note);
        self
    }

    pub fn with_suggestion(mut self, suggestion: Suggestion) -> Self {
        self.suggestion = Some(suggestion);
        self
    }

    /// Add a merged match
    pub fn with_related(mut self, related: RelatedMatch) -> Self {
        self.related.push(related);
        self
    }

    /// Set severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Format the finding as plain text
    pub fn format_simple(&self) -> String {
        let mut output = format!(
            "{} [{}] {} at {}\n  {}\n",
            self.severity,
            self.id,
            self.title,
            self.span.lines(),
            self.message
        );

        if let Some(note) = &self.complexity {
            output.push_str(&format!("  complexity: {}\n", note));
        }

        if let Some(suggestion) = &self.suggestion {
            output.push_str(&format!("  advice: {}\n", suggestion.advice));
            if let Some(example) = &suggestion.example {
                output.push_str("  before:\n");
                output.push_str(&indent(&example.before, 4));
                output.push_str("  after:\n");
                output.push_str(&indent(&example.after, 4));
            }
        }

        for related in &self.related {
            output.push_str(&format!("  also: {} at {}\n", related.rule_id, related.span.lines()));
        }

        output
    }
}

fn indent(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.lines().map(|line| format!("{}{}\n", pad, line)).collect()
}
