//! Adapter error types

use perfscan_isg::Span;
use thiserror::Error;

/// Input errors: the ISG cannot be built, so no analysis happens
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    /// E-ADAPT-001: no mapping table registered for the tag
    #[error("unsupported language: {tag}")]
    UnsupportedLanguage { tag: String },

    /// E-ADAPT-002: the tree violates basic structural expectations
    #[error("malformed syntax tree: {reason}")]
    MalformedTree { reason: String, span: Span },
}

impl AdapterError {
    pub fn malformed(reason: impl Into<String>, span: Span) -> Self {
        AdapterError::MalformedTree {
            reason: reason.into(),
            span,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            AdapterError::UnsupportedLanguage { .. } => None,
            AdapterError::MalformedTree { span, .. } => Some(*span),
        }
    }

    /// Error code for machine-readable output
    pub fn code(&self) -> &'static str {
        match self {
            AdapterError::UnsupportedLanguage { .. } => "E-ADAPT-001",
            AdapterError::MalformedTree { .. } => "E-ADAPT-002",
        }
    }
}
