//! Errors surfaced to callers of the engine

use perfscan_adapter::AdapterError;
use perfscan_isg::Span;
use thiserror::Error;

use crate::Report;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// E-ANALYSIS-001: the language tag has no registered adapter
    #[error("unsupported language: {tag}")]
    UnsupportedLanguage { tag: String },

    /// E-ANALYSIS-002: the input tree could not be trusted; no findings
    #[error("malformed syntax tree: {reason}")]
    MalformedTree { reason: String, span: Span },

    /// E-ANALYSIS-003: the budget expired; `partial` holds what finished
    #[error("analysis exceeded its {budget_ms} ms budget")]
    AnalysisTimeout { budget_ms: u64, partial: Box<Report> },
}

impl AnalysisError {
    pub fn code(&self) -> &'static str {
        match self {
            AnalysisError::UnsupportedLanguage { .. } => "E-ANALYSIS-001",
            AnalysisError::MalformedTree { .. } => "E-ANALYSIS-002",
            AnalysisError::AnalysisTimeout { .. } => "E-ANALYSIS-003",
        }
    }

    /// The partial report of a timeout
    pub fn partial_report(&self) -> Option<&Report> {
        match self {
            AnalysisError::AnalysisTimeout { partial, .. } => Some(partial.as_ref()),
            _ => None,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            AnalysisError::MalformedTree { span, .. } => Some(*span),
            _ => None,
        }
    }
}

impl From<AdapterError> for AnalysisError {
    fn from(error: AdapterError) -> Self {
        match error {
            AdapterError::UnsupportedLanguage { tag } => AnalysisError::UnsupportedLanguage { tag },
            AdapterError::MalformedTree { reason, span } => AnalysisError::MalformedTree { reason, span },
        }
    }
}
