//! perfscan engine: one call from syntax tree to ranked findings
//!
//! The pipeline for a request:
//! 1. Adapt the language-specific tree into an ISG (input errors stop here)
//! 2. Evaluate the rule catalog and estimate per-scope complexity
//!    concurrently over the same immutable ISG
//! 3. Aggregate matches and complexity results into ranked findings
//! 4. Attach remediation suggestions
//! 5. Summarize every scope with its class and a testability score
//!
//! The engine never logs and holds no state between requests.
//!
//! # Example
//!
//! ```ignore
//! use perfscan_adapter::parse_sexp;
//! use perfscan_engine::{analyze, AnalysisRequest};
//!
//! let tree = parse_sexp("(module)")?;
//! let report = analyze(&AnalysisRequest::new("python", &tree))?;
//! assert!(report.findings.is_empty());
//! ```

mod analyzer;
mod config;
mod error;
mod report;

pub use analyzer::{analyze, AnalysisRequest, Analyzer};
pub use config::{ConfigError, EngineConfig, Thresholds};
pub use error::AnalysisError;
pub use report::{summarize, testability_score, Report, ScopeSummary};

pub use perfscan_findings::{AnalysisHints, Finding};
pub use perfscan_rules::Severity;
