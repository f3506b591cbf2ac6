//! perfscan - static pattern and complexity analysis over parsed syntax trees
//!
//! This is the root workspace crate that carries the end-to-end tests.
//! The implementation lives in the workspace member crates.

// Re-export member crates for convenience
pub use perfscan_adapter as adapter;
pub use perfscan_complexity as complexity;
pub use perfscan_engine as engine;
pub use perfscan_findings as findings;
pub use perfscan_isg as isg;
pub use perfscan_rules as rules;
pub use perfscan_suggest as suggest;

pub use perfscan_engine::{analyze, AnalysisError, AnalysisHints, AnalysisRequest, Analyzer, EngineConfig, Report};
