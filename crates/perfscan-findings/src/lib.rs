//! perfscan Finding Aggregator & Ranker
//!
//! Turns the raw output of one analysis request into the findings a caller
//! sees:
//! - Matches of the same category whose spans nest collapse into one
//!   finding reporting the outermost span and the highest severity
//! - Severity is the rule default adjusted by documented modifiers (loop
//!   depth, caller hints), so it is reproducible from the input alone
//! - Scopes classified O(n²) or worse become findings of their own, and
//!   every pattern finding in a non-constant scope carries the scope's class
//! - Output is ordered by severity, then position, then pattern id

mod aggregate;
mod finding;
mod hints;

pub use aggregate::{rank, AggregateSettings, Aggregator};
pub use finding::{ComplexityNote, Example, Finding, RelatedMatch, Suggestion};
pub use hints::AnalysisHints;
