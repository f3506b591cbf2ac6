//! perfscan Pattern Rule Engine
//!
//! Holds the registry of anti-pattern rules and evaluates them against an
//! ISG. Each rule is a self-contained structural predicate implementing
//! [`Rule`]; rules never depend on each other, so evaluation is parallel.
//!
//! # Rules
//!
//! The built-in catalog (see [`RuleRegistry::builtin`]) covers N+1 queries,
//! queries, blocking I/O, copies, collection mutation and construction,
//! linear search, string building, regex construction, sorting, unbounded
//! growth, sequential awaits, DOM queries, serialization, formatting and
//! locking inside loops.
//!
//! # Usage
//!
//! ```ignore
//! use perfscan_rules::{evaluate, RuleRegistry, RuleSettings};
//! use perfscan_isg::Budget;
//!
//! let index = isg.index();
//! let evaluation = evaluate(RuleRegistry::builtin(), &index, &RuleSettings::default(), Budget::unlimited());
//! for m in &evaluation.matches {
//!     println!("{} at {}", m.rule_id, m.span.lines());
//! }
//! ```

pub mod catalog;
mod evaluate;
mod registry;
mod rule;

pub use evaluate::{evaluate, Evaluation};
pub use registry::RuleRegistry;
pub use rule::*;
