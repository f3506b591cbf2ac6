//! perfscan complexity: asymptotic classes per scope
//!
//! This crate implements the Complexity Estimator:
//! - Walk each scope's loop structure, nesting input-dependent loops and
//!   sequencing independent ones
//! - Recognize halving/doubling loops as logarithmic
//! - Classify self-recursion (linear, halving, traversal, divide-and-conquer,
//!   memoized, branching)
//! - Mark scopes `indeterminate` when a loop or recursion has no conclusive
//!   structural bound
//!
//! # Example
//!
//! ```ignore
//! use perfscan_adapter::{adapt, parse_sexp};
//! use perfscan_complexity::{estimate, ComplexityClass};
//! use perfscan_isg::Budget;
//!
//! let tree = parse_sexp(r#"(module (for_statement left: (identifier "x") right: (identifier "xs")
//!     body: (block (for_statement left: (identifier "y") right: (identifier "ys") body: (block)))))"#)?;
//! let isg = adapt("python", &tree)?;
//! let result = estimate(&isg.index(), Budget::unlimited());
//! assert_eq!(result.scopes[0].class, ComplexityClass::Quadratic);
//! ```

mod class;
mod estimate;
mod recursion;
mod shape;

pub use class::{ComplexityClass, Cost};
pub use estimate::{Contributor, ContributorKind, ScopeComplexity};
pub use recursion::RecursionShape;

use perfscan_isg::{Budget, IsgIndex, Scope, ScopeId};

/// Complexity results for every scope of one ISG
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Estimation {
    /// One entry per finished scope, in scope order
    pub scopes: Vec<ScopeComplexity>,
    /// False when the budget ran out before every scope was classified
    pub complete: bool,
}

impl Estimation {
    pub fn for_scope(&self, id: ScopeId) -> Option<&ScopeComplexity> {
        self.scopes.iter().find(|s| s.scope == id)
    }
}

/// Classify every scope, stopping at the first one the budget cuts short
pub fn estimate(index: &IsgIndex<'_>, budget: Budget) -> Estimation {
    let mut scopes = Vec::with_capacity(index.isg().scopes.len());
    for scope in &index.isg().scopes {
        if budget.expired() {
            return Estimation { scopes, complete: false };
        }
        let mut ticker = budget.ticker();
        match estimate::estimate_scope(index, scope, &mut ticker) {
            Some(result) => scopes.push(result),
            None => return Estimation { scopes, complete: false },
        }
    }
    Estimation { scopes, complete: true }
}

/// Classify a single scope without a time limit
pub fn estimate_scope(index: &IsgIndex<'_>, scope: &Scope) -> ScopeComplexity {
    let mut ticker = Budget::unlimited().ticker();
    estimate::estimate_scope(index, scope, &mut ticker).unwrap_or_else(|| ScopeComplexity {
        scope: scope.id,
        class: ComplexityClass::Indeterminate,
        recursion: None,
        contributors: Vec::new(),
        reason: "time budget exhausted".into(),
    })
}
