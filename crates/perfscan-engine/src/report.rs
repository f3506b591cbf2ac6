//! Analysis reports and per-scope summaries

use perfscan_complexity::{ComplexityClass, Estimation};
use perfscan_findings::Finding;
use perfscan_isg::{IsgIndex, Language, Scope, ScopeId, ScopeKind, Span};
use perfscan_rules::{FaultRecord, Severity};
use serde::Serialize;

/// Everything one analysis request produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub language: Language,
    /// Ranked findings
    pub findings: Vec<Finding>,
    /// One summary per scope, in scope order
    pub scopes: Vec<ScopeSummary>,
    /// Rule faults recovered during evaluation
    pub faults: Vec<FaultRecord>,
    /// True when the time budget cut the analysis short
    pub partial: bool,
}

impl Report {
    pub fn highest_severity(&self) -> Option<Severity> {
        self.findings.iter().map(|f| f.severity).max()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.findings.iter().filter(|f| f.severity == severity).count()
    }

    pub fn has_critical(&self) -> bool {
        self.count(Severity::Critical) > 0
    }

    pub fn scope(&self, name: &str) -> Option<&ScopeSummary> {
        self.scopes.iter().find(|s| s.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeSummary {
    pub id: ScopeId,
    pub name: String,
    pub kind: ScopeKind,
    pub span: Span,
    pub params: usize,
    pub nesting_depth: u32,
    /// Missing when the budget ran out before the scope was classified
    pub complexity: Option<ComplexityClass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complexity_reason: Option<String>,
    /// 1 (hard to test) to 10 (easy to test)
    pub testability: u8,
}

/// Summaries for every scope of the indexed ISG
pub fn summarize(index: &IsgIndex<'_>, estimation: &Estimation, findings: &[Finding]) -> Vec<ScopeSummary> {
    index
        .isg()
        .scopes
        .iter()
        .map(|scope| {
            let estimate = estimation.for_scope(scope.id);
            let class = estimate.map(|e| e.class);
            let severe = findings
                .iter()
                .filter(|f| f.scope == scope.id && f.severity >= Severity::High)
                .count();
            ScopeSummary {
                id: scope.id,
                name: scope.name.clone(),
                kind: scope.kind,
                span: scope.span,
                params: scope.param_count(),
                nesting_depth: scope.nesting_depth,
                complexity: class,
                complexity_reason: estimate.map(|e| e.reason.clone()),
                testability: testability_score(scope, class, severe),
            }
        })
        .collect()
}

/// Testability on a 1–10 scale
///
/// Starts at 10 and subtracts: one per parameter above 3 (at most 3), one
/// per nesting level above 1 (at most 2), a complexity penalty, and one per
/// High or Critical finding in the scope (at most 3).
pub fn testability_score(scope: &Scope, class: Option<ComplexityClass>, severe_findings: usize) -> u8 {
    let params = scope.param_count().saturating_sub(3).min(3) as i32;
    let nesting = scope.nesting_depth.saturating_sub(1).min(2) as i32;
    let complexity = match class {
        Some(ComplexityClass::Linearithmic | ComplexityClass::Indeterminate) => 1,
        Some(ComplexityClass::Quadratic) => 2,
        Some(ComplexityClass::Polynomial(_)) => 3,
        Some(ComplexityClass::Exponential) => 4,
        _ => 0,
    };
    let findings = severe_findings.min(3) as i32;
    (10 - params - nesting - complexity - findings).clamp(1, 10) as u8
}
