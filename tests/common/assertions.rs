use perfscan::complexity::ComplexityClass;
use perfscan::engine::{Report, ScopeSummary};
use perfscan::findings::Finding;

/// Ids of the report's findings, in ranked order
pub fn finding_ids(report: &Report) -> Vec<&'static str> {
    report.findings.iter().map(|f| f.id).collect()
}

/// Assert the report holds exactly one finding and return it
pub fn assert_single_finding<'r>(report: &'r Report, id: &str) -> &'r Finding {
    assert_eq!(
        finding_ids(report),
        vec![id],
        "Expected exactly one `{}` finding",
        id
    );
    &report.findings[0]
}

pub fn assert_scope<'r>(report: &'r Report, name: &str) -> &'r ScopeSummary {
    report
        .scope(name)
        .unwrap_or_else(|| panic!("Expected a scope named {}", name))
}

/// Assert the complexity class inferred for a scope
pub fn assert_scope_class(report: &Report, name: &str, class: ComplexityClass) {
    assert_eq!(
        assert_scope(report, name).complexity,
        Some(class),
        "Unexpected complexity for scope {}",
        name
    );
}

/// Every finding lies inside the span of the scope it belongs to
pub fn assert_findings_contained(report: &Report) {
    for finding in &report.findings {
        let scope = report
            .scopes
            .iter()
            .find(|s| s.id == finding.scope)
            .unwrap_or_else(|| panic!("Finding {} names an unknown scope", finding.id));
        assert!(
            scope.span.contains(&finding.span),
            "Finding {} at {} escapes scope {}",
            finding.id,
            finding.span.lines(),
            scope.name
        );
    }
}
