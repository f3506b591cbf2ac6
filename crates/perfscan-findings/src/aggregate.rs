//! Deduplication, severity modifiers and ranking

use std::cmp::Reverse;

use perfscan_complexity::{ComplexityClass, ContributorKind, Estimation, ScopeComplexity};
use perfscan_isg::{IsgIndex, Role, Scope, ScopeKind, Span};
use perfscan_rules::{Captures, Category, Match, RuleMeta, RuleRegistry, Severity};

use crate::finding::{ComplexityNote, Finding, RelatedMatch};
use crate::hints::AnalysisHints;

/// Tunable aggregation constants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateSettings {
    /// Loop depth at which a match is raised one severity level
    pub escalation_depth: usize,
}

impl Default for AggregateSettings {
    fn default() -> Self {
        Self { escalation_depth: 2 }
    }
}

/// A match with its rule and adjusted severity
struct Candidate<'a> {
    meta: &'a RuleMeta,
    m: &'a Match,
    severity: Severity,
}

/// Matches of one category whose spans nest inside the first one
struct Group<'a> {
    category: Category,
    outer: Span,
    members: Vec<Candidate<'a>>,
}

/// Merges matches and complexity results into ranked findings
pub struct Aggregator<'a> {
    registry: &'a RuleRegistry,
    index: &'a IsgIndex<'a>,
    hints: &'a AnalysisHints,
    settings: &'a AggregateSettings,
}

impl<'a> Aggregator<'a> {
    pub fn new(
        registry: &'a RuleRegistry,
        index: &'a IsgIndex<'a>,
        hints: &'a AnalysisHints,
        settings: &'a AggregateSettings,
    ) -> Self {
        Self {
            registry,
            index,
            hints,
            settings,
        }
    }

    /// Produce findings in rank order
    pub fn aggregate(&self, matches: &[Match], estimation: &Estimation) -> Vec<Finding> {
        let mut findings: Vec<Finding> = self
            .group(matches)
            .into_iter()
            .map(|group| self.pattern_finding(group, estimation))
            .collect();
        findings.extend(estimation.scopes.iter().filter_map(|sc| self.complexity_finding(sc)));
        rank(&mut findings);
        findings
    }

    /// Severity of one match after contextual modifiers
    pub fn severity_of(&self, meta: &RuleMeta, m: &Match) -> Severity {
        let mut severity = meta.severity;
        if m.loop_depth >= self.settings.escalation_depth {
            severity = severity.raised();
        }
        if matches!(meta.category, Category::Query | Category::Copy | Category::Memory) && self.hinted(m) {
            severity = severity.raised();
        }
        severity
    }

    fn hinted(&self, m: &Match) -> bool {
        let scope = self.index.scope(m.scope);
        self.hints.is_hot(&scope.name)
            || m.captures
                .iter()
                .filter(|(name, _)| *name != "scope")
                .any(|(_, capture)| self.hints.is_large(&capture.text))
    }

    /// Collapse same-category matches whose spans nest
    fn group<'m>(&'m self, matches: &'m [Match]) -> Vec<Group<'m>> {
        let mut candidates: Vec<Candidate<'m>> = matches
            .iter()
            .filter_map(|m| {
                let meta = self.registry.get(m.rule_id)?.meta();
                Some(Candidate {
                    meta,
                    m,
                    severity: self.severity_of(meta, m),
                })
            })
            .collect();
        candidates.sort_by_key(|c| {
            (
                c.meta.category,
                c.m.span.start,
                Reverse(c.m.span.end),
                c.m.rule_id,
                c.m.node,
            )
        });

        let mut groups: Vec<Group<'m>> = Vec::new();
        for candidate in candidates {
            let category = candidate.meta.category;
            let span = candidate.m.span;
            match groups
                .iter_mut()
                .rev()
                .find(|g| g.category == category && g.outer.contains(&span))
            {
                Some(group) => group.members.push(candidate),
                None => groups.push(Group {
                    category,
                    outer: span,
                    members: vec![candidate],
                }),
            }
        }
        groups
    }

    fn pattern_finding(&self, group: Group<'_>, estimation: &Estimation) -> Finding {
        // Most severe member speaks for the group; ties go to the outermost
        let primary = group
            .members
            .iter()
            .enumerate()
            .fold(0, |best, (i, c)| {
                if c.severity > group.members[best].severity {
                    i
                } else {
                    best
                }
            });
        let lead = &group.members[primary];
        let scope = group.members[0].m.scope;

        let mut captures = lead.m.captures.clone();
        for other in &group.members {
            for (name, capture) in other.m.captures.iter() {
                if captures.get(name).is_none() {
                    captures.insert(name, capture.text.as_str(), capture.span);
                }
            }
        }

        let mut finding = Finding::new(
            lead.meta.id,
            lead.meta.title,
            lead.meta.category,
            lead.meta.severity,
            group.outer,
            scope,
            pattern_message(lead.meta, &captures),
        )
        .with_severity(lead.severity)
        .with_template(lead.meta.template)
        .with_captures(captures);

        for (i, other) in group.members.iter().enumerate() {
            if i != primary {
                finding = finding.with_related(RelatedMatch {
                    rule_id: other.m.rule_id,
                    span: other.m.span,
                });
            }
        }

        match estimation.for_scope(scope) {
            Some(sc) if sc.class != ComplexityClass::Constant => finding.with_complexity(ComplexityNote {
                class: sc.class,
                reason: sc.reason.clone(),
            }),
            _ => finding,
        }
    }

    /// A finding for a scope whose class is worth reporting on its own
    fn complexity_finding(&self, sc: &ScopeComplexity) -> Option<Finding> {
        let scope = self.index.scope(sc.scope);
        let (id, title, severity, template) = match sc.class {
            ComplexityClass::Exponential => (
                "exponential-complexity",
                "exponential complexity",
                Severity::Critical,
                "memoize-recursion",
            ),
            ComplexityClass::Polynomial(_) => (
                "polynomial-complexity",
                "polynomial complexity",
                Severity::High,
                "index-inner-loop",
            ),
            ComplexityClass::Quadratic => (
                "quadratic-complexity",
                "quadratic complexity",
                Severity::High,
                "index-inner-loop",
            ),
            ComplexityClass::Linearithmic if self.large_input_suspected(scope) => (
                "linearithmic-complexity",
                "n log n work on large input",
                Severity::High,
                "single-pass",
            ),
            _ => return None,
        };

        let subject = match scope.kind {
            ScopeKind::Module => "module-level code".to_string(),
            ScopeKind::Function => format!("`{}`", scope.name),
        };
        let message = format!("{} is {}: {}", subject, sc.class, sc.reason);

        Some(
            Finding::new(
                id,
                title,
                Category::Complexity,
                severity,
                sc.hotspot().unwrap_or(scope.span),
                scope.id,
                message,
            )
            .with_template(template)
            .with_captures(self.complexity_captures(scope, sc))
            .with_complexity(ComplexityNote {
                class: sc.class,
                reason: sc.reason.clone(),
            }),
        )
    }

    /// A hint names the scope or one of its parameters
    fn large_input_suspected(&self, scope: &Scope) -> bool {
        self.hints.mentions(&scope.name) || scope.params.iter().any(|p| self.hints.mentions(p))
    }

    /// Scope name, the innermost contributing loop, and the self-call
    fn complexity_captures(&self, scope: &Scope, sc: &ScopeComplexity) -> Captures {
        let mut captures = Captures::new();
        if scope.kind == ScopeKind::Function {
            captures.insert("scope", scope.name.as_str(), scope.span);
        }
        let innermost = sc
            .contributors
            .iter()
            .filter(|c| c.kind == ContributorKind::Loop)
            .filter_map(|c| self.index.node(c.node))
            .last();
        if let Some(node) = innermost {
            if let Some(l) = node.as_loop() {
                if let Some(binding) = &l.binding {
                    captures.insert("loop_var", binding.as_str(), node.span);
                }
                if let Some(iterable) = &l.iterable {
                    let span = node.children_with(Role::Iterable).next().map_or(node.span, |c| c.span);
                    captures.insert("iterable", iterable.as_str(), span);
                }
            }
        }
        if let Some(site) = sc.contributors.iter().find(|c| c.kind == ContributorKind::Recursion) {
            captures.insert("callee", scope.name.as_str(), site.span);
        }
        captures
    }
}

/// `` `db.get` fetches once per element ... (for each `u` in `users`) ``
fn pattern_message(meta: &RuleMeta, captures: &Captures) -> String {
    let subject = match (captures.text("receiver"), captures.text("callee")) {
        (Some(receiver), Some(callee)) => Some(format!("{}.{}", receiver, callee)),
        (None, Some(callee)) => Some(callee.to_string()),
        _ => captures.text("target").map(str::to_string),
    };
    let mut message = match subject {
        Some(subject) => format!("`{}` {}", subject, meta.summary),
        None => format!("{}: {}", meta.title, meta.summary),
    };
    if let (Some(var), Some(iterable)) = (captures.text("loop_var"), captures.text("iterable")) {
        message.push_str(&format!(" (for each `{}` in `{}`)", var, iterable));
    }
    message
}

/// Severity desc, start asc, end desc, pattern id asc
pub fn rank(findings: &mut [Finding]) {
    findings.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then(a.span.start.cmp(&b.span.start))
            .then(b.span.end.cmp(&a.span.end))
            .then(a.id.cmp(b.id))
            .then(a.scope.cmp(&b.scope))
    });
}
