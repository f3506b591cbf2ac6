//! Rule trait and the values rules produce

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use perfscan_isg::{
    AssignOp, IsgIndex, IsgNode, Language, NodeId, NodeKind, NodeTag, Role, Scope, ScopeId, ScopeKind, Span,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Severity level, ordered `Low < Medium < High < Critical`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// One level up, never past High; Critical stays Critical
    pub fn raised(self) -> Severity {
        match self {
            Severity::Low => Severity::Medium,
            Severity::Medium | Severity::High => Severity::High,
            Severity::Critical => Severity::Critical,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        };
        f.write_str(name)
    }
}

/// Anti-pattern family; matches of one category deduplicate together
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Query,
    Io,
    Copy,
    Collection,
    Search,
    String,
    Regex,
    Sort,
    Memory,
    Async,
    Dom,
    Serialization,
    Lock,
    Complexity,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Query => "query",
            Category::Io => "io",
            Category::Copy => "copy",
            Category::Collection => "collection",
            Category::Search => "search",
            Category::String => "string",
            Category::Regex => "regex",
            Category::Sort => "sort",
            Category::Memory => "memory",
            Category::Async => "async",
            Category::Dom => "dom",
            Category::Serialization => "serialization",
            Category::Lock => "lock",
            Category::Complexity => "complexity",
        };
        f.write_str(name)
    }
}

/// Static description of a rule
#[derive(Debug, Clone)]
pub struct RuleMeta {
    pub id: &'static str,
    pub title: &'static str,
    pub category: Category,
    pub severity: Severity,
    /// Node kinds the predicate is evaluated on
    pub targets: &'static [NodeTag],
    /// Languages the rule applies to; empty means all
    pub languages: &'static [Language],
    /// Key into the suggestion template catalog
    pub template: &'static str,
    /// One-line description used in finding messages
    pub summary: &'static str,
}

impl RuleMeta {
    pub fn applies_to(&self, language: Language) -> bool {
        self.languages.is_empty() || self.languages.contains(&language)
    }
}

/// A structural anti-pattern predicate
///
/// Implementations must be pure functions of the ISG: the same node and
/// context always give the same answer.
pub trait Rule: Send + Sync {
    fn meta(&self) -> &RuleMeta;

    /// Inspect one node of a target kind; `Some` captures mean the rule fires
    fn check(&self, node: &IsgNode, cx: &RuleContext<'_>) -> Result<Option<Captures>, RuleFault>;
}

/// Predicate failure on an unexpected ISG shape
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum RuleFault {
    #[error("unexpected node shape: {0}")]
    UnexpectedShape(String),

    #[error("missing attribute `{0}`")]
    MissingAttribute(&'static str),
}

impl RuleFault {
    pub fn code(&self) -> &'static str {
        match self {
            RuleFault::UnexpectedShape(_) => "E-RULE-001",
            RuleFault::MissingAttribute(_) => "E-RULE-002",
        }
    }
}

/// A fault together with where it happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FaultRecord {
    pub rule_id: &'static str,
    pub node: NodeId,
    pub span: Span,
    pub fault: RuleFault,
}

/// A named sub-span captured by a rule for message and suggestion text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capture {
    pub text: String,
    pub span: Span,
}

/// Captures keyed by placeholder name (`callee`, `loop_var`, ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Captures(BTreeMap<String, Capture>);

impl Captures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, text: impl Into<String>, span: Span) -> Self {
        self.insert(name, text, span);
        self
    }

    pub fn insert(&mut self, name: &str, text: impl Into<String>, span: Span) {
        let text = text.into();
        if !text.is_empty() {
            self.0.insert(name.to_string(), Capture { text, span });
        }
    }

    pub fn get(&self, name: &str) -> Option<&Capture> {
        self.0.get(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(|c| c.text.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Capture)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One rule firing on one ISG location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub rule_id: &'static str,
    pub node: NodeId,
    pub span: Span,
    pub scope: ScopeId,
    /// Loops enclosing the node within its scope
    pub loop_depth: usize,
    pub captures: Captures,
}

/// Rule thresholds taken from engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSettings {
    /// Call sites naming a function at which it counts as hot
    pub hot_fan_in: usize,
    /// Rule ids skipped entirely
    pub disabled: BTreeSet<String>,
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self {
            hot_fan_in: 3,
            disabled: BTreeSet::new(),
        }
    }
}

/// Read-only view handed to every predicate
pub struct RuleContext<'a> {
    pub index: &'a IsgIndex<'a>,
    pub settings: &'a RuleSettings,
    /// Callee names invoked from inside some loop
    called_in_loop: HashSet<&'a str>,
}

impl<'a> RuleContext<'a> {
    pub fn new(index: &'a IsgIndex<'a>, settings: &'a RuleSettings) -> Self {
        let called_in_loop = index
            .nodes()
            .filter_map(|n| n.as_call().map(|c| (n, c)))
            .filter(|(n, _)| index.loop_depth(n.id) > 0)
            .map(|(_, c)| c.callee.as_str())
            .collect();
        Self {
            index,
            settings,
            called_in_loop,
        }
    }

    pub fn language(&self) -> Language {
        self.index.isg().language
    }

    pub fn scope_of(&self, node: &IsgNode) -> &'a Scope {
        self.index.scope_of(node.id)
    }

    /// Loops whose iterations run `node`, innermost first
    pub fn loops_around(&self, node: &IsgNode) -> Vec<&'a IsgNode> {
        self.index.enclosing_loops(node.id)
    }

    /// Function scope called at high fan-in or from inside a loop
    pub fn is_hot(&self, scope: &Scope) -> bool {
        scope.kind == ScopeKind::Function
            && (self.index.fan_in(&scope.name) >= self.settings.hot_fan_in
                || self.called_in_loop.contains(scope.name.as_str()))
    }

    /// Whether `name` gets a fresh value inside `within`: a declaration, a
    /// plain assignment not reading the old value, a loop binding or a
    /// closure parameter
    pub fn declared_in(&self, name: &str, within: &IsgNode) -> bool {
        within.scope_descendants().any(|n| match &n.kind {
            NodeKind::Assignment(a) if a.target == name => {
                a.declares
                    || (a.op == AssignOp::Set
                        && !n
                            .children_with(Role::Value)
                            .any(|v| v.identifiers().any(|id| perfscan_isg::root_name(id) == name)))
            }
            NodeKind::Loop(l) => l.binding.as_deref() == Some(name),
            NodeKind::Closure(c) => c.params.iter().any(|p| p == name),
            _ => false,
        })
    }

    /// Whether `subject` names data that outlives the iterations of the
    /// innermost loop around `node`
    pub fn outlives_loop(&self, subject: &str, node: &IsgNode) -> bool {
        let loops = self.loops_around(node);
        let Some(innermost) = loops.first() else {
            return false;
        };
        let bound_by_loop = loops
            .iter()
            .filter_map(|l| l.as_loop())
            .any(|l| l.binding.as_deref() == Some(subject));
        let per_iteration = innermost
            .children_with(Role::Body)
            .any(|body| self.declared_in(subject, body));
        !bound_by_loop && !per_iteration
    }

    /// Assignments to `target` in the scope of `node` that start before it
    pub fn assignments_before(&self, target: &str, node: &IsgNode) -> Vec<&'a IsgNode> {
        let scope = self.scope_of(node);
        let Some(root) = self.index.scope_root(scope) else {
            return Vec::new();
        };
        root.scope_descendants()
            .filter(|n| n.span.start < node.span.start)
            .filter(|n| n.as_assignment().is_some_and(|a| a.target == target))
            .collect()
    }

    /// The standard captures: callee/receiver for calls, plus the innermost
    /// loop's variable and iterable and the enclosing function's name
    pub fn base_captures(&self, node: &IsgNode) -> Captures {
        let mut captures = Captures::new();
        if let Some(call) = node.as_call() {
            captures.insert("callee", call.callee.as_str(), node.span);
            if let Some(receiver) = &call.receiver {
                captures.insert("receiver", receiver.as_str(), node.span);
            }
        }
        if let Some(innermost) = self.loops_around(node).first() {
            if let Some(l) = innermost.as_loop() {
                if let Some(binding) = &l.binding {
                    captures.insert("loop_var", binding.as_str(), innermost.span);
                }
                if let Some(iterable) = &l.iterable {
                    let span = innermost
                        .children_with(Role::Iterable)
                        .next()
                        .map_or(innermost.span, |c| c.span);
                    captures.insert("iterable", iterable.as_str(), span);
                }
            }
        }
        let scope = self.scope_of(node);
        if scope.kind == ScopeKind::Function {
            captures.insert("scope", scope.name.as_str(), scope.span);
        }
        captures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_order_and_raise() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert_eq!(Severity::Low.raised(), Severity::Medium);
        assert_eq!(Severity::High.raised(), Severity::High);
        assert_eq!(Severity::Critical.raised(), Severity::Critical);
    }

    #[test]
    fn test_empty_capture_text_is_dropped() {
        let captures = Captures::new()
            .with("callee", "fetch", Span::dummy())
            .with("receiver", "", Span::dummy());
        assert_eq!(captures.len(), 1);
        assert_eq!(captures.text("callee"), Some("fetch"));
        assert!(captures.get("receiver").is_none());
    }

    #[test]
    fn test_language_restriction() {
        let meta = RuleMeta {
            id: "x",
            title: "x",
            category: Category::Dom,
            severity: Severity::Low,
            targets: &[NodeTag::Call],
            languages: &[Language::JavaScript],
            template: "x",
            summary: "x",
        };
        assert!(meta.applies_to(Language::JavaScript));
        assert!(!meta.applies_to(Language::Python));
    }
}
