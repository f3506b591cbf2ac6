//! Per-scope cost inference over the loop structure

use std::collections::HashSet;
use std::fmt;

use perfscan_isg::{IsgIndex, IsgNode, LoopBound, NodeId, NodeKind, Role, Scope, Span, Ticker};
use serde::Serialize;

use crate::class::{ComplexityClass, Cost};
use crate::recursion::{self, RecursionShape};
use crate::shape::{opaque_condition, scales_control_variable};

/// Why a scope could not be classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Indeterminate {
    UnboundedLoop,
    OpaqueCondition(String),
}

impl fmt::Display for Indeterminate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Indeterminate::UnboundedLoop => f.write_str("loop without a visible exit"),
            Indeterminate::OpaqueCondition(callee) => write!(f, "loop condition depends on `{}`", callee),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContributorKind {
    Loop,
    Recursion,
}

/// A loop or self-call that the scope's class depends on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contributor {
    pub node: NodeId,
    pub span: Span,
    pub kind: ContributorKind,
}

/// Complexity result for one scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeComplexity {
    pub scope: perfscan_isg::ScopeId,
    pub class: ComplexityClass,
    pub recursion: Option<RecursionShape>,
    /// Loops on the dominant nesting path (outermost first), then self-calls
    pub contributors: Vec<Contributor>,
    /// Short explanation, e.g. `2 nested loops at lines 3–9`
    pub reason: String,
}

impl ScopeComplexity {
    /// Span covering every contributor
    pub fn hotspot(&self) -> Option<Span> {
        self.contributors
            .iter()
            .map(|c| c.span)
            .reduce(Span::merge)
    }
}

/// Cost of a subtree plus the loops responsible for it
#[derive(Debug, Clone)]
struct Trace<'a> {
    cost: Result<Cost, Indeterminate>,
    via: Vec<&'a IsgNode>,
}

impl<'a> Trace<'a> {
    fn constant() -> Self {
        Self {
            cost: Ok(Cost::CONSTANT),
            via: Vec::new(),
        }
    }

    fn indeterminate(reason: Indeterminate, at: &'a IsgNode) -> Self {
        Self {
            cost: Err(reason),
            via: vec![at],
        }
    }

    /// Sequential composition: the larger cost wins, the first
    /// indeterminacy sticks
    fn then(self, next: Trace<'a>) -> Trace<'a> {
        let next_wins = match (&self.cost, &next.cost) {
            (Err(_), _) => false,
            (_, Err(_)) => true,
            (Ok(a), Ok(b)) => b > a,
        };
        if next_wins {
            next
        } else {
            self
        }
    }

    /// `self` runs once per unit of `factor`
    fn under(mut self, factor: Cost, loop_node: &'a IsgNode) -> Trace<'a> {
        if let Ok(cost) = self.cost {
            self.cost = Ok(factor.times(cost));
            if !factor.is_constant() {
                self.via.insert(0, loop_node);
            }
        }
        self
    }
}

/// Walks one scope; `None` from any step means the budget ran out
struct Walker<'t> {
    root: NodeId,
    traversal_loops: HashSet<NodeId>,
    ticker: &'t mut Ticker,
}

impl<'t> Walker<'t> {
    fn walk<'a>(&mut self, node: &'a IsgNode) -> Option<Trace<'a>> {
        if self.ticker.tick() {
            return None;
        }
        match &node.kind {
            NodeKind::Function(_) if node.id != self.root => Some(Trace::constant()),
            NodeKind::Loop(l) => {
                let mut once = Trace::constant();
                let mut each = Trace::constant();
                for child in &node.children {
                    let trace = self.walk(child)?;
                    if matches!(child.role, Role::Body | Role::Condition | Role::Update) {
                        each = each.then(trace);
                    } else {
                        once = once.then(trace);
                    }
                }
                let factor = if self.traversal_loops.contains(&node.id) {
                    Cost::CONSTANT
                } else {
                    match l.bound {
                        LoopBound::Constant(_) => Cost::CONSTANT,
                        LoopBound::Unbounded => {
                            return Some(once.then(Trace::indeterminate(Indeterminate::UnboundedLoop, node)))
                        }
                        LoopBound::Input => {
                            if let Some(callee) = opaque_condition(node, l) {
                                let reason = Indeterminate::OpaqueCondition(callee.to_string());
                                return Some(once.then(Trace::indeterminate(reason, node)));
                            }
                            if scales_control_variable(node, l) {
                                Cost::LOG
                            } else {
                                Cost::LINEAR
                            }
                        }
                    }
                };
                Some(once.then(each.under(factor, node)))
            }
            _ => {
                let mut trace = Trace::constant();
                for child in &node.children {
                    trace = trace.then(self.walk(child)?);
                }
                Some(trace)
            }
        }
    }
}

/// Classify one scope, polling `ticker` once per visited node
pub(crate) fn estimate_scope(index: &IsgIndex<'_>, scope: &Scope, ticker: &mut Ticker) -> Option<ScopeComplexity> {
    let Some(root) = index.scope_root(scope) else {
        return Some(ScopeComplexity {
            scope: scope.id,
            class: ComplexityClass::Constant,
            recursion: None,
            contributors: Vec::new(),
            reason: "empty scope".into(),
        });
    };
    let recursion = recursion::analyze(index, scope, root);
    let mut walker = Walker {
        root: root.id,
        traversal_loops: recursion
            .as_ref()
            .map(|r| r.traversal_loops.clone())
            .unwrap_or_default(),
        ticker,
    };
    let body = walker.walk(root)?;

    let mut contributors: Vec<Contributor> = body
        .via
        .iter()
        .map(|n| Contributor {
            node: n.id,
            span: n.span,
            kind: ContributorKind::Loop,
        })
        .collect();

    let loops_label = describe_loops(&body.via);
    let (class, reason) = match (&body.cost, &recursion) {
        (Err(why), _) => (ComplexityClass::Indeterminate, format!("{} at {}", why, span_of(&body.via))),
        (Ok(cost), None) => (ComplexityClass::from_cost(*cost), loops_label),
        (Ok(cost), Some(rec)) => {
            contributors.extend(rec.sites.iter().map(|n| Contributor {
                node: n.id,
                span: n.span,
                kind: ContributorKind::Recursion,
            }));
            let site = span_of(&rec.sites);
            let recursion_label = format!("{} at {}", rec.shape, site);
            let class = match rec.shape {
                RecursionShape::InLoop => ComplexityClass::Indeterminate,
                RecursionShape::Branching => ComplexityClass::Exponential,
                RecursionShape::Linear | RecursionShape::Traversal | RecursionShape::Memoized => {
                    ComplexityClass::from_cost(cost.times(Cost::LINEAR))
                }
                RecursionShape::Halving => ComplexityClass::from_cost(halving_once(*cost)),
                RecursionShape::DivideAndConquer => ComplexityClass::from_cost(master_two_halves(*cost)),
            };
            let reason = if body.via.is_empty() {
                recursion_label
            } else {
                format!("{} with {}", recursion_label, loops_label)
            };
            (class, reason)
        }
    };

    Some(ScopeComplexity {
        scope: scope.id,
        class,
        recursion: recursion.map(|r| r.shape),
        contributors,
        reason,
    })
}

/// T(n) = T(n/2) + f(n): polynomial work shrinks geometrically
fn halving_once(f: Cost) -> Cost {
    if f.degree == 0 {
        Cost::new(0, f.log + 1)
    } else {
        f
    }
}

/// T(n) = 2T(n/2) + f(n) by the master theorem, a = b = 2
fn master_two_halves(f: Cost) -> Cost {
    match f.degree {
        0 => Cost::LINEAR,
        1 => Cost::new(1, f.log + 1),
        _ => f,
    }
}

fn span_of(nodes: &[&IsgNode]) -> String {
    nodes
        .iter()
        .map(|n| n.span)
        .reduce(Span::merge)
        .map_or_else(|| "unknown location".to_string(), |s| s.lines())
}

fn describe_loops(via: &[&IsgNode]) -> String {
    match via {
        [] => "no input-dependent loops or recursion".into(),
        [only] => format!("loop at {}", only.span.lines()),
        [outer, ..] => format!("{} nested loops at {}", via.len(), outer.span.lines()),
    }
}
