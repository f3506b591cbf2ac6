//! Self-recursion: call sites, argument shapes and memoization evidence

use std::collections::HashSet;
use std::fmt;

use perfscan_isg::{
    root_name, CollectionOpKind, IsgIndex, IsgNode, NodeId, NodeKind, Role, Scope, ScopeKind,
};
use serde::Serialize;

use crate::shape::{is_halving, refers_to_any};

/// How a function calls itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecursionShape {
    /// One call per invocation on a smaller input: `f(n - 1)`
    Linear,
    /// One call per invocation on half the input: `f(n / 2)`
    Halving,
    /// Calls descend into members of a parameter: `f(node.left)`
    Traversal,
    /// Two or more calls on halves: `T(n) = 2T(n/2) + f(n)`
    DivideAndConquer,
    /// Branching calls guarded by a cache lookup
    Memoized,
    /// Two or more calls per invocation with no cache
    Branching,
    /// A call inside a loop that is not a structural traversal
    InLoop,
}

impl fmt::Display for RecursionShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RecursionShape::Linear => "linear recursion",
            RecursionShape::Halving => "halving recursion",
            RecursionShape::Traversal => "recursive traversal",
            RecursionShape::DivideAndConquer => "divide-and-conquer recursion",
            RecursionShape::Memoized => "memoized recursion",
            RecursionShape::Branching => "branching recursion",
            RecursionShape::InLoop => "recursive call inside loop",
        };
        f.write_str(label)
    }
}

/// Result of inspecting one function scope for self-calls
#[derive(Debug)]
pub(crate) struct Recursion<'a> {
    pub shape: RecursionShape,
    /// Self-call sites in pre-order
    pub sites: Vec<&'a IsgNode>,
    /// Loops over a parameter's members whose iterations the recursion
    /// already accounts for
    pub traversal_loops: HashSet<NodeId>,
}

const SELF_RECEIVERS: &[&str] = &["self", "this", "cls", "Self"];

const CACHE_DECORATORS: &[&str] = &["cache", "memo"];

/// Method names that look a key up in a map or set
const LOOKUPS: &[&str] = &[
    "has", "get", "contains", "containsKey", "contains_key", "has_key", "hasOwnProperty", "__contains__",
];

/// Name fragments of collections used as memo tables
const MEMO_NAMES: &[&str] = &["memo", "cache", "dp", "seen", "table", "lookup", "computed", "known", "visited"];

pub(crate) fn analyze<'a>(index: &IsgIndex<'a>, scope: &Scope, root: &'a IsgNode) -> Option<Recursion<'a>> {
    if scope.kind != ScopeKind::Function {
        return None;
    }
    let sites: Vec<&'a IsgNode> = root
        .scope_descendants()
        .filter(|n| is_self_call(n, &scope.name))
        .collect();
    if sites.is_empty() {
        return None;
    }

    let halved = assigned_from(root, |v| v.any(is_halving));
    let partitions = assigned_from(root, |v| v.any(|d| matches!(d.kind, NodeKind::Loop(_))));
    let mut traversal_loops = HashSet::new();
    let mut traversal_sites = 0;
    let mut in_plain_loop = false;
    for site in &sites {
        let traversal = descends_into_parameter(index, scope, site, &mut traversal_loops);
        if traversal {
            traversal_sites += 1;
        } else if index.loop_depth(site.id) > 0 {
            in_plain_loop = true;
        }
    }

    let shape = if in_plain_loop {
        RecursionShape::InLoop
    } else if traversal_sites == sites.len() {
        RecursionShape::Traversal
    } else {
        let shrinks = |names: &HashSet<&str>| {
            sites.iter().all(|s| {
                s.children_with(Role::Argument)
                    .any(|a| a.any(is_halving) || refers_to_any(a, names))
            })
        };
        let halves = shrinks(&halved);
        let splits = halves || shrinks(&halved.union(&partitions).copied().collect());
        match calls_per_invocation(index, &sites) {
            1 if halves => RecursionShape::Halving,
            1 => RecursionShape::Linear,
            _ if splits => RecursionShape::DivideAndConquer,
            _ if is_memoized(root, &sites) => RecursionShape::Memoized,
            _ => RecursionShape::Branching,
        }
    };

    Some(Recursion {
        shape,
        sites,
        traversal_loops,
    })
}

fn is_self_call(node: &IsgNode, name: &str) -> bool {
    node.as_call().is_some_and(|call| {
        call.callee == name
            && call
                .receiver
                .as_deref()
                .map_or(true, |r| SELF_RECEIVERS.contains(&r))
    })
}

/// `node.left`, `node.children[i]`, or the binding of a loop / callback over
/// `node.children`
fn descends_into_parameter(
    index: &IsgIndex<'_>,
    scope: &Scope,
    site: &IsgNode,
    traversal_loops: &mut HashSet<NodeId>,
) -> bool {
    let is_param_member = |path: &str| {
        path.contains(['.', '['])
            && scope.params.iter().any(|p| p == root_name(path))
    };

    let args: Vec<&IsgNode> = site.children_with(Role::Argument).collect();
    let direct = args.iter().any(|arg| match &arg.kind {
        NodeKind::Identifier(path) => is_param_member(path),
        NodeKind::CollectionOp(op) if op.op == CollectionOpKind::Index => {
            op.collection.as_deref().is_some_and(|c| is_param_member(c))
        }
        _ => false,
    });
    if direct {
        return true;
    }

    let passes = |binding: &str| args.iter().any(|a| a.as_identifier() == Some(binding));

    // for child in node.children: f(child)
    for outer in index.enclosing_loops(site.id) {
        let Some(l) = outer.as_loop() else { continue };
        let over_member = l.iterable.as_deref().is_some_and(|it| is_param_member(it));
        if over_member && l.binding.as_deref().is_some_and(passes) {
            traversal_loops.insert(outer.id);
            return true;
        }
    }

    // node.children.forEach(c => f(c))
    index.ancestors(site.id).any(|ancestor| {
        let NodeKind::Closure(closure) = &ancestor.kind else {
            return false;
        };
        let receiver_is_member = index
            .parent(ancestor.id)
            .and_then(|p| p.as_call())
            .and_then(|call| call.receiver.as_deref())
            .is_some_and(|r| is_param_member(r));
        receiver_is_member && closure.params.iter().any(|p| passes(p.as_str()))
    })
}

/// Targets of assignments whose value satisfies `pred`: `mid = (lo + hi) // 2`
/// for halving, `left = [x for x in xs if x < pivot]` for partitions
fn assigned_from<'a>(root: &'a IsgNode, pred: impl Fn(&IsgNode) -> bool) -> HashSet<&'a str> {
    root.scope_descendants()
        .filter_map(|n| {
            let assign = n.as_assignment()?;
            n.children_with(Role::Value)
                .any(&pred)
                .then_some(assign.target.as_str())
        })
        .collect()
}

/// Largest number of self-calls one invocation can make
///
/// Calls in different branches of one conditional never both run.
fn calls_per_invocation<'a>(index: &IsgIndex<'a>, sites: &[&'a IsgNode]) -> usize {
    sites
        .iter()
        .map(|&a| {
            sites
                .iter()
                .filter(|&&b| a.id == b.id || !mutually_exclusive(index, a, b))
                .count()
        })
        .max()
        .unwrap_or(0)
}

fn mutually_exclusive<'a>(index: &IsgIndex<'a>, a: &'a IsgNode, b: &'a IsgNode) -> bool {
    let is_branch = |n: &IsgNode| matches!(n.role, Role::Body | Role::Else);
    index
        .ancestors(a.id)
        .filter(|n| matches!(n.kind, NodeKind::Conditional))
        .any(|conditional| {
            match (branch_of(index, a, conditional.id), branch_of(index, b, conditional.id)) {
                (Some(x), Some(y)) => x.id != y.id && is_branch(x) && is_branch(y),
                _ => false,
            }
        })
}

/// The child of `conditional` that contains `node`
fn branch_of<'a>(index: &IsgIndex<'a>, node: &'a IsgNode, conditional: NodeId) -> Option<&'a IsgNode> {
    let mut current = node;
    while let Some(parent) = index.parent(current.id) {
        if parent.id == conditional {
            return Some(current);
        }
        current = parent;
    }
    None
}

/// A cache decorator, or a conditional whose guard looks a key up before the
/// first self-call
fn is_memoized(root: &IsgNode, sites: &[&IsgNode]) -> bool {
    if let NodeKind::Function(function) = &root.kind {
        let decorated = function.decorators.iter().any(|d| {
            let d = d.to_ascii_lowercase();
            CACHE_DECORATORS.iter().any(|c| d.contains(c))
        });
        if decorated {
            return true;
        }
    }
    let Some(first) = sites.first() else {
        return false;
    };
    root.scope_descendants()
        .filter(|n| matches!(n.kind, NodeKind::Conditional) && n.span.start < first.span.start)
        .any(|conditional| {
            conditional
                .children
                .iter()
                .filter(|c| !matches!(c.role, Role::Body | Role::Else))
                .any(|guard| guard.any(is_lookup))
        })
}

fn is_lookup(node: &IsgNode) -> bool {
    match &node.kind {
        NodeKind::CollectionOp(op) => op.collection.as_deref().is_some_and(is_memo_name),
        NodeKind::Call(call) => {
            LOOKUPS.contains(&call.callee.as_str()) && call.receiver.as_deref().is_some_and(is_memo_name)
        }
        _ => false,
    }
}

fn is_memo_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    MEMO_NAMES.iter().any(|m| lower.contains(m))
}
