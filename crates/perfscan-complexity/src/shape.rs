//! Structural tests on loop headers and arithmetic

use std::collections::HashSet;

use perfscan_isg::{root_name, AssignOp, IsgNode, LoopKind, LoopNode, NodeKind, Role};

/// Condition calls that step an iterator or check emptiness
const ITERATOR_PROTOCOL: &[&str] = &[
    "hasNext", "next", "Next", "Scan", "hasMoreElements", "hasMoreTokens", "moveToNext", "more",
    "isEmpty", "is_empty", "empty", "len", "size", "length", "Len", "is_some", "is_ok", "peek",
];

/// `x / 2`, `x // 2`, `x >> 1`
pub(crate) fn is_halving(node: &IsgNode) -> bool {
    scaling_operator(node).is_some_and(|op| matches!(op, "/" | "//" | ">>"))
}

/// Halving, or `x * 2` / `x << 1`
fn is_scaling(node: &IsgNode) -> bool {
    scaling_operator(node).is_some()
}

/// Operator of a binary expression that scales by a literal factor
fn scaling_operator(node: &IsgNode) -> Option<&str> {
    let NodeKind::Binary(binary) = &node.kind else {
        return None;
    };
    let minimum = match binary.operator.as_str() {
        "/" | "//" | "*" => 2,
        ">>" | "<<" => 1,
        _ => return None,
    };
    let literal_factor = node
        .children_with(Role::Right)
        .chain(node.children_with(Role::Left))
        .filter_map(|c| c.as_literal()?.as_integer())
        .any(|v| v >= minimum);
    literal_factor.then_some(binary.operator.as_str())
}

pub(crate) fn refers_to_any(node: &IsgNode, names: &HashSet<&str>) -> bool {
    node.identifiers().any(|id| names.contains(root_name(id)))
}

/// Callee of a `while` condition that is an opaque call
///
/// Negations and other unmapped single-child wrappers are looked through.
pub(crate) fn opaque_condition<'a>(loop_node: &'a IsgNode, l: &LoopNode) -> Option<&'a str> {
    if l.loop_kind != LoopKind::While {
        return None;
    }
    let mut condition = loop_node.children_with(Role::Condition).next()?;
    while let NodeKind::Other(_) = condition.kind {
        match condition.children.as_slice() {
            [only] => condition = only,
            _ => return None,
        }
    }
    let call = condition.as_call()?;
    (!ITERATOR_PROTOCOL.contains(&call.callee.as_str())).then_some(call.callee.as_str())
}

/// Whether each iteration halves or doubles a variable the condition tests
pub(crate) fn scales_control_variable(loop_node: &IsgNode, l: &LoopNode) -> bool {
    if !matches!(l.loop_kind, LoopKind::For | LoopKind::While) {
        return false;
    }
    let controls: HashSet<&str> = loop_node
        .children_with(Role::Condition)
        .flat_map(|c| c.identifiers())
        .map(root_name)
        .collect();
    if controls.is_empty() {
        return false;
    }

    let per_iteration: Vec<&IsgNode> = loop_node
        .children
        .iter()
        .filter(|c| matches!(c.role, Role::Body | Role::Update))
        .collect();
    let assignments = || {
        per_iteration
            .iter()
            .copied()
            .flat_map(IsgNode::scope_descendants)
            .filter_map(|n| n.as_assignment().map(|a| (n, a)))
    };

    // mid = (lo + hi) // 2
    let halved: HashSet<&str> = assignments()
        .filter(|(n, _)| n.children_with(Role::Value).any(|v| v.any(is_halving)))
        .map(|(_, a)| a.target.as_str())
        .collect();

    assignments().any(|(n, a)| {
        if !controls.contains(root_name(&a.target)) {
            return false;
        }
        let value = n.children_with(Role::Value).next();
        let literal = value.and_then(|v| v.as_literal()).and_then(|lit| lit.as_integer());
        match a.op {
            AssignOp::Div | AssignOp::Mul => literal.is_some_and(|v| v >= 2),
            AssignOp::Shr | AssignOp::Shl => literal.is_some_and(|v| v >= 1),
            AssignOp::Set => value.is_some_and(|v| v.any(is_scaling) || refers_to_any(v, &halved)),
            _ => false,
        }
    })
}
