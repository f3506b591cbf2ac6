//! Deep copies repeated per iteration or per call of a hot function

use perfscan_isg::{CallNode, IsgNode, NodeTag, Role};

use crate::{Captures, Category, Rule, RuleContext, RuleFault, RuleMeta, Severity};

/// Copies that are always deep
const DEEP_COPIES: &[&str] = &[
    "deepcopy",
    "cloneDeep",
    "structuredClone",
    "deep_clone",
    "clone_deep",
];

/// Copies whose cost depends on what is copied; only flagged for data that
/// lives outside the loop
const SHALLOW_COPIES: &[&str] = &["clone", "copy", "to_owned", "to_vec"];

/// Reference-counted handles; cloning them is a counter bump
const SHARED_HANDLES: &[&str] = &["Arc", "Rc"];

/// What a copy call duplicates: its receiver, or the argument of a free helper
fn copied_subject<'n>(node: &'n IsgNode, call: &'n CallNode) -> Option<&'n str> {
    let from_argument = || {
        node.children_with(Role::Argument)
            .next()
            .and_then(|a| a.as_identifier())
            .map(perfscan_isg::root_name)
    };
    match call.receiver_root() {
        Some(root) if SHARED_HANDLES.contains(&root) => None,
        // copy.deepcopy(x), _.cloneDeep(x)
        Some("copy") | Some("_") | Some("lodash") => from_argument(),
        Some(root) => Some(root),
        None => from_argument(),
    }
}

fn is_deep_copy(call: &CallNode) -> bool {
    DEEP_COPIES.contains(&call.callee.as_str())
        || (call.callee == "copy" && call.receiver_root() == Some("copy"))
}

fn is_copy(call: &CallNode) -> bool {
    is_deep_copy(call) || (SHALLOW_COPIES.contains(&call.callee.as_str()) && call.receiver.is_some())
}

pub struct CloneInLoop {
    meta: RuleMeta,
}

impl CloneInLoop {
    pub fn new() -> Self {
        Self {
            meta: RuleMeta {
                id: "clone-in-loop",
                title: "deep copy inside loop",
                category: Category::Copy,
                severity: Severity::High,
                targets: &[NodeTag::Call],
                languages: &[],
                template: "hoist-copy",
                summary: "copies data that does not change between iterations",
            },
        }
    }
}

impl Default for CloneInLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for CloneInLoop {
    fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    fn check(&self, node: &IsgNode, cx: &RuleContext<'_>) -> Result<Option<Captures>, RuleFault> {
        let call = node.as_call().ok_or(RuleFault::MissingAttribute("callee"))?;
        if !is_copy(call) || cx.loops_around(node).is_empty() {
            return Ok(None);
        }
        match copied_subject(node, call) {
            Some(subject) if cx.outlives_loop(subject, node) => {
                let mut captures = cx.base_captures(node);
                captures.insert("source", subject, node.span);
                Ok(Some(captures))
            }
            _ => Ok(None),
        }
    }
}

pub struct CloneInHotScope {
    meta: RuleMeta,
}

impl CloneInHotScope {
    pub fn new() -> Self {
        Self {
            meta: RuleMeta {
                id: "clone-in-hot-scope",
                title: "deep copy in hot scope",
                category: Category::Copy,
                severity: Severity::Medium,
                targets: &[NodeTag::Call],
                languages: &[],
                template: "hoist-copy",
                summary: "deep-copies on every call of a frequently called function",
            },
        }
    }
}

impl Default for CloneInHotScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for CloneInHotScope {
    fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    fn check(&self, node: &IsgNode, cx: &RuleContext<'_>) -> Result<Option<Captures>, RuleFault> {
        let call = node.as_call().ok_or(RuleFault::MissingAttribute("callee"))?;
        // Copies inside loops belong to clone-in-loop
        if !is_deep_copy(call) || !cx.loops_around(node).is_empty() {
            return Ok(None);
        }
        let scope = cx.scope_of(node);
        if !cx.is_hot(scope) {
            return Ok(None);
        }
        let mut captures = cx.base_captures(node);
        if let Some(subject) = copied_subject(node, call) {
            captures.insert("source", subject, node.span);
        }
        Ok(Some(captures))
    }
}
