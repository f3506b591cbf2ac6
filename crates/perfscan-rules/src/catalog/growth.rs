//! Unbounded growth of long-lived collections
//!
//! A function appends to a collection it does not own (an attribute or a
//! module-level name initialized with a collection) and nothing in the same
//! function ever shrinks, resets or bounds it.

use perfscan_isg::{root_name, IsgNode, NodeKind, NodeTag, Role, ScopeKind};

use crate::{Captures, Category, Rule, RuleContext, RuleFault, RuleMeta, Severity};

const APPENDS: &[&str] = &[
    "append", "push", "push_back", "add", "put", "insert", "extend", "set", "addAll", "add_all",
    "setdefault", "unshift", "appendleft",
];

const RESETS: &[&str] = &[
    "clear", "pop", "popleft", "popitem", "shift", "remove", "delete", "discard", "truncate",
    "splice", "drain", "retain", "evict", "poll", "take", "dequeue", "removeFirst", "pop_front",
];

const SIZE_CHECKS: &[&str] = &["len", "size", "length", "count", "Len"];

const OWNER_ROOTS: &[&str] = &["self", "this", "cls"];

pub struct UnboundedGrowth {
    meta: RuleMeta,
}

impl UnboundedGrowth {
    pub fn new() -> Self {
        Self {
            meta: RuleMeta {
                id: "unbounded-growth",
                title: "unbounded collection growth",
                category: Category::Memory,
                severity: Severity::Medium,
                targets: &[NodeTag::Call],
                languages: &[],
                template: "bound-collection",
                summary: "keeps adding to a long-lived collection that is never trimmed",
            },
        }
    }
}

impl Default for UnboundedGrowth {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for UnboundedGrowth {
    fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    fn check(&self, node: &IsgNode, cx: &RuleContext<'_>) -> Result<Option<Captures>, RuleFault> {
        let call = node.as_call().ok_or(RuleFault::MissingAttribute("callee"))?;
        if !APPENDS.contains(&call.callee.as_str()) {
            return Ok(None);
        }
        let Some(receiver) = call.receiver.as_deref() else {
            return Ok(None);
        };
        let scope = cx.scope_of(node);
        if scope.kind != ScopeKind::Function {
            return Ok(None);
        }
        let root = cx
            .index
            .scope_root(scope)
            .ok_or(RuleFault::MissingAttribute("scope root"))?;

        let receiver_root = root_name(receiver);
        let owned_elsewhere = if OWNER_ROOTS.contains(&receiver_root) {
            receiver != receiver_root
        } else {
            !scope.params.iter().any(|p| p == receiver_root) && !cx.declared_in(receiver_root, root)
        };
        if !owned_elsewhere || !built_as_collection(receiver, cx) || is_reset_in(receiver, root) {
            return Ok(None);
        }

        let mut captures = cx.base_captures(node);
        captures.insert("target", receiver, node.span);
        Ok(Some(captures))
    }
}

const COLLECTION_CTORS: &[&str] = &[
    "list", "dict", "set", "defaultdict", "OrderedDict", "Counter", "Map", "Set", "Array",
    "ArrayList", "LinkedList", "HashMap", "HashSet", "BTreeMap", "TreeMap", "make", "vec!",
];

/// Somewhere in the unit, `target` is initialized with a collection
fn built_as_collection(target: &str, cx: &RuleContext<'_>) -> bool {
    cx.index.nodes().any(|n| {
        n.as_assignment().is_some_and(|a| a.target == target)
            && n.children_with(Role::Value).any(|value| match &value.kind {
                NodeKind::Allocation(_) => true,
                NodeKind::Call(call) => {
                    COLLECTION_CTORS.contains(&call.callee.as_str())
                        || (call.callee == "new"
                            && call
                                .receiver_root()
                                .is_some_and(|r| COLLECTION_CTORS.contains(&r) || r.starts_with("Vec") || r.starts_with("Hash")))
                }
                _ => false,
            })
    })
}

/// Any shrink, reassignment or size check of `receiver` within `scope_root`
fn is_reset_in(receiver: &str, scope_root: &IsgNode) -> bool {
    scope_root.scope_descendants().any(|n| match &n.kind {
        NodeKind::Call(call) => {
            let on_receiver = call.receiver.as_deref() == Some(receiver);
            (on_receiver && (RESETS.contains(&call.callee.as_str()) || SIZE_CHECKS.contains(&call.callee.as_str())))
                || (call.receiver.is_none()
                    && SIZE_CHECKS.contains(&call.callee.as_str())
                    && n.children_with(Role::Argument)
                        .any(|a| a.as_identifier() == Some(receiver)))
        }
        NodeKind::Assignment(assign) => assign.target == receiver,
        NodeKind::Identifier(name) => name
            .strip_prefix(receiver)
            .and_then(|rest| rest.strip_prefix('.'))
            .is_some_and(|field| SIZE_CHECKS.contains(&field)),
        _ => false,
    })
}
