//! N+1 query detection
//!
//! Two hops: a loop iterates over a collection that was itself fetched
//! (`users = db.query(...)`), and the loop issues another fetch per element.

use perfscan_isg::{root_name, IsgNode, LoopKind, NodeKind, NodeTag, Role, Span};

use super::is_query_call;
use crate::{Captures, Category, Rule, RuleContext, RuleFault, RuleMeta, Severity};

pub struct NPlusOneQuery {
    meta: RuleMeta,
}

impl NPlusOneQuery {
    pub fn new() -> Self {
        Self {
            meta: RuleMeta {
                id: "n-plus-one-query",
                title: "N+1 query pattern",
                category: Category::Query,
                severity: Severity::Critical,
                targets: &[NodeTag::Call],
                languages: &[],
                template: "batch-query",
                summary: "fetches once per element of a collection that was itself fetched",
            },
        }
    }
}

impl Default for NPlusOneQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for NPlusOneQuery {
    fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    fn check(&self, node: &IsgNode, cx: &RuleContext<'_>) -> Result<Option<Captures>, RuleFault> {
        let call = node
            .as_call()
            .ok_or(RuleFault::MissingAttribute("callee"))?;
        if !is_query_call(call) {
            return Ok(None);
        }

        for lp in cx.loops_around(node) {
            let Some((source, source_span)) = fetched_source(lp, cx) else {
                continue;
            };
            let mut captures = cx.base_captures(node);
            captures.insert("source", source, source_span);
            if let Some(l) = lp.as_loop() {
                if let Some(binding) = &l.binding {
                    captures.insert("loop_var", binding.as_str(), lp.span);
                }
                if let Some(iterable) = &l.iterable {
                    captures.insert("iterable", iterable.as_str(), source_span);
                }
            }
            return Ok(Some(captures));
        }
        Ok(None)
    }
}

/// Where the loop's collection was fetched from, if it was
fn fetched_source(lp: &IsgNode, cx: &RuleContext<'_>) -> Option<(String, Span)> {
    if lp.as_loop()?.loop_kind != LoopKind::ForEach {
        return None;
    }
    let iterable = lp.children_with(Role::Iterable).next()?;
    source_of(iterable, lp, cx)
}

fn source_of(expr: &IsgNode, lp: &IsgNode, cx: &RuleContext<'_>) -> Option<(String, Span)> {
    match &expr.kind {
        NodeKind::Call(call) if is_query_call(call) => Some((call.path(), expr.span)),
        // `users.all()`, `rows.iter()`
        NodeKind::Call(call) => call
            .receiver
            .as_deref()
            .and_then(|receiver| fetched_binding(receiver, lp, cx)),
        NodeKind::Identifier(name) => fetched_binding(name, lp, cx),
        NodeKind::Await => expr.children.first().and_then(|inner| source_of(inner, lp, cx)),
        _ => None,
    }
}

/// The latest assignment to `name` before the loop, if its value fetches
fn fetched_binding(name: &str, lp: &IsgNode, cx: &RuleContext<'_>) -> Option<(String, Span)> {
    let lookup = |target: &str| {
        cx.assignments_before(target, lp).into_iter().last().filter(|assign| {
            assign
                .children_with(Role::Value)
                .any(|value| value.any(|n| n.as_call().is_some_and(is_query_call)))
        })
    };
    lookup(name)
        .or_else(|| lookup(root_name(name)))
        .map(|assign| (name.to_string(), assign.span))
}
