//! Awaiting independent async calls one iteration at a time

use perfscan_isg::{IsgNode, Language, NodeKind, NodeTag};

use super::words;
use crate::{Captures, Category, Rule, RuleContext, RuleFault, RuleMeta, Severity};

/// Deliberate pauses are sequential on purpose
const PACING: &[&str] = &["sleep", "delay", "wait", "timeout", "throttle", "backoff"];

pub struct AwaitInLoop {
    meta: RuleMeta,
}

impl AwaitInLoop {
    pub fn new() -> Self {
        Self {
            meta: RuleMeta {
                id: "await-in-loop",
                title: "sequential await in loop",
                category: Category::Async,
                severity: Severity::Medium,
                targets: &[NodeTag::Await],
                languages: &[Language::JavaScript, Language::TypeScript, Language::Python],
                template: "gather-awaits",
                summary: "waits for each async call before starting the next",
            },
        }
    }
}

impl Default for AwaitInLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for AwaitInLoop {
    fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    fn check(&self, node: &IsgNode, cx: &RuleContext<'_>) -> Result<Option<Captures>, RuleFault> {
        if cx.loops_around(node).is_empty() {
            return Ok(None);
        }
        let Some(awaited) = node.children.first() else {
            return Err(RuleFault::UnexpectedShape("await without an operand".into()));
        };
        let NodeKind::Call(call) = &awaited.kind else {
            return Ok(None);
        };
        let pacing = words(&call.callee).iter().any(|w| PACING.contains(&w.as_str()));
        // Promise.all / asyncio.gather already run concurrently
        let batched = matches!(call.callee.as_str(), "all" | "allSettled" | "gather" | "race" | "any");
        if pacing || batched {
            return Ok(None);
        }
        let mut captures = cx.base_captures(awaited);
        captures.insert("callee", call.path(), awaited.span);
        Ok(Some(captures))
    }
}
