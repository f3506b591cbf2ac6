//! Quadratic string building by repeated reassignment

use perfscan_isg::{AssignOp, IsgNode, LiteralKind, NodeKind, NodeTag, Role};

use crate::{Captures, Category, Rule, RuleContext, RuleFault, RuleMeta, Severity};

pub struct StringConcatInLoop {
    meta: RuleMeta,
}

impl StringConcatInLoop {
    pub fn new() -> Self {
        Self {
            meta: RuleMeta {
                id: "string-concat-in-loop",
                title: "string concatenation in loop",
                category: Category::String,
                severity: Severity::Medium,
                targets: &[NodeTag::Assignment],
                languages: &[],
                template: "join-strings",
                summary: "rebuilds the whole string on every iteration",
            },
        }
    }
}

impl Default for StringConcatInLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for StringConcatInLoop {
    fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    fn check(&self, node: &IsgNode, cx: &RuleContext<'_>) -> Result<Option<Captures>, RuleFault> {
        let assign = node
            .as_assignment()
            .ok_or_else(|| RuleFault::UnexpectedShape(format!("expected an assignment, found {:?}", node.tag())))?;
        if assign.target.is_empty() || cx.loops_around(node).is_empty() {
            return Ok(None);
        }
        let target = assign.target.as_str();
        let Some(value) = node.children_with(Role::Value).next() else {
            return Ok(None);
        };

        // s += x  or  s = s + x
        let appended: Vec<&IsgNode> = match assign.op {
            AssignOp::Add => vec![value],
            AssignOp::Set => match &value.kind {
                NodeKind::Binary(binary)
                    if binary.operator == "+"
                        && value
                            .children_with(Role::Left)
                            .next()
                            .and_then(|l| l.as_identifier())
                            == Some(target) =>
                {
                    value.children_with(Role::Right).collect()
                }
                _ => return Ok(None),
            },
            _ => return Ok(None),
        };

        if !cx.outlives_loop(perfscan_isg::root_name(target), node) {
            return Ok(None);
        }

        let literal_piece = appended.iter().any(|piece| contains_string_literal(piece));
        let string_seed = cx.assignments_before(target, node).iter().any(|earlier| {
            earlier
                .children_with(Role::Value)
                .any(|v| v.as_literal().is_some_and(|l| l.kind == LiteralKind::String))
        });
        if !literal_piece && !string_seed {
            return Ok(None);
        }

        let mut captures = cx.base_captures(node);
        captures.insert("target", target, node.span);
        Ok(Some(captures))
    }
}

/// String literal as the appended value or one operand of a `+` chain
fn contains_string_literal(node: &IsgNode) -> bool {
    match &node.kind {
        NodeKind::Literal(lit) => lit.kind == LiteralKind::String,
        NodeKind::Binary(binary) if binary.operator == "+" => {
            node.children.iter().any(contains_string_literal)
        }
        _ => false,
    }
}
