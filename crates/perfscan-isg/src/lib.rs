//! perfscan ISG - the Intermediate Structural Graph
//!
//! This crate defines the language-neutral tree every analysis runs on:
//! nodes with kind-specific attributes, spans, scopes, a per-request index
//! for parent/loop/scope lookups and the request's time budget.

mod budget;
mod index;
mod language;
mod node;
mod scope;
mod span;

pub use budget::*;
pub use index::*;
pub use language::*;
pub use node::*;
pub use scope::*;
pub use span::*;

use serde::{Deserialize, Serialize};

/// The structural graph of one unit of source code
///
/// Built once per analysis request and owned by it. Nodes own their children;
/// node ids are dense and assigned in pre-order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Isg {
    pub language: Language,
    pub root: IsgNode,
    /// Module scope first, then functions in pre-order
    pub scopes: Vec<Scope>,
}

impl Isg {
    /// Wrap a translated tree and derive its scopes
    pub fn new(language: Language, root: IsgNode) -> Self {
        let scopes = scope::collect_scopes(&root);
        Self {
            language,
            root,
            scopes,
        }
    }

    pub fn node_count(&self) -> usize {
        self.root.descendants().count()
    }

    pub fn scope_named(&self, name: &str) -> Option<&Scope> {
        self.scopes.iter().find(|s| s.name == name)
    }

    pub fn index(&self) -> IsgIndex<'_> {
        IsgIndex::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_span(start: usize, end: usize) -> Span {
        Span::new(start, end, 1, 1)
    }

    fn make_node(id: u32, kind: NodeKind, role: Role, span: Span, children: Vec<IsgNode>) -> IsgNode {
        IsgNode {
            id: NodeId(id),
            kind,
            role,
            span,
            children,
        }
    }

    fn make_loop(id: u32, role: Role, span: Span, children: Vec<IsgNode>) -> IsgNode {
        make_node(
            id,
            NodeKind::Loop(LoopNode {
                loop_kind: LoopKind::ForEach,
                binding: Some("x".into()),
                iterable: Some("xs".into()),
                bound: LoopBound::Input,
            }),
            role,
            span,
            children,
        )
    }

    fn make_call(id: u32, role: Role, span: Span, callee: &str) -> IsgNode {
        make_node(
            id,
            NodeKind::Call(CallNode {
                callee: callee.into(),
                receiver: None,
                arg_count: 0,
                constructs: false,
            }),
            role,
            span,
            vec![],
        )
    }

    /// module
    ///   fn load(rows)
    ///     for x in <iterable: make()>:
    ///       for y in ...:
    ///         work()
    fn sample() -> Isg {
        let inner = make_loop(4, Role::Body, make_span(30, 60), vec![make_call(5, Role::Body, make_span(40, 50), "work")]);
        let outer = make_loop(
            2,
            Role::Body,
            make_span(20, 70),
            vec![make_call(3, Role::Iterable, make_span(22, 28), "make"), inner],
        );
        let function = make_node(
            1,
            NodeKind::Function(FunctionNode {
                name: "load".into(),
                params: vec!["rows".into()],
                decorators: vec![],
            }),
            Role::Item,
            make_span(10, 80),
            vec![outer],
        );
        let root = make_node(0, NodeKind::Module, Role::Item, make_span(0, 100), vec![function]);
        Isg::new(Language::Python, root)
    }

    #[test]
    fn test_scopes_collected() {
        let isg = sample();
        assert_eq!(isg.scopes.len(), 2);
        let load = isg.scope_named("load").expect("scope");
        assert_eq!(load.kind, ScopeKind::Function);
        assert_eq!(load.nesting_depth, 1);
        assert_eq!(load.param_count(), 1);
        assert_eq!(load.parent, Some(ScopeId(0)));
    }

    #[test]
    fn test_index_parents_and_scopes() {
        let isg = sample();
        let index = isg.index();
        assert_eq!(index.len(), 6);
        assert_eq!(index.parent(NodeId(5)).map(|n| n.id), Some(NodeId(4)));
        assert_eq!(index.scope_of(NodeId(5)).name, "load");
        assert_eq!(index.scope_of(NodeId(0)).name, "<module>");
        let chain: Vec<u32> = index.ancestors(NodeId(5)).map(|n| n.id.0).collect();
        assert_eq!(chain, vec![4, 2, 1, 0]);
    }

    #[test]
    fn test_enclosing_loops_skip_iterable() {
        let isg = sample();
        let index = isg.index();
        assert_eq!(index.loop_depth(NodeId(5)), 2);
        // The iterable expression runs once, before the loop starts
        assert_eq!(index.loop_depth(NodeId(3)), 0);
    }

    #[test]
    fn test_fan_in_counts_local_calls() {
        let isg = sample();
        let index = isg.index();
        assert_eq!(index.fan_in("work"), 1);
        assert_eq!(index.fan_in("missing"), 0);
    }
}
