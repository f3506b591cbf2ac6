//! Scopes: named views over ISG subtrees that complexity is computed for

use serde::{Deserialize, Serialize};

use crate::{IsgNode, NodeId, NodeKind, Span};

/// Unique identifier for a scope within one ISG
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScopeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeKind {
    /// Module-level statements
    Module,
    /// Function or method body
    Function,
}

/// A function, method, or module-level block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scope {
    pub id: ScopeId,
    pub kind: ScopeKind,
    pub name: String,
    pub params: Vec<String>,
    /// Number of enclosing function scopes (0 for the module)
    pub nesting_depth: u32,
    /// Root node of the scope's subtree
    pub root: NodeId,
    pub span: Span,
    pub parent: Option<ScopeId>,
}

impl Scope {
    pub fn param_count(&self) -> usize {
        self.params.len()
    }
}

/// Collect the module scope plus one scope per function definition
pub(crate) fn collect_scopes(root: &IsgNode) -> Vec<Scope> {
    let mut scopes = vec![Scope {
        id: ScopeId(0),
        kind: ScopeKind::Module,
        name: "<module>".into(),
        params: vec![],
        nesting_depth: 0,
        root: root.id,
        span: root.span,
        parent: None,
    }];
    for child in &root.children {
        visit(child, ScopeId(0), &mut scopes);
    }
    scopes
}

fn visit(node: &IsgNode, current: ScopeId, scopes: &mut Vec<Scope>) {
    let mut inner = current;
    if let NodeKind::Function(function) = &node.kind {
        let depth = scopes[current.0 as usize].nesting_depth + 1;
        inner = ScopeId(scopes.len() as u32);
        scopes.push(Scope {
            id: inner,
            kind: ScopeKind::Function,
            name: function.name.clone(),
            params: function.params.clone(),
            nesting_depth: depth,
            root: node.id,
            span: node.span,
            parent: Some(current),
        });
    }
    for child in &node.children {
        visit(child, inner, scopes);
    }
}
