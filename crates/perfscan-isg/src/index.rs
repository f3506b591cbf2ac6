//! Per-request lookup tables over an ISG
//!
//! Built once per analysis request so rules and the estimator can ask for
//! parents, enclosing loops and scopes without re-walking the tree.

use std::collections::HashMap;

use crate::{Isg, IsgNode, NodeId, NodeKind, Role, Scope, ScopeId};

/// Borrowed index over an ISG
#[derive(Debug)]
pub struct IsgIndex<'a> {
    isg: &'a Isg,
    /// All nodes in pre-order; position equals `NodeId`
    nodes: Vec<&'a IsgNode>,
    parents: Vec<Option<NodeId>>,
    scope_of: Vec<ScopeId>,
    /// Number of unqualified (or `self`/`this`) call sites per callee name
    fan_in: HashMap<&'a str, usize>,
}

impl<'a> IsgIndex<'a> {
    pub fn new(isg: &'a Isg) -> Self {
        let mut index = IsgIndex {
            isg,
            nodes: Vec::new(),
            parents: Vec::new(),
            scope_of: Vec::new(),
            fan_in: HashMap::new(),
        };
        let mut scope_by_root: HashMap<NodeId, ScopeId> = HashMap::new();
        for scope in &isg.scopes {
            scope_by_root.insert(scope.root, scope.id);
        }
        index.visit(&isg.root, None, ScopeId(0), &scope_by_root);
        index
    }

    fn visit(
        &mut self,
        node: &'a IsgNode,
        parent: Option<NodeId>,
        scope: ScopeId,
        scope_by_root: &HashMap<NodeId, ScopeId>,
    ) {
        let scope = scope_by_root.get(&node.id).copied().unwrap_or(scope);
        let slot = node.id.index();
        if self.nodes.len() <= slot {
            self.nodes.resize(slot + 1, node);
            self.parents.resize(slot + 1, None);
            self.scope_of.resize(slot + 1, ScopeId(0));
        }
        self.nodes[slot] = node;
        self.parents[slot] = parent;
        self.scope_of[slot] = scope;

        if let NodeKind::Call(call) = &node.kind {
            let local = match call.receiver.as_deref() {
                None => true,
                Some(receiver) => receiver == "self" || receiver == "this",
            };
            if local {
                *self.fan_in.entry(call.callee.as_str()).or_default() += 1;
            }
        }

        for child in &node.children {
            self.visit(child, Some(node.id), scope, scope_by_root);
        }
    }

    pub fn isg(&self) -> &'a Isg {
        self.isg
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in pre-order
    pub fn nodes(&self) -> impl Iterator<Item = &'a IsgNode> + '_ {
        self.nodes.iter().copied()
    }

    pub fn node(&self, id: NodeId) -> Option<&'a IsgNode> {
        self.nodes.get(id.index()).copied().filter(|n| n.id == id)
    }

    pub fn parent(&self, id: NodeId) -> Option<&'a IsgNode> {
        let parent = (*self.parents.get(id.index())?)?;
        self.node(parent)
    }

    /// Ancestors from the parent up to the root
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = &'a IsgNode> + '_ {
        let mut current = id;
        std::iter::from_fn(move || {
            let parent = self.parent(current)?;
            current = parent.id;
            Some(parent)
        })
    }

    /// Innermost scope containing the node
    pub fn scope_of(&self, id: NodeId) -> &'a Scope {
        let scope = self
            .scope_of
            .get(id.index())
            .copied()
            .unwrap_or(ScopeId(0));
        self.scope(scope)
    }

    pub fn scope(&self, id: ScopeId) -> &'a Scope {
        let scopes = &self.isg.scopes;
        scopes.get(id.0 as usize).unwrap_or(&scopes[0])
    }

    pub fn scope_root(&self, scope: &Scope) -> Option<&'a IsgNode> {
        self.node(scope.root)
    }

    /// Loops whose per-iteration part (body, condition, update) contains the
    /// node, innermost first
    ///
    /// Stops at the enclosing function or closure: code in a nested callable is
    /// not known to run once per iteration. A loop's iterable, initializer and
    /// else clause run at most once and do not count.
    pub fn enclosing_loops(&self, id: NodeId) -> Vec<&'a IsgNode> {
        let mut loops = Vec::new();
        let mut current = match self.node(id) {
            Some(node) => node,
            None => return loops,
        };
        while let Some(parent) = self.parent(current.id) {
            match &parent.kind {
                NodeKind::Function(_) | NodeKind::Closure(_) => break,
                NodeKind::Loop(_)
                    if matches!(current.role, Role::Body | Role::Condition | Role::Update) =>
                {
                    loops.push(parent)
                }
                _ => {}
            }
            current = parent;
        }
        loops
    }

    pub fn loop_depth(&self, id: NodeId) -> usize {
        self.enclosing_loops(id).len()
    }

    /// Number of local call sites naming `callee`
    pub fn fan_in(&self, callee: &str) -> usize {
        self.fan_in.get(callee).copied().unwrap_or(0)
    }
}
