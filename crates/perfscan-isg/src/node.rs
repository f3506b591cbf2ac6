//! ISG nodes
//!
//! One node per syntactic construct the analyses care about. Anything the
//! adapter has no mapping for becomes `NodeKind::Other` and keeps its children,
//! so nesting is never lost.

use serde::{Deserialize, Serialize};

use crate::Span;

/// Dense pre-order identifier of a node within one ISG
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node of the Intermediate Structural Graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsgNode {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Role of this node within its parent
    pub role: Role,
    pub span: Span,
    pub children: Vec<IsgNode>,
}

/// Position of a child relative to its parent construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Plain ordered child
    Item,
    /// Statement of a loop, function, closure or branch body
    Body,
    /// Else branch of a conditional
    Else,
    /// Loop or branch condition
    Condition,
    /// Loop iterable, evaluated once before iteration
    Iterable,
    /// Per-iteration update of a C-style loop
    Update,
    Receiver,
    Argument,
    Value,
    Left,
    Right,
}

/// Node kind with its kind-specific attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Module,
    Function(FunctionNode),
    Block,
    Loop(LoopNode),
    Call(CallNode),
    Allocation(AllocationNode),
    Closure(ClosureNode),
    Conditional,
    CollectionOp(CollectionOpNode),
    Assignment(AssignmentNode),
    Binary(BinaryNode),
    Await,
    Return,
    Identifier(String),
    Literal(LiteralNode),
    /// Unmapped grammar kind
    Other(String),
}

/// Attribute-free view of a `NodeKind`, used by rules to declare targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeTag {
    Module,
    Function,
    Block,
    Loop,
    Call,
    Allocation,
    Closure,
    Conditional,
    CollectionOp,
    Assignment,
    Binary,
    Await,
    Return,
    Identifier,
    Literal,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionNode {
    pub name: String,
    pub params: Vec<String>,
    /// Decorator / attribute texts attached to the definition
    pub decorators: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopNode {
    pub loop_kind: LoopKind,
    /// Loop variable, for for-each loops
    pub binding: Option<String>,
    /// Source text of the iterated expression when it is a plain or dotted name
    pub iterable: Option<String>,
    pub bound: LoopBound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoopKind {
    /// C-style `for (init; cond; update)`
    For,
    /// `for x in xs` / `for (x of xs)` / comprehensions
    ForEach,
    While,
    /// `loop {}` / `for {}` / `while true`
    Infinite,
}

/// Static estimate of how many times a loop runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoopBound {
    /// Trip count is a literal known at parse time
    Constant(u64),
    /// Trip count depends on input
    Input,
    /// No syntactic exit condition
    Unbounded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallNode {
    /// Last path segment of the callee (`fetch` for `db.users.fetch`)
    pub callee: String,
    /// Everything before the last segment, if any (`db.users`)
    pub receiver: Option<String>,
    pub arg_count: usize,
    /// `new X(...)` style constructor call
    pub constructs: bool,
}

impl CallNode {
    /// Dotted callee path, e.g. `re.compile`
    pub fn path(&self) -> String {
        match &self.receiver {
            Some(receiver) => format!("{}.{}", receiver, self.callee),
            None => self.callee.clone(),
        }
    }

    /// Root identifier of the receiver (`self` for `self.items.append`)
    pub fn receiver_root(&self) -> Option<&str> {
        self.receiver.as_deref().map(root_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectionShape {
    List,
    Map,
    Set,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationNode {
    pub shape: CollectionShape,
    pub element_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosureNode {
    pub params: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectionOpKind {
    /// `xs[i]`
    Index,
    /// `x in xs`
    Membership,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionOpNode {
    pub op: CollectionOpKind,
    /// Name of the collection operand when it is a plain or dotted name
    pub collection: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignOp {
    /// `=` / `let` / `:=`
    Set,
    Add,
    Sub,
    Mul,
    Div,
    Shl,
    Shr,
    Other(String),
}

impl AssignOp {
    /// Map a compound operator token (`+=`, `//=`, `>>=`)
    pub fn from_operator(op: &str) -> AssignOp {
        match op.trim() {
            "=" | ":=" => AssignOp::Set,
            "+=" => AssignOp::Add,
            "-=" => AssignOp::Sub,
            "*=" => AssignOp::Mul,
            "/=" | "//=" => AssignOp::Div,
            "<<=" => AssignOp::Shl,
            ">>=" | ">>>=" => AssignOp::Shr,
            other => AssignOp::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentNode {
    /// Source text of the assigned place (`total`, `self.buf`)
    pub target: String,
    pub op: AssignOp,
    /// Introduces a new binding (`let`, `const`, `:=`)
    pub declares: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryNode {
    pub operator: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiteralKind {
    String,
    Number,
    Bool,
    Null,
    Regex,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiteralNode {
    pub kind: LiteralKind,
    pub text: String,
}

impl LiteralNode {
    /// Integer value of a numeric literal (`1_000`, `0x10`, `10L` are accepted)
    pub fn as_integer(&self) -> Option<u64> {
        if self.kind != LiteralKind::Number {
            return None;
        }
        let cleaned: String = self.text.chars().filter(|c| *c != '_').collect();
        if let Some(hex) = cleaned.strip_prefix("0x").or_else(|| cleaned.strip_prefix("0X")) {
            return u64::from_str_radix(hex, 16).ok();
        }
        let digits_end = cleaned
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(cleaned.len());
        let (digits, suffix) = cleaned.split_at(digits_end);
        // Type suffixes (`10L`, `10u64`) are fine, fractions and exponents are not
        if suffix.starts_with(['.', 'e', 'E']) {
            return None;
        }
        digits.parse().ok()
    }
}

impl NodeKind {
    pub fn tag(&self) -> NodeTag {
        match self {
            NodeKind::Module => NodeTag::Module,
            NodeKind::Function(_) => NodeTag::Function,
            NodeKind::Block => NodeTag::Block,
            NodeKind::Loop(_) => NodeTag::Loop,
            NodeKind::Call(_) => NodeTag::Call,
            NodeKind::Allocation(_) => NodeTag::Allocation,
            NodeKind::Closure(_) => NodeTag::Closure,
            NodeKind::Conditional => NodeTag::Conditional,
            NodeKind::CollectionOp(_) => NodeTag::CollectionOp,
            NodeKind::Assignment(_) => NodeTag::Assignment,
            NodeKind::Binary(_) => NodeTag::Binary,
            NodeKind::Await => NodeTag::Await,
            NodeKind::Return => NodeTag::Return,
            NodeKind::Identifier(_) => NodeTag::Identifier,
            NodeKind::Literal(_) => NodeTag::Literal,
            NodeKind::Other(_) => NodeTag::Other,
        }
    }
}

impl IsgNode {
    pub fn tag(&self) -> NodeTag {
        self.kind.tag()
    }

    /// Children with the given role
    pub fn children_with(&self, role: Role) -> impl Iterator<Item = &IsgNode> {
        self.children.iter().filter(move |c| c.role == role)
    }

    /// Pre-order iterator over this node and its descendants
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Pre-order iterator that does not enter nested function definitions
    pub fn scope_descendants(&self) -> ScopeDescendants<'_> {
        ScopeDescendants {
            root: self.id,
            stack: vec![self],
        }
    }

    pub fn as_call(&self) -> Option<&CallNode> {
        match &self.kind {
            NodeKind::Call(call) => Some(call),
            _ => None,
        }
    }

    pub fn as_loop(&self) -> Option<&LoopNode> {
        match &self.kind {
            NodeKind::Loop(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_assignment(&self) -> Option<&AssignmentNode> {
        match &self.kind {
            NodeKind::Assignment(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_identifier(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Identifier(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&LiteralNode> {
        match &self.kind {
            NodeKind::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    /// Whether any node in this subtree satisfies `pred`
    pub fn any(&self, pred: impl Fn(&IsgNode) -> bool) -> bool {
        self.descendants().any(|n| pred(n))
    }

    /// Identifiers referenced anywhere in this subtree
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.descendants().filter_map(IsgNode::as_identifier)
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a IsgNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a IsgNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

pub struct ScopeDescendants<'a> {
    root: NodeId,
    stack: Vec<&'a IsgNode>,
}

impl<'a> Iterator for ScopeDescendants<'a> {
    type Item = &'a IsgNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let nested_function = node.id != self.root && node.tag() == NodeTag::Function;
        if !nested_function {
            self.stack.extend(node.children.iter().rev());
        }
        Some(node)
    }
}

/// Leading identifier of a dotted path (`self` in `self.cache.get`)
pub fn root_name(path: &str) -> &str {
    path.split(['.', '[', '(', ':'])
        .find(|s| !s.is_empty())
        .unwrap_or(path)
}
