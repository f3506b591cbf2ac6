//! Syntax tree → ISG translation
//!
//! Pure re-labeling: every construct keeps its span and nesting, and the only
//! derived attributes are the ones a reader can see in the syntax (names,
//! operators, literal loop bounds).

use std::collections::HashSet;

use perfscan_isg::{
    AllocationNode, AssignOp, AssignmentNode, BinaryNode, CallNode, ClosureNode, CollectionOpKind,
    CollectionOpNode, FunctionNode, IsgNode, LiteralKind, LiteralNode, LoopBound, LoopKind,
    LoopNode, NodeId, NodeKind, Role, Span,
};

use crate::{AdapterError, Construct, MappingTable, SyntaxNode, MAX_DEPTH};

// Field names shared by tree-sitter grammars, grouped by the role they play
const NAME: &[&str] = &["name"];
const PARAMS: &[&str] = &["parameters", "parameter"];
const BODY: &[&str] = &["body"];
const ITERABLE: &[&str] = &["right", "value"];
const BINDING: &[&str] = &["left", "pattern", "name"];
const INIT: &[&str] = &["initializer", "init"];
const CONDITION: &[&str] = &["condition"];
const UPDATE: &[&str] = &["increment", "update"];
const CONSEQUENCE: &[&str] = &["consequence", "body"];
const ALTERNATIVE: &[&str] = &["alternative"];
const CALLEE: &[&str] = &["function", "name", "constructor", "macro", "type"];
const RECEIVER: &[&str] = &["object"];
const ARGS: &[&str] = &["arguments"];
const MEMBER_OBJECT: &[&str] = &["object", "value", "operand", "path"];
const MEMBER_PROPERTY: &[&str] = &["attribute", "property", "field", "name"];
const INDEX_OBJECT: &[&str] = &["value", "object", "operand", "array"];
const TARGET: &[&str] = &["left", "name", "pattern"];
const VALUE: &[&str] = &["right", "value"];
const OPERATOR: &[&str] = &["operator", "operators"];
const LEFT: &[&str] = &["left"];
const RIGHT: &[&str] = &["right"];

const IMPLICIT_RECEIVERS: &[&str] = &["self", "cls", "this"];

pub(crate) struct Translator<'t> {
    table: &'t MappingTable,
    next_id: u32,
    /// Names whose latest assignment in the current function is an integer literal
    counters: HashSet<String>,
}

impl<'t> Translator<'t> {
    pub fn new(table: &'t MappingTable) -> Self {
        Self {
            table,
            next_id: 0,
            counters: HashSet::new(),
        }
    }

    pub fn translate(&mut self, root: &SyntaxNode) -> Result<IsgNode, AdapterError> {
        if !root.named {
            return Err(AdapterError::malformed(
                format!("root `{}` is an unnamed token", root.kind),
                root.span,
            ));
        }
        validate_spans(root, None, 0)?;
        self.node(root, Role::Item)
    }

    fn alloc(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn construct(&self, syntax: &SyntaxNode) -> Option<Construct> {
        self.table.construct(&syntax.kind)
    }

    fn node(&mut self, syntax: &SyntaxNode, role: Role) -> Result<IsgNode, AdapterError> {
        let construct = match self.construct(syntax) {
            Some(construct) => construct,
            None => return self.generic(syntax, role, NodeKind::Other(syntax.kind.clone())),
        };

        match construct {
            Construct::Transparent => {
                let mut named = syntax.named_children();
                if let (Some(only), None) = (named.next(), named.next()) {
                    return self.node(only, role);
                }
                self.generic(syntax, role, NodeKind::Other(syntax.kind.clone()))
            }
            Construct::Module => self.generic(syntax, role, NodeKind::Module),
            Construct::Block => self.generic(syntax, role, NodeKind::Block),
            Construct::Return => self.generic(syntax, role, NodeKind::Return),
            Construct::Await => self.generic(syntax, role, NodeKind::Await),
            Construct::Function => {
                let name = syntax
                    .field_any(NAME)
                    .and_then(|n| self.name_of(n))
                    .unwrap_or_else(|| "<anonymous>".into());
                self.function(syntax, role, name, Vec::new(), syntax.span)
            }
            Construct::Decorated => self.decorated(syntax, role),
            Construct::Loop(kind) => self.loop_node(syntax, role, kind),
            Construct::Comprehension => self.comprehension(syntax, role),
            Construct::ClauseLoop => self.clause_loop(syntax, role),
            Construct::Call => self.call(syntax, role, false),
            Construct::New => self.call(syntax, role, true),
            Construct::MacroCall => self.macro_call(syntax, role),
            Construct::Member => match self.name_of(syntax) {
                Some(path) => Ok(self.leaf(syntax, role, NodeKind::Identifier(path))),
                None => self.generic(syntax, role, NodeKind::Other(syntax.kind.clone())),
            },
            Construct::Index => {
                let collection = syntax
                    .field_any(INDEX_OBJECT)
                    .or_else(|| syntax.named_children().next())
                    .and_then(|n| self.name_of(n));
                let kind = NodeKind::CollectionOp(CollectionOpNode {
                    op: CollectionOpKind::Index,
                    collection,
                });
                self.generic(syntax, role, kind)
            }
            Construct::Assign => self.assign(syntax, role, false),
            Construct::Declare => self.assign(syntax, role, true),
            Construct::Binary | Construct::Range => self.binary(syntax, role),
            Construct::Identifier => {
                let kind = NodeKind::Identifier(syntax.leaf_text().to_string());
                Ok(self.leaf(syntax, role, kind))
            }
            Construct::Literal(kind) => {
                let text = if syntax.children.is_empty() {
                    syntax.leaf_text().to_string()
                } else {
                    syntax.flat_text()
                };
                self.generic(syntax, role, NodeKind::Literal(LiteralNode { kind, text }))
            }
            Construct::Collection(shape) => {
                let kind = NodeKind::Allocation(AllocationNode {
                    shape,
                    element_count: syntax.named_children().count(),
                });
                self.generic(syntax, role, kind)
            }
            Construct::Closure => self.closure(syntax, role),
            Construct::Conditional => self.conditional(syntax, role),
        }
    }

    fn leaf(&mut self, syntax: &SyntaxNode, role: Role, kind: NodeKind) -> IsgNode {
        IsgNode {
            id: self.alloc(),
            kind,
            role,
            span: syntax.span,
            children: Vec::new(),
        }
    }

    /// Keep the construct, translate every named child as a plain item
    fn generic(&mut self, syntax: &SyntaxNode, role: Role, kind: NodeKind) -> Result<IsgNode, AdapterError> {
        let id = self.alloc();
        let mut children = Vec::new();
        for child in syntax.named_children() {
            children.push(self.node(child, Role::Item)?);
        }
        Ok(IsgNode {
            id,
            kind,
            role,
            span: syntax.span,
            children,
        })
    }

    // === Callables ===

    fn function(
        &mut self,
        syntax: &SyntaxNode,
        role: Role,
        name: String,
        decorators: Vec<String>,
        span: Span,
    ) -> Result<IsgNode, AdapterError> {
        let id = self.alloc();
        let params = syntax
            .field_any(PARAMS)
            .map(|p| self.param_names(p))
            .unwrap_or_default();
        let outer = std::mem::take(&mut self.counters);
        let body = syntax.field_any(BODY).map(|body| self.node(body, Role::Body));
        self.counters = outer;
        // Declarations without a body (interfaces, abstract methods) stay empty
        let mut children = Vec::new();
        if let Some(body) = body {
            children.push(body?);
        }
        Ok(IsgNode {
            id,
            kind: NodeKind::Function(FunctionNode {
                name,
                params,
                decorators,
            }),
            role,
            span,
            children,
        })
    }

    fn decorated(&mut self, syntax: &SyntaxNode, role: Role) -> Result<IsgNode, AdapterError> {
        let decorators: Vec<String> = syntax
            .named_children()
            .filter(|c| c.kind == "decorator")
            .map(|c| c.flat_text().trim_start_matches('@').trim().replace(' ', ""))
            .collect();
        let definition = syntax
            .field_any(&["definition"])
            .or_else(|| syntax.named_children().filter(|c| c.kind != "decorator").last());
        match definition {
            Some(def) if self.construct(def) == Some(Construct::Function) => {
                let name = def
                    .field_any(NAME)
                    .and_then(|n| self.name_of(n))
                    .unwrap_or_else(|| "<anonymous>".into());
                self.function(def, role, name, decorators, syntax.span)
            }
            _ => self.generic(syntax, role, NodeKind::Other(syntax.kind.clone())),
        }
    }

    fn closure(&mut self, syntax: &SyntaxNode, role: Role) -> Result<IsgNode, AdapterError> {
        let id = self.alloc();
        let params = syntax
            .field_any(PARAMS)
            .map(|p| self.param_names(p))
            .unwrap_or_default();
        let mut children = Vec::new();
        if let Some(body) = syntax.field_any(BODY) {
            children.push(self.node(body, Role::Body)?);
        }
        Ok(IsgNode {
            id,
            kind: NodeKind::Closure(ClosureNode { params }),
            role,
            span: syntax.span,
            children,
        })
    }

    fn param_names(&self, params: &SyntaxNode) -> Vec<String> {
        if self.construct(params) == Some(Construct::Identifier) {
            return vec![params.leaf_text().to_string()];
        }
        params
            .named_children()
            .filter(|p| p.kind != "self_parameter")
            .filter_map(|p| {
                if self.construct(p) == Some(Construct::Identifier) {
                    return Some(p.leaf_text().to_string());
                }
                p.field_any(&["name", "pattern", "left"])
                    .and_then(|n| self.name_of(n))
                    .or_else(|| self.first_identifier(p))
            })
            .filter(|name| !IMPLICIT_RECEIVERS.contains(&name.as_str()))
            .collect()
    }

    // === Loops ===

    fn loop_node(&mut self, syntax: &SyntaxNode, role: Role, kind: LoopKind) -> Result<IsgNode, AdapterError> {
        if syntax.field_any(BODY).is_none() {
            return Err(AdapterError::malformed(
                format!("loop `{}` has no body", syntax.kind),
                syntax.span,
            ));
        }
        let id = self.alloc();
        let binding = syntax.field_any(BINDING).and_then(|b| self.name_of(b));
        let iterable = syntax.field_any(ITERABLE).and_then(|i| self.name_of(i));

        let mut children = Vec::new();
        let mut iterable_at = None;
        let mut condition_at = None;
        let mut counters = HashSet::new();
        for child in syntax.named_children() {
            let field = child.field.as_deref().unwrap_or("");
            let child_role = if BODY.contains(&field) {
                Role::Body
            } else if ITERABLE.contains(&field) {
                iterable_at = Some(children.len());
                Role::Iterable
            } else if INIT.contains(&field) {
                Role::Iterable
            } else if CONDITION.contains(&field) {
                condition_at = Some(children.len());
                counters = self.counters.clone();
                Role::Condition
            } else if UPDATE.contains(&field) {
                Role::Update
            } else if BINDING.contains(&field) {
                continue;
            } else if ALTERNATIVE.contains(&field) {
                Role::Else
            } else {
                Role::Item
            };
            children.push(self.node(child, child_role)?);
        }

        let (loop_kind, bound) = self.estimate_bound(
            kind,
            iterable_at.map(|i| &children[i]),
            condition_at.map(|i| &children[i]),
            &counters,
        );
        Ok(IsgNode {
            id,
            kind: NodeKind::Loop(LoopNode {
                loop_kind,
                binding,
                iterable,
                bound,
            }),
            role,
            span: syntax.span,
            children,
        })
    }

    fn comprehension(&mut self, syntax: &SyntaxNode, role: Role) -> Result<IsgNode, AdapterError> {
        let clauses: Vec<&SyntaxNode> = syntax
            .named_children()
            .filter(|c| c.kind == "for_in_clause")
            .collect();
        if clauses.is_empty() {
            return Err(AdapterError::malformed(
                format!("`{}` has no for clause", syntax.kind),
                syntax.span,
            ));
        }
        // Each clause nests one level deeper than the last
        if clauses.len() >= MAX_DEPTH {
            return Err(AdapterError::malformed(
                format!("`{}` is nested deeper than {} levels", syntax.kind, MAX_DEPTH),
                syntax.span,
            ));
        }
        let body = syntax
            .field_any(BODY)
            .or_else(|| syntax.named_children().find(|c| c.kind != "for_in_clause" && c.kind != "if_clause"))
            .ok_or_else(|| AdapterError::malformed(format!("`{}` has no body", syntax.kind), syntax.span))?;
        let filters: Vec<&SyntaxNode> = syntax
            .named_children()
            .filter(|c| c.kind == "if_clause")
            .collect();
        self.comprehension_level(&clauses, &filters, body, role, syntax.span)
    }

    /// One loop per `for` clause; later clauses nest inside earlier ones
    fn comprehension_level(
        &mut self,
        clauses: &[&SyntaxNode],
        filters: &[&SyntaxNode],
        body: &SyntaxNode,
        role: Role,
        span: Span,
    ) -> Result<IsgNode, AdapterError> {
        let id = self.alloc();
        let clause = clauses[0];
        let binding = clause.field_any(LEFT).and_then(|b| self.name_of(b));
        let iterable_syntax = clause.field_any(RIGHT);
        let iterable = iterable_syntax.and_then(|i| self.name_of(i));

        let mut children = Vec::new();
        if let Some(source) = iterable_syntax {
            children.push(self.node(source, Role::Iterable)?);
        }
        if clauses.len() > 1 {
            let inner_span = clauses[1].span.merge(body.span);
            children.push(self.comprehension_level(&clauses[1..], filters, body, Role::Body, inner_span)?);
        } else {
            for filter in filters {
                children.push(self.node(filter, Role::Condition)?);
            }
            children.push(self.node(body, Role::Body)?);
        }

        let (loop_kind, bound) = self.estimate_bound(
            LoopKind::ForEach,
            children.first().filter(|c| c.role == Role::Iterable),
            None,
            &HashSet::new(),
        );
        Ok(IsgNode {
            id,
            kind: NodeKind::Loop(LoopNode {
                loop_kind,
                binding,
                iterable,
                bound,
            }),
            role,
            span,
            children,
        })
    }

    /// Go's single `for` keyword: range clause, C-style clause, bare condition or none
    fn clause_loop(&mut self, syntax: &SyntaxNode, role: Role) -> Result<IsgNode, AdapterError> {
        let body = syntax.field_any(BODY).ok_or_else(|| {
            AdapterError::malformed(format!("loop `{}` has no body", syntax.kind), syntax.span)
        })?;
        let id = self.alloc();
        let header = syntax
            .named_children()
            .find(|c| c.field.as_deref() != Some("body"));

        let mut children = Vec::new();
        let mut binding = None;
        let mut iterable = None;
        let mut iterable_at = None;
        let mut condition_at = None;
        let mut counters = HashSet::new();
        let kind = match header {
            Some(clause) if clause.kind == "range_clause" => {
                binding = clause.field_any(LEFT).and_then(|b| self.name_of(b));
                if let Some(source) = clause.field_any(RIGHT) {
                    iterable = self.name_of(source);
                    iterable_at = Some(children.len());
                    children.push(self.node(source, Role::Iterable)?);
                }
                LoopKind::ForEach
            }
            Some(clause) if clause.kind == "for_clause" => {
                for part in clause.named_children() {
                    let field = part.field.as_deref().unwrap_or("");
                    let part_role = if CONDITION.contains(&field) {
                        condition_at = Some(children.len());
                        counters = self.counters.clone();
                        Role::Condition
                    } else if UPDATE.contains(&field) {
                        Role::Update
                    } else {
                        Role::Iterable
                    };
                    children.push(self.node(part, part_role)?);
                }
                LoopKind::For
            }
            Some(condition) => {
                condition_at = Some(children.len());
                counters = self.counters.clone();
                children.push(self.node(condition, Role::Condition)?);
                LoopKind::While
            }
            None => LoopKind::Infinite,
        };
        children.push(self.node(body, Role::Body)?);

        let (loop_kind, bound) = self.estimate_bound(
            kind,
            iterable_at.map(|i| &children[i]),
            condition_at.map(|i| &children[i]),
            &counters,
        );
        Ok(IsgNode {
            id,
            kind: NodeKind::Loop(LoopNode {
                loop_kind,
                binding,
                iterable,
                bound,
            }),
            role,
            span: syntax.span,
            children,
        })
    }

    fn estimate_bound(
        &self,
        kind: LoopKind,
        iterable: Option<&IsgNode>,
        condition: Option<&IsgNode>,
        counters: &HashSet<String>,
    ) -> (LoopKind, LoopBound) {
        match kind {
            LoopKind::Infinite => (LoopKind::Infinite, LoopBound::Unbounded),
            LoopKind::ForEach => {
                let bound = iterable
                    .and_then(|it| self.constant_iterable(it))
                    .map_or(LoopBound::Input, LoopBound::Constant);
                (LoopKind::ForEach, bound)
            }
            LoopKind::For | LoopKind::While => match condition {
                Some(cond) if is_true_literal(cond) => (LoopKind::Infinite, LoopBound::Unbounded),
                Some(cond) => {
                    let bound = counted_limit(cond, counters).map_or(LoopBound::Input, LoopBound::Constant);
                    (kind, bound)
                }
                None if kind == LoopKind::For => (LoopKind::Infinite, LoopBound::Unbounded),
                None => (kind, LoopBound::Input),
            },
        }
    }

    /// Trip count of an iterable written entirely with literals
    fn constant_iterable(&self, iterable: &IsgNode) -> Option<u64> {
        match &iterable.kind {
            NodeKind::Call(call)
                if call.receiver.is_none() && self.table.range_callees.contains(&call.callee.as_str()) =>
            {
                let args: Vec<u64> = iterable
                    .children_with(Role::Argument)
                    .map(|a| a.as_literal().and_then(|l| l.as_integer()))
                    .collect::<Option<_>>()?;
                match args.as_slice() {
                    [] => None,
                    [n] => Some(*n),
                    [start, end, ..] => Some(end.saturating_sub(*start)),
                }
            }
            NodeKind::Binary(binary) if binary.operator.starts_with("..") => {
                let start = iterable.children.first()?.as_literal()?.as_integer()?;
                let end = iterable.children.get(1)?.as_literal()?.as_integer()?;
                let inclusive = u64::from(binary.operator == "..=");
                Some(end.saturating_sub(start).saturating_add(inclusive))
            }
            NodeKind::Allocation(alloc) => Some(alloc.element_count as u64),
            NodeKind::Literal(lit) if lit.kind == LiteralKind::String => Some(lit.text.chars().count() as u64),
            _ => None,
        }
    }

    // === Calls ===

    fn call(&mut self, syntax: &SyntaxNode, role: Role, constructs: bool) -> Result<IsgNode, AdapterError> {
        let callee_syntax = syntax.field_any(CALLEE).ok_or_else(|| {
            AdapterError::malformed(format!("call `{}` has no callee", syntax.kind), syntax.span)
        })?;
        let id = self.alloc();
        let explicit_receiver = syntax.field_any(RECEIVER);
        let (callee, mut receiver) = self.split_callee(callee_syntax);
        if let Some(object) = explicit_receiver {
            receiver = Some(self.describe(object));
        }
        let args = syntax.field_any(ARGS);
        let arg_count = args.map_or(0, |a| a.named_children().count());

        let mut children = Vec::new();
        let object = explicit_receiver.or_else(|| self.member_object(callee_syntax));
        if let Some(object) = object {
            children.push(self.node(object, Role::Receiver)?);
        }
        if let Some(args) = args {
            for arg in args.named_children() {
                children.push(self.node(arg, Role::Argument)?);
            }
        }
        Ok(IsgNode {
            id,
            kind: NodeKind::Call(CallNode {
                callee,
                receiver,
                arg_count,
                constructs,
            }),
            role,
            span: syntax.span,
            children,
        })
    }

    fn macro_call(&mut self, syntax: &SyntaxNode, role: Role) -> Result<IsgNode, AdapterError> {
        let name = syntax.field_any(&["macro"]).ok_or_else(|| {
            AdapterError::malformed(format!("`{}` has no macro name", syntax.kind), syntax.span)
        })?;
        let (callee, receiver) = self.split_callee(name);
        Ok(self.leaf(
            syntax,
            role,
            NodeKind::Call(CallNode {
                callee: format!("{}!", callee),
                receiver,
                arg_count: 0,
                constructs: false,
            }),
        ))
    }

    /// `(callee, receiver)` of a callee expression
    fn split_callee(&self, callee: &SyntaxNode) -> (String, Option<String>) {
        match self.construct(callee) {
            Some(Construct::Member) => {
                let property = callee
                    .field_any(MEMBER_PROPERTY)
                    .map(|p| self.describe(p))
                    .unwrap_or_else(|| compact(&callee.flat_text()));
                let object = callee.field_any(MEMBER_OBJECT).map(|o| self.describe(o));
                (property, object)
            }
            Some(Construct::Transparent) => match single_named(callee) {
                Some(inner) => self.split_callee(inner),
                None => (compact(&callee.flat_text()), None),
            },
            _ => (self.describe(callee), None),
        }
    }

    fn member_object<'s>(&self, callee: &'s SyntaxNode) -> Option<&'s SyntaxNode> {
        match self.construct(callee) {
            Some(Construct::Member) => callee.field_any(MEMBER_OBJECT),
            Some(Construct::Transparent) => single_named(callee).and_then(|c| self.member_object(c)),
            _ => None,
        }
    }

    // === Assignments and operators ===

    fn assign(&mut self, syntax: &SyntaxNode, role: Role, declares: bool) -> Result<IsgNode, AdapterError> {
        let target_syntax = syntax.field_any(TARGET);
        let value_syntax = syntax.field_any(VALUE);
        let target = target_syntax.map(|t| self.describe(t)).unwrap_or_default();

        // `const f = (n) => ...` / `f = lambda n: ...` define a named function
        if let Some(value) = value_syntax {
            let simple = !target.is_empty() && target.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$');
            if simple && self.construct(value) == Some(Construct::Closure) {
                return self.function(value, role, target, Vec::new(), syntax.span);
            }
        }

        let op = syntax
            .field_any(OPERATOR)
            .map(|o| AssignOp::from_operator(o.leaf_text()))
            .or_else(|| {
                syntax
                    .children
                    .iter()
                    .filter(|c| !c.named)
                    .map(|c| c.leaf_text())
                    .find(|t| t.ends_with('='))
                    .map(AssignOp::from_operator)
            })
            .unwrap_or(AssignOp::Set);

        let id = self.alloc();
        let mut children = Vec::new();
        if let Some(value) = value_syntax {
            children.push(self.node(value, Role::Value)?);
        }
        let from_literal = op == AssignOp::Set && children.first().and_then(integer_literal).is_some();
        if from_literal {
            self.counters.insert(target.clone());
        } else {
            self.counters.remove(&target);
        }
        Ok(IsgNode {
            id,
            kind: NodeKind::Assignment(AssignmentNode {
                target,
                op,
                declares,
            }),
            role,
            span: syntax.span,
            children,
        })
    }

    fn binary(&mut self, syntax: &SyntaxNode, role: Role) -> Result<IsgNode, AdapterError> {
        let mut operator: Vec<&str> = syntax.fields_any(OPERATOR).map(|o| o.leaf_text()).collect();
        if operator.is_empty() {
            operator = syntax
                .children
                .iter()
                .filter(|c| !c.named)
                .map(|c| c.leaf_text())
                .collect();
        }
        let operator = operator.join(" ");

        let operands: Vec<&SyntaxNode> = syntax.named_children().filter(|c| c.field.as_deref().map_or(true, |f| !OPERATOR.contains(&f))).collect();
        let left = syntax.field_any(LEFT).or_else(|| operands.first().copied());
        let right = syntax
            .field_any(RIGHT)
            .or_else(|| operands.get(1..).and_then(|rest| rest.last()).copied());

        let kind = if operator == "in" || operator == "not in" {
            NodeKind::CollectionOp(CollectionOpNode {
                op: CollectionOpKind::Membership,
                collection: right.and_then(|r| self.name_of(r)),
            })
        } else {
            NodeKind::Binary(BinaryNode { operator })
        };
        let membership = matches!(kind, NodeKind::CollectionOp(_));

        let id = self.alloc();
        let mut children = Vec::new();
        if let Some(left) = left {
            children.push(self.node(left, if membership { Role::Item } else { Role::Left })?);
        }
        if let Some(right) = right {
            children.push(self.node(right, if membership { Role::Item } else { Role::Right })?);
        }
        Ok(IsgNode {
            id,
            kind,
            role,
            span: syntax.span,
            children,
        })
    }

    fn conditional(&mut self, syntax: &SyntaxNode, role: Role) -> Result<IsgNode, AdapterError> {
        let id = self.alloc();
        let mut children = Vec::new();
        for child in syntax.named_children() {
            let field = child.field.as_deref().unwrap_or("");
            let child_role = if CONDITION.contains(&field) {
                Role::Condition
            } else if CONSEQUENCE.contains(&field) {
                Role::Body
            } else if ALTERNATIVE.contains(&field) {
                Role::Else
            } else {
                Role::Item
            };
            children.push(self.node(child, child_role)?);
        }
        Ok(IsgNode {
            id,
            kind: NodeKind::Conditional,
            role,
            span: syntax.span,
            children,
        })
    }

    // === Names ===

    /// Plain or dotted name of an expression, if it is one
    fn name_of(&self, syntax: &SyntaxNode) -> Option<String> {
        match self.construct(syntax) {
            Some(Construct::Identifier) => Some(syntax.leaf_text().to_string()),
            Some(Construct::Member) => {
                let object = syntax.field_any(MEMBER_OBJECT)?;
                let property = syntax.field_any(MEMBER_PROPERTY)?;
                Some(format!("{}.{}", self.name_of(object)?, self.name_of(property)?))
            }
            _ => single_named(syntax).and_then(|only| self.name_of(only)),
        }
    }

    /// Name if there is one, otherwise a compact rendering (`fetch()`, `a,b`)
    fn describe(&self, syntax: &SyntaxNode) -> String {
        if let Some(name) = self.name_of(syntax) {
            return name;
        }
        match self.construct(syntax) {
            Some(Construct::Call) | Some(Construct::New) => match syntax.field_any(CALLEE) {
                Some(callee) => {
                    let (name, receiver) = self.split_callee(callee);
                    match receiver {
                        Some(receiver) => format!("{}.{}()", receiver, name),
                        None => format!("{}()", name),
                    }
                }
                None => compact(&syntax.flat_text()),
            },
            _ => compact(&syntax.flat_text()),
        }
    }

    fn first_identifier(&self, syntax: &SyntaxNode) -> Option<String> {
        if self.construct(syntax) == Some(Construct::Identifier) {
            return Some(syntax.leaf_text().to_string());
        }
        syntax
            .named_children()
            .find_map(|c| self.first_identifier(c))
    }
}

fn single_named(syntax: &SyntaxNode) -> Option<&SyntaxNode> {
    let mut named = syntax.named_children();
    match (named.next(), named.next()) {
        (Some(only), None) => Some(only),
        _ => None,
    }
}

fn compact(text: &str) -> String {
    text.split_whitespace().collect()
}

fn is_true_literal(node: &IsgNode) -> bool {
    node.as_literal()
        .is_some_and(|l| l.kind == LiteralKind::Bool && l.text.eq_ignore_ascii_case("true"))
}

fn integer_literal(node: &IsgNode) -> Option<u64> {
    node.as_literal().and_then(|l| l.as_integer())
}

/// `i < 10` or `10 > i` where `i` started from an integer literal and counts up
fn counted_limit(cond: &IsgNode, counters: &HashSet<String>) -> Option<u64> {
    let NodeKind::Binary(binary) = &cond.kind else {
        return None;
    };
    let [left, right] = cond.children.as_slice() else {
        return None;
    };
    let (counter, limit) = match binary.operator.as_str() {
        "<" | "<=" => (left.as_identifier()?, right),
        ">" | ">=" => (right.as_identifier()?, left),
        _ => return None,
    };
    if !counters.contains(counter) {
        return None;
    }
    integer_literal(limit)
}

fn validate_spans(node: &SyntaxNode, parent: Option<&SyntaxNode>, depth: usize) -> Result<(), AdapterError> {
    if depth >= MAX_DEPTH {
        return Err(AdapterError::malformed(
            format!("`{}` is nested deeper than {} levels", node.kind, MAX_DEPTH),
            node.span,
        ));
    }
    if node.span.is_inverted() {
        return Err(AdapterError::malformed(
            format!("`{}` has an inverted span", node.kind),
            node.span,
        ));
    }
    if let Some(parent) = parent {
        if !parent.span.contains(&node.span) {
            return Err(AdapterError::malformed(
                format!("`{}` extends outside its parent `{}`", node.kind, parent.kind),
                node.span,
            ));
        }
    }
    for child in &node.children {
        validate_spans(child, Some(node), depth + 1)?;
    }
    Ok(())
}
