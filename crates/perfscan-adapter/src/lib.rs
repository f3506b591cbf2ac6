//! perfscan Syntax Model Adapter
//!
//! Normalizes the syntax trees produced by language services into the
//! language-agnostic ISG. Per-language knowledge lives entirely in the
//! mapping tables under [`languages`]; the translator only sees constructs.
//!
//! Trees arrive either as JSON (see [`SyntaxDump`]) or in the compact
//! S-expression form read by [`sexp::parse_sexp`].

mod error;
pub mod languages;
pub mod sexp;
mod syntax;
mod table;
mod translate;

pub use error::*;
pub use sexp::{parse_sexp, SexpError};
pub use syntax::*;
pub use table::*;

use perfscan_isg::{Isg, Language};

use translate::Translator;

/// Deepest syntax tree nesting accepted by the reader and the translator
pub const MAX_DEPTH: usize = 256;

/// The set of mapping tables available for adaptation
#[derive(Debug, Clone)]
pub struct AdapterRegistry {
    tables: Vec<&'static MappingTable>,
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl AdapterRegistry {
    /// Registry holding every table shipped with the adapter
    pub fn builtin() -> Self {
        Self::with_tables(languages::builtin())
    }

    pub fn with_tables(tables: impl IntoIterator<Item = &'static MappingTable>) -> Self {
        Self {
            tables: tables.into_iter().collect(),
        }
    }

    /// Resolve a language tag (aliases accepted) to its mapping table
    pub fn lookup(&self, tag: &str) -> Result<&'static MappingTable, AdapterError> {
        let unsupported = || AdapterError::UnsupportedLanguage { tag: tag.to_string() };
        let language = Language::from_tag(tag).ok_or_else(unsupported)?;
        self.tables
            .iter()
            .copied()
            .find(|t| t.language == language)
            .ok_or_else(unsupported)
    }

    pub fn languages(&self) -> impl Iterator<Item = Language> + '_ {
        self.tables.iter().map(|t| t.language)
    }

    /// Translate a syntax tree written in `tag` into an ISG
    pub fn adapt(&self, tag: &str, tree: &SyntaxNode) -> Result<Isg, AdapterError> {
        let table = self.lookup(tag)?;
        let root = Translator::new(table).translate(tree)?;
        Ok(Isg::new(table.language, root))
    }
}

/// Adapt a tree using the built-in tables
pub fn adapt(tag: &str, tree: &SyntaxNode) -> Result<Isg, AdapterError> {
    AdapterRegistry::builtin().adapt(tag, tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use perfscan_isg::{
        AssignOp, CollectionOpKind, LoopBound, LoopKind, NodeKind, NodeTag, Role, ScopeKind,
    };

    fn python(source: &str) -> Isg {
        let tree = parse_sexp(source).expect("valid sexp");
        adapt("python", &tree).expect("adapts")
    }

    fn first_loop(isg: &Isg) -> &perfscan_isg::LoopNode {
        isg.root
            .descendants()
            .find_map(|n| n.as_loop())
            .expect("a loop")
    }

    #[test]
    fn test_unknown_language_is_rejected() {
        let tree = parse_sexp(r#"(module)"#).unwrap();
        let err = adapt("cobol", &tree).unwrap_err();
        assert!(matches!(err, AdapterError::UnsupportedLanguage { ref tag } if tag == "cobol"));
        assert_eq!(err.code(), "E-ADAPT-001");
    }

    #[test]
    fn test_aliases_resolve() {
        let registry = AdapterRegistry::builtin();
        assert_eq!(registry.lookup("py").unwrap().language, Language::Python);
        assert_eq!(registry.lookup("ts").unwrap().language, Language::TypeScript);
        assert_eq!(registry.languages().count(), 6);
    }

    #[test]
    fn test_registry_without_table() {
        let registry = AdapterRegistry::with_tables([&languages::PYTHON]);
        assert!(registry.lookup("go").is_err());
    }

    #[test]
    fn test_function_and_params() {
        let isg = python(
            r#"(module
                (function_definition
                  name: (identifier "load")
                  parameters: (parameters (identifier "self") (identifier "ids"))
                  body: (block (pass_statement))))"#,
        );
        assert_eq!(isg.scopes.len(), 2);
        let scope = isg.scope_named("load").unwrap();
        assert_eq!(scope.kind, ScopeKind::Function);
        assert_eq!(scope.params, vec!["ids".to_string()]);
    }

    #[test]
    fn test_method_call_receiver() {
        let isg = python(
            r#"(module (expression_statement
                (call function: (attribute object: (identifier "db") attribute: (identifier "query"))
                      arguments: (argument_list (identifier "sql")))))"#,
        );
        let call = isg.root.descendants().find_map(|n| n.as_call()).unwrap();
        assert_eq!(call.callee, "query");
        assert_eq!(call.receiver.as_deref(), Some("db"));
        assert_eq!(call.arg_count, 1);

        let node = isg.root.descendants().find(|n| n.as_call().is_some()).unwrap();
        assert_eq!(node.children[0].role, Role::Receiver);
        assert_eq!(node.children[1].role, Role::Argument);
    }

    #[test]
    fn test_range_loop_is_constant() {
        let isg = python(
            r#"(module (for_statement
                left: (identifier "i")
                right: (call function: (identifier "range") arguments: (argument_list (integer "10")))
                body: (block (pass_statement))))"#,
        );
        let lp = first_loop(&isg);
        assert_eq!(lp.loop_kind, LoopKind::ForEach);
        assert_eq!(lp.binding.as_deref(), Some("i"));
        assert_eq!(lp.bound, LoopBound::Constant(10));
    }

    #[test]
    fn test_collection_loop_is_input_bounded() {
        let isg = python(
            r#"(module (for_statement
                left: (identifier "u") right: (identifier "users")
                body: (block (pass_statement))))"#,
        );
        let lp = first_loop(&isg);
        assert_eq!(lp.iterable.as_deref(), Some("users"));
        assert_eq!(lp.bound, LoopBound::Input);
    }

    #[test]
    fn test_while_true_is_unbounded() {
        let isg = python(r#"(module (while_statement condition: (true) body: (block (break_statement))))"#);
        let lp = first_loop(&isg);
        assert_eq!(lp.loop_kind, LoopKind::Infinite);
        assert_eq!(lp.bound, LoopBound::Unbounded);
    }

    #[test]
    fn test_counted_while_is_constant() {
        let isg = python(
            r#"(module
                (expression_statement (assignment left: (identifier "i") right: (integer "0")))
                (while_statement condition: (comparison_operator (integer "8") operators: ">" (identifier "i"))
                  body: (block (expression_statement
                    (augmented_assignment left: (identifier "i") operator: "+=" right: (integer "1"))))))"#,
        );
        assert_eq!(first_loop(&isg).bound, LoopBound::Constant(8));
    }

    #[test]
    fn test_countdown_while_is_input_bounded() {
        let isg = python(
            r#"(module
                (expression_statement (assignment left: (identifier "n") right: (call function: (identifier "size") arguments: (argument_list))))
                (while_statement condition: (comparison_operator (identifier "n") operators: ">" (integer "0"))
                  body: (block (expression_statement
                    (augmented_assignment left: (identifier "n") operator: "-=" right: (integer "1"))))))"#,
        );
        assert_eq!(first_loop(&isg).bound, LoopBound::Input);
    }

    #[test]
    fn test_counter_reassigned_before_loop_is_input_bounded() {
        let isg = python(
            r#"(module
                (expression_statement (assignment left: (identifier "i") right: (integer "0")))
                (expression_statement (assignment left: (identifier "i") right: (identifier "start")))
                (while_statement condition: (comparison_operator (identifier "i") operators: "<" (integer "8"))
                  body: (block (pass_statement))))"#,
        );
        assert_eq!(first_loop(&isg).bound, LoopBound::Input);
    }

    #[test]
    fn test_counter_does_not_leak_into_functions() {
        let isg = python(
            r#"(module
                (expression_statement (assignment left: (identifier "i") right: (integer "0")))
                (function_definition name: (identifier "f") parameters: (parameters (identifier "i"))
                  body: (block (while_statement
                    condition: (comparison_operator (identifier "i") operators: "<" (integer "8"))
                    body: (block (pass_statement))))))"#,
        );
        assert_eq!(first_loop(&isg).bound, LoopBound::Input);
    }

    #[test]
    fn test_nesting_past_limit_is_malformed() {
        let span = perfscan_isg::Span::new(0, 10, 1, 1);
        let mut tree = SyntaxNode {
            kind: "identifier".into(),
            named: true,
            field: None,
            text: Some("x".into()),
            span,
            children: Vec::new(),
        };
        for _ in 0..MAX_DEPTH {
            tree = SyntaxNode {
                kind: "parenthesized_expression".into(),
                named: true,
                field: None,
                text: None,
                span,
                children: vec![tree],
            };
        }
        let err = adapt("python", &tree).unwrap_err();
        assert_eq!(err.code(), "E-ADAPT-002");
        assert!(err.to_string().contains("nested deeper than 256 levels"));
    }

    #[test]
    fn test_loop_without_body_is_malformed() {
        let tree = parse_sexp(r#"(module (for_statement left: (identifier "x") right: (identifier "xs")))"#).unwrap();
        let err = adapt("python", &tree).unwrap_err();
        assert_eq!(err.code(), "E-ADAPT-002");
        assert!(err.span().is_some());
    }

    #[test]
    fn test_call_without_callee_is_malformed() {
        let tree = parse_sexp(r#"(module (call arguments: (argument_list)))"#).unwrap();
        assert!(matches!(
            adapt("python", &tree),
            Err(AdapterError::MalformedTree { .. })
        ));
    }

    #[test]
    fn test_escaping_span_is_malformed() {
        let mut tree = parse_sexp(r#"(module (identifier "x"))"#).unwrap();
        tree.children[0].span.end = tree.span.end + 10;
        assert!(matches!(
            adapt("python", &tree),
            Err(AdapterError::MalformedTree { .. })
        ));
    }

    #[test]
    fn test_augmented_assignment_and_membership() {
        let isg = python(
            r#"(module
                (expression_statement (augmented_assignment left: (identifier "s") operator: "+=" right: (identifier "x")))
                (expression_statement (comparison_operator (identifier "x") operators: "in" (identifier "seen"))))"#,
        );
        let assign = isg.root.descendants().find_map(|n| n.as_assignment()).unwrap();
        assert_eq!(assign.target, "s");
        assert_eq!(assign.op, AssignOp::Add);

        let membership = isg
            .root
            .descendants()
            .find_map(|n| match &n.kind {
                NodeKind::CollectionOp(op) => Some(op),
                _ => None,
            })
            .unwrap();
        assert_eq!(membership.op, CollectionOpKind::Membership);
        assert_eq!(membership.collection.as_deref(), Some("seen"));
    }

    #[test]
    fn test_comprehension_becomes_loop() {
        let isg = python(
            r#"(module (expression_statement (list_comprehension
                body: (identifier "x")
                (for_in_clause left: (identifier "x") right: (identifier "xs")))))"#,
        );
        let lp = isg.root.descendants().find(|n| n.tag() == NodeTag::Loop).unwrap();
        assert_eq!(lp.as_loop().unwrap().iterable.as_deref(), Some("xs"));
        assert_eq!(lp.children[0].role, Role::Iterable);
        assert_eq!(lp.children[1].role, Role::Body);
    }

    #[test]
    fn test_ids_are_dense_preorder() {
        let isg = python(
            r#"(module (function_definition name: (identifier "f") parameters: (parameters)
                body: (block (expression_statement (call function: (identifier "g") arguments: (argument_list))))))"#,
        );
        let ids: Vec<u32> = isg.root.descendants().map(|n| n.id.0).collect();
        let expected: Vec<u32> = (0..ids.len() as u32).collect();
        assert_eq!(ids, expected);
    }
}
