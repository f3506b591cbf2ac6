//! Translation of per-language syntax trees into the ISG

use perfscan_adapter::{adapt, parse_sexp, AdapterError, SyntaxDump};
use perfscan_isg::{Isg, Language, LoopBound, LoopKind, LoopNode, NodeKind, NodeTag, Role};

fn adapt_sexp(tag: &str, source: &str) -> Isg {
    let tree = parse_sexp(source).expect("parse failed");
    adapt(tag, &tree).expect("adapt failed")
}

fn loops(isg: &Isg) -> Vec<&LoopNode> {
    isg.root.descendants().filter_map(|n| n.as_loop()).collect()
}

#[test]
fn javascript_arrow_const_is_a_named_function() {
    let isg = adapt_sexp(
        "javascript",
        r#"(program (lexical_declaration (variable_declarator
             name: (identifier "total")
             value: (arrow_function
               parameters: (formal_parameters (identifier "items"))
               body: (statement_block (return_statement (identifier "items")))))))"#,
    );
    let scope = isg.scope_named("total").expect("function scope");
    assert_eq!(scope.params, vec!["items".to_string()]);
    assert_eq!(isg.language, Language::JavaScript);
}

#[test]
fn javascript_for_of_with_await() {
    let isg = adapt_sexp(
        "js",
        r#"(program (for_in_statement
             left: (identifier "id")
             right: (identifier "ids")
             body: (statement_block (expression_statement
               (await_expression (call_expression
                 function: (identifier "fetchUser")
                 arguments: (arguments (identifier "id"))))))))"#,
    );
    let lp = loops(&isg)[0];
    assert_eq!(lp.loop_kind, LoopKind::ForEach);
    assert_eq!(lp.binding.as_deref(), Some("id"));
    assert!(isg.root.descendants().any(|n| n.tag() == NodeTag::Await));
}

#[test]
fn rust_literal_range_is_constant() {
    let isg = adapt_sexp(
        "rust",
        r#"(source_file (function_item name: (identifier "main") parameters: (parameters)
             body: (block (expression_statement (for_expression
               pattern: (identifier "i")
               value: (range_expression (integer_literal "0") ".." (integer_literal "16"))
               body: (block (expression_statement (macro_invocation macro: (identifier "format") (token_tree)))))))))"#,
    );
    let lp = loops(&isg)[0];
    assert_eq!(lp.bound, LoopBound::Constant(16));

    let call = isg.root.descendants().find_map(|n| n.as_call()).unwrap();
    assert_eq!(call.callee, "format!");
}

#[test]
fn rust_full_width_inclusive_range_saturates() {
    let isg = adapt_sexp(
        "rust",
        r#"(source_file (expression_statement (for_expression
             pattern: (identifier "i")
             value: (range_expression (integer_literal "0") "..=" (integer_literal "18446744073709551615"))
             body: (block))))"#,
    );
    assert_eq!(loops(&isg)[0].bound, LoopBound::Constant(u64::MAX));
}

#[test]
fn rust_loop_expression_is_unbounded() {
    let isg = adapt_sexp(
        "rs",
        r#"(source_file (expression_statement (loop_expression body: (block))))"#,
    );
    assert_eq!(loops(&isg)[0].bound, LoopBound::Unbounded);
}

#[test]
fn go_range_clause_and_c_style_clause() {
    let isg = adapt_sexp(
        "go",
        r#"(source_file (function_declaration name: (identifier "run") parameters: (parameter_list)
             body: (block
               (for_statement
                 (range_clause left: (expression_list (identifier "_") (identifier "u")) right: (identifier "users"))
                 body: (block))
               (for_statement
                 (for_clause
                   initializer: (short_var_declaration left: (expression_list (identifier "i")) right: (expression_list (int_literal "0")))
                   condition: (binary_expression left: (identifier "i") operator: "<" right: (int_literal "8"))
                   update: (inc_statement (identifier "i")))
                 body: (block))
               (for_statement body: (block)))))"#,
    );
    let found = loops(&isg);
    assert_eq!(found.len(), 3);
    assert_eq!(found[0].loop_kind, LoopKind::ForEach);
    assert_eq!(found[0].iterable.as_deref(), Some("users"));
    assert_eq!(found[0].bound, LoopBound::Input);
    assert_eq!(found[1].loop_kind, LoopKind::For);
    assert_eq!(found[1].bound, LoopBound::Constant(8));
    assert_eq!(found[2].bound, LoopBound::Unbounded);
}

#[test]
fn java_method_invocation_receiver() {
    let isg = adapt_sexp(
        "java",
        r#"(program (method_declaration name: (identifier "load") parameters: (formal_parameters)
             body: (block (expression_statement (method_invocation
               object: (identifier "repo")
               name: (identifier "findById")
               arguments: (argument_list (identifier "id")))))))"#,
    );
    let node = isg
        .root
        .descendants()
        .find(|n| n.as_call().is_some())
        .unwrap();
    let call = node.as_call().unwrap();
    assert_eq!(call.callee, "findById");
    assert_eq!(call.receiver.as_deref(), Some("repo"));
    assert_eq!(node.children[0].role, Role::Receiver);
}

#[test]
fn java_interface_method_without_body_is_kept() {
    let isg = adapt_sexp(
        "java",
        r#"(program (method_declaration name: (identifier "size") parameters: (formal_parameters)))"#,
    );
    assert!(isg.scope_named("size").is_some());
}

#[test]
fn unmapped_kinds_are_preserved_as_other() {
    let isg = adapt_sexp("python", r#"(module (pass_statement))"#);
    assert!(matches!(&isg.root.children[0].kind, NodeKind::Other(k) if k == "pass_statement"));
}

#[test]
fn json_dump_round_trips_through_serde() {
    let json = r#"{
        "language": "python",
        "tree": {
            "kind": "module",
            "span": {"start": 0, "end": 20, "start_line": 1, "end_line": 2},
            "children": [
                {"kind": "identifier", "text": "x",
                 "span": {"start": 0, "end": 1, "start_line": 1, "end_line": 1}}
            ]
        }
    }"#;
    let dump: SyntaxDump = serde_json::from_str(json).expect("valid dump");
    let isg = adapt(dump.language.as_deref().unwrap(), &dump.tree).expect("adapts");
    assert_eq!(isg.root.children[0].as_identifier(), Some("x"));
}

#[test]
fn unnamed_root_is_malformed() {
    let mut tree = parse_sexp(r#"(module)"#).unwrap();
    tree.named = false;
    let err = adapt("python", &tree).unwrap_err();
    assert!(matches!(err, AdapterError::MalformedTree { .. }));
}
