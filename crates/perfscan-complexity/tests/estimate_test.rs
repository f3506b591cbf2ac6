//! Complexity classes inferred from adapted syntax trees

use perfscan_adapter::{adapt, parse_sexp};
use perfscan_complexity::{estimate, ComplexityClass, ContributorKind, RecursionShape, ScopeComplexity};
use perfscan_isg::Budget;

/// Adapt `source` and return the result for the scope called `name`
fn complexity_of(lang: &str, source: &str, name: &str) -> ScopeComplexity {
    let tree = parse_sexp(source).expect("parse failed");
    let isg = adapt(lang, &tree).expect("adapt failed");
    let scope = isg.scope_named(name).expect("no such scope").id;
    let result = estimate(&isg.index(), Budget::unlimited());
    assert!(result.complete);
    result.for_scope(scope).cloned().expect("scope not estimated")
}

fn python_function(name: &str, params: &[&str], body: &str) -> String {
    let params: Vec<String> = params.iter().map(|p| format!(r#"(identifier "{}")"#, p)).collect();
    format!(
        r#"(module (function_definition name: (identifier "{}") parameters: (parameters {}) body: (block {})))"#,
        name,
        params.join(" "),
        body
    )
}

fn for_each(var: &str, iterable: &str, body: &str) -> String {
    format!(
        r#"(for_statement left: (identifier "{}") right: (identifier "{}") body: (block {}))"#,
        var, iterable, body
    )
}

fn call(callee: &str, args: &str) -> String {
    format!(
        r#"(call function: (identifier "{}") arguments: (argument_list {}))"#,
        callee, args
    )
}

const PASS: &str = "(pass_statement)";

#[test]
fn sequential_loops_stay_linear() {
    let body = format!("{} {}", for_each("x", "xs", PASS), for_each("y", "xs", PASS));
    let result = complexity_of("python", &python_function("f", &["xs"], &body), "f");
    assert_eq!(result.class, ComplexityClass::Linear);
    assert_eq!(result.contributors.len(), 1);
}

#[test]
fn nested_loops_multiply() {
    let body = for_each("x", "xs", &for_each("y", "ys", PASS));
    let result = complexity_of("python", &python_function("f", &["xs", "ys"], &body), "f");
    assert_eq!(result.class, ComplexityClass::Quadratic);
    assert!(result.reason.starts_with("2 nested loops"));
    assert!(result.contributors.iter().all(|c| c.kind == ContributorKind::Loop));
}

#[test]
fn triple_nested_loops_are_cubic() {
    let body = for_each("a", "xs", &for_each("b", "ys", &for_each("c", "zs", PASS)));
    let result = complexity_of("python", &python_function("f", &["xs", "ys", "zs"], &body), "f");
    assert_eq!(result.class, ComplexityClass::Polynomial(3));
    assert_eq!(result.class.to_string(), "O(n³)");
    assert_eq!(result.contributors.len(), 3);
}

#[test]
fn literal_range_is_constant() {
    let range = format!(
        r#"(for_statement left: (identifier "i") right: {} body: (block {}))"#,
        call("range", r#"(integer "10")"#),
        PASS
    );
    let body = for_each("x", "xs", &range);
    let result = complexity_of("python", &python_function("f", &["xs"], &body), "f");
    assert_eq!(result.class, ComplexityClass::Linear);
}

#[test]
fn binary_search_is_logarithmic() {
    let body = r#"
        (expression_statement (assignment left: (identifier "lo") right: (integer "0")))
        (expression_statement (assignment left: (identifier "hi")
            right: (call function: (identifier "len") arguments: (argument_list (identifier "xs")))))
        (while_statement condition: (comparison_operator (identifier "lo") operators: "<" (identifier "hi"))
          body: (block
            (expression_statement (assignment left: (identifier "mid")
              right: (binary_operator
                left: (parenthesized_expression (binary_operator left: (identifier "lo") operator: "+" right: (identifier "hi")))
                operator: "//" right: (integer "2"))))
            (if_statement
              condition: (comparison_operator (subscript value: (identifier "xs") subscript: (identifier "mid")) operators: "<" (identifier "target"))
              consequence: (block (expression_statement (assignment left: (identifier "lo")
                right: (binary_operator left: (identifier "mid") operator: "+" right: (integer "1")))))
              alternative: (else_clause body: (block (expression_statement (assignment left: (identifier "hi") right: (identifier "mid"))))))))
        (return_statement (identifier "lo"))"#;
    let result = complexity_of("python", &python_function("search", &["xs", "target"], body), "search");
    assert_eq!(result.class, ComplexityClass::Logarithmic);
}

#[test]
fn doubling_for_loop_is_logarithmic() {
    let source = r#"
(program (function_declaration name: (identifier "powers") parameters: (formal_parameters (identifier "n"))
  body: (statement_block
    (for_statement
      initializer: (lexical_declaration (variable_declarator name: (identifier "i") value: (number "1")))
      condition: (expression_statement (binary_expression left: (identifier "i") operator: "<" right: (identifier "n")))
      increment: (augmented_assignment_expression left: (identifier "i") operator: "*=" right: (number "2"))
      body: (statement_block)))))
"#;
    let result = complexity_of("javascript", source, "powers");
    assert_eq!(result.class, ComplexityClass::Logarithmic);
}

#[test]
fn countdown_while_loop_is_linear() {
    let body = r#"
        (while_statement condition: (comparison_operator (identifier "n") operators: ">" (integer "0"))
          body: (block (expression_statement
            (augmented_assignment left: (identifier "n") operator: "-=" right: (integer "1")))))"#;
    let result = complexity_of("python", &python_function("drain", &["n"], body), "drain");
    assert_eq!(result.class, ComplexityClass::Linear);
}

#[test]
fn counter_from_literal_to_literal_is_constant() {
    let body = r#"
        (expression_statement (assignment left: (identifier "i") right: (integer "0")))
        (while_statement condition: (comparison_operator (identifier "i") operators: "<" (integer "10"))
          body: (block (expression_statement
            (augmented_assignment left: (identifier "i") operator: "+=" right: (integer "1")))))"#;
    let result = complexity_of("python", &python_function("tick", &[], body), "tick");
    assert_eq!(result.class, ComplexityClass::Constant);
}

#[test]
fn counter_seeded_from_input_scales() {
    let body = r#"
        (while_statement condition: (comparison_operator (identifier "i") operators: "<" (integer "10"))
          body: (block (expression_statement
            (augmented_assignment left: (identifier "i") operator: "+=" right: (integer "1")))))"#;
    let result = complexity_of("python", &python_function("tick", &["i"], body), "tick");
    assert_eq!(result.class, ComplexityClass::Linear);
}

const FIB_CALLS: &str = r#"
    (return_statement (binary_operator
      left: (call function: (identifier "fib") arguments: (argument_list
        (binary_operator left: (identifier "n") operator: "-" right: (integer "1"))))
      operator: "+"
      right: (call function: (identifier "fib") arguments: (argument_list
        (binary_operator left: (identifier "n") operator: "-" right: (integer "2"))))))"#;

const BASE_CASE: &str = r#"
    (if_statement condition: (comparison_operator (identifier "n") operators: "<" (integer "2"))
      consequence: (block (return_statement (identifier "n"))))"#;

#[test]
fn branching_recursion_is_exponential() {
    let body = format!("{} {}", BASE_CASE, FIB_CALLS);
    let result = complexity_of("python", &python_function("fib", &["n"], &body), "fib");
    assert_eq!(result.class, ComplexityClass::Exponential);
    assert_eq!(result.recursion, Some(RecursionShape::Branching));
    let sites = result
        .contributors
        .iter()
        .filter(|c| c.kind == ContributorKind::Recursion)
        .count();
    assert_eq!(sites, 2);
}

#[test]
fn cache_guard_makes_recursion_linear() {
    let guard = r#"
    (if_statement condition: (comparison_operator (identifier "n") operators: "in" (identifier "memo"))
      consequence: (block (return_statement (subscript value: (identifier "memo") subscript: (identifier "n")))))"#;
    let body = format!("{} {} {}", guard, BASE_CASE, FIB_CALLS);
    let result = complexity_of("python", &python_function("fib", &["n", "memo"], &body), "fib");
    assert_eq!(result.class, ComplexityClass::Linear);
    assert_eq!(result.recursion, Some(RecursionShape::Memoized));
}

#[test]
fn cache_decorator_makes_recursion_linear() {
    let body = format!("{} {}", BASE_CASE, FIB_CALLS);
    let source = format!(
        r#"(module (decorated_definition (decorator (identifier "lru_cache"))
            definition: (function_definition name: (identifier "fib") parameters: (parameters (identifier "n"))
              body: (block {}))))"#,
        body
    );
    let result = complexity_of("python", &source, "fib");
    assert_eq!(result.class, ComplexityClass::Linear);
}

#[test]
fn literal_tuple_guard_is_not_memoization() {
    let guard = r#"
    (if_statement condition: (comparison_operator (identifier "n") operators: "in"
        (tuple (integer "0") (integer "1")))
      consequence: (block (return_statement (identifier "n"))))"#;
    let body = format!("{} {}", guard, FIB_CALLS);
    let result = complexity_of("python", &python_function("fib", &["n"], &body), "fib");
    assert_eq!(result.class, ComplexityClass::Exponential);
    assert_eq!(result.recursion, Some(RecursionShape::Branching));
}

#[test]
fn guard_after_the_recursive_calls_is_not_memoization() {
    let late_guard = r#"
    (if_statement condition: (comparison_operator (identifier "n") operators: "in" (identifier "memo"))
      consequence: (block (pass_statement)))"#;
    let body = format!("{} {} {}", BASE_CASE, FIB_CALLS, late_guard);
    let result = complexity_of("python", &python_function("fib", &["n", "memo"], &body), "fib");
    assert_eq!(result.class, ComplexityClass::Exponential);
}

#[test]
fn single_decrementing_call_is_linear() {
    let body = format!(
        "{} (return_statement (binary_operator left: (identifier \"n\") operator: \"*\" right: {}))",
        BASE_CASE,
        call("fact", r#"(binary_operator left: (identifier "n") operator: "-" right: (integer "1"))"#)
    );
    let result = complexity_of("python", &python_function("fact", &["n"], &body), "fact");
    assert_eq!(result.class, ComplexityClass::Linear);
    assert_eq!(result.recursion, Some(RecursionShape::Linear));
}

#[test]
fn exclusive_branches_count_as_one_call() {
    let body = r#"
        (if_statement condition: (identifier "small")
          consequence: (block (return_statement
            (call function: (identifier "find") arguments: (argument_list
              (binary_operator left: (identifier "n") operator: "//" right: (integer "2"))))))
          alternative: (else_clause body: (block (return_statement
            (call function: (identifier "find") arguments: (argument_list
              (binary_operator left: (identifier "n") operator: "//" right: (integer "2"))))))))"#;
    let result = complexity_of("python", &python_function("find", &["n", "small"], body), "find");
    assert_eq!(result.recursion, Some(RecursionShape::Halving));
    assert_eq!(result.class, ComplexityClass::Logarithmic);
}

#[test]
fn merge_sort_is_linearithmic() {
    let body = format!(
        r#"
        (expression_statement (assignment left: (identifier "mid")
          right: (binary_operator left: {} operator: "//" right: (integer "2"))))
        (expression_statement (assignment left: (identifier "left")
          right: {}))
        (expression_statement (assignment left: (identifier "right")
          right: {}))
        (expression_statement (assignment left: (identifier "out") right: (list)))
        {}
        (return_statement (identifier "out"))"#,
        call("len", r#"(identifier "xs")"#),
        call("sort", r#"(subscript value: (identifier "xs") subscript: (slice (identifier "mid")))"#),
        call("sort", r#"(subscript value: (identifier "xs") subscript: (slice (identifier "mid")))"#),
        for_each("x", "left", PASS),
    );
    let result = complexity_of("python", &python_function("sort", &["xs"], &body), "sort");
    assert_eq!(result.recursion, Some(RecursionShape::DivideAndConquer));
    assert_eq!(result.class, ComplexityClass::Linearithmic);
}

#[test]
fn member_recursion_is_traversal() {
    let body = format!(
        r#"(return_statement (binary_operator left: (integer "1") operator: "+" right: {}))"#,
        call(
            "max",
            &format!(
                "{} {}",
                call("depth", r#"(attribute object: (identifier "node") attribute: (identifier "left"))"#),
                call("depth", r#"(attribute object: (identifier "node") attribute: (identifier "right"))"#)
            )
        )
    );
    let result = complexity_of("python", &python_function("depth", &["node"], &body), "depth");
    assert_eq!(result.recursion, Some(RecursionShape::Traversal));
    assert_eq!(result.class, ComplexityClass::Linear);
}

#[test]
fn loop_over_children_with_recursion_is_traversal() {
    let body = r#"
        (for_statement left: (identifier "child")
          right: (attribute object: (identifier "node") attribute: (identifier "children"))
          body: (block (expression_statement
            (call function: (identifier "walk") arguments: (argument_list (identifier "child"))))))"#;
    let result = complexity_of("python", &python_function("walk", &["node"], body), "walk");
    assert_eq!(result.class, ComplexityClass::Linear);
}

#[test]
fn recursion_inside_plain_loop_is_indeterminate() {
    let body = for_each("x", "xs", &format!("(expression_statement {})", call("permute", r#"(identifier "rest")"#)));
    let result = complexity_of("python", &python_function("permute", &["xs", "rest"], &body), "permute");
    assert_eq!(result.class, ComplexityClass::Indeterminate);
    assert_eq!(result.recursion, Some(RecursionShape::InLoop));
}

#[test]
fn opaque_while_condition_is_indeterminate() {
    let body = r#"
        (while_statement
          condition: (not_operator argument: (call function: (identifier "done") arguments: (argument_list)))
          body: (block (pass_statement)))"#;
    let result = complexity_of("python", &python_function("poll", &[], body), "poll");
    assert_eq!(result.class, ComplexityClass::Indeterminate);
    assert!(result.reason.contains("`done`"));
}

#[test]
fn iterator_protocol_condition_is_linear() {
    let source = r#"
(program (method_declaration name: (identifier "drain") parameters: (formal_parameters)
  body: (block
    (while_statement
      condition: (parenthesized_expression
        (method_invocation object: (identifier "it") name: (identifier "hasNext") arguments: (argument_list)))
      body: (block (expression_statement
        (method_invocation object: (identifier "it") name: (identifier "next") arguments: (argument_list))))))))
"#;
    let result = complexity_of("java", source, "drain");
    assert_eq!(result.class, ComplexityClass::Linear);
}

#[test]
fn loops_in_nested_functions_do_not_leak() {
    let inner = r#"(function_definition name: (identifier "inner") parameters: (parameters (identifier "ys"))
        body: (block (for_statement left: (identifier "y") right: (identifier "ys") body: (block (pass_statement)))))"#;
    let body = for_each("x", "xs", inner);
    let source = python_function("outer", &["xs"], &body);
    assert_eq!(complexity_of("python", &source, "outer").class, ComplexityClass::Linear);
    assert_eq!(complexity_of("python", &source, "inner").class, ComplexityClass::Linear);
}
