//! Aggregation of real rule and complexity output

use perfscan_adapter::{adapt, parse_sexp};
use perfscan_complexity::{estimate, ComplexityClass};
use perfscan_findings::{AggregateSettings, Aggregator, AnalysisHints, Finding};
use perfscan_isg::Budget;
use perfscan_rules::{evaluate, Category, RuleRegistry, RuleSettings, Severity};

/// Run rules and complexity over `source`, then aggregate with `hints`
fn findings_for(lang: &str, source: &str, hints: &AnalysisHints) -> Vec<Finding> {
    let tree = parse_sexp(source).expect("parse failed");
    let isg = adapt(lang, &tree).expect("adapt failed");
    let index = isg.index();
    let registry = RuleRegistry::builtin();
    let evaluation = evaluate(registry, &index, &RuleSettings::default(), Budget::unlimited());
    let estimation = estimate(&index, Budget::unlimited());
    let settings = AggregateSettings::default();
    Aggregator::new(registry, &index, hints, &settings).aggregate(&evaluation.matches, &estimation)
}

fn ids(findings: &[Finding]) -> Vec<&'static str> {
    findings.iter().map(|f| f.id).collect()
}

const N_PLUS_ONE: &str = r#"
(module
  (function_definition name: (identifier "report") parameters: (parameters)
    body: (block
      (expression_statement (assignment
        left: (identifier "users")
        right: (call function: (attribute object: (identifier "db") attribute: (identifier "query"))
                     arguments: (argument_list (string "select")))))
      (for_statement left: (identifier "u") right: (identifier "users")
        body: (block (expression_statement
          (call function: (attribute object: (identifier "db") attribute: (identifier "get"))
                arguments: (argument_list (attribute object: (identifier "u") attribute: (identifier "id"))))))))))
"#;

const NESTED_CONCAT: &str = r#"
(module
  (expression_statement (assignment left: (identifier "out") right: (string "")))
  (for_statement left: (identifier "x") right: (identifier "xs")
    body: (block (for_statement left: (identifier "y") right: (identifier "ys")
      body: (block (expression_statement
        (augmented_assignment left: (identifier "out") operator: "+=" right: (identifier "y"))))))))
"#;

const FIB: &str = r#"
(module (function_definition name: (identifier "fib") parameters: (parameters (identifier "n"))
  body: (block
    (if_statement condition: (comparison_operator (identifier "n") operators: "<" (integer "2"))
      consequence: (block (return_statement (identifier "n"))))
    (return_statement (binary_operator
      left: (call function: (identifier "fib") arguments: (argument_list
        (binary_operator left: (identifier "n") operator: "-" right: (integer "1"))))
      operator: "+"
      right: (call function: (identifier "fib") arguments: (argument_list
        (binary_operator left: (identifier "n") operator: "-" right: (integer "2")))))))))
"#;

const MERGE_SORT: &str = r#"
(module (function_definition name: (identifier "sort") parameters: (parameters (identifier "xs"))
  body: (block
    (expression_statement (assignment left: (identifier "mid")
      right: (binary_operator
        left: (call function: (identifier "len") arguments: (argument_list (identifier "xs")))
        operator: "//" right: (integer "2"))))
    (expression_statement (assignment left: (identifier "left")
      right: (call function: (identifier "sort") arguments: (argument_list
        (subscript value: (identifier "xs") subscript: (slice (identifier "mid")))))))
    (expression_statement (assignment left: (identifier "right")
      right: (call function: (identifier "sort") arguments: (argument_list
        (subscript value: (identifier "xs") subscript: (slice (identifier "mid")))))))
    (for_statement left: (identifier "x") right: (identifier "left") body: (block (pass_statement)))
    (return_statement (identifier "left")))))
"#;

const GROWTH: &str = r#"
(module
  (function_definition name: (identifier "__init__") parameters: (parameters (identifier "self"))
    body: (block (expression_statement (assignment
      left: (attribute object: (identifier "self") attribute: (identifier "history"))
      right: (list)))))
  (function_definition name: (identifier "record") parameters: (parameters (identifier "self") (identifier "event"))
    body: (block
      (expression_statement (call
        function: (attribute object: (attribute object: (identifier "self") attribute: (identifier "history")) attribute: (identifier "append"))
        arguments: (argument_list (identifier "event")))))))
"#;

#[test]
fn n_plus_one_collapses_query_in_loop() {
    let findings = findings_for("python", N_PLUS_ONE, &AnalysisHints::default());
    assert_eq!(ids(&findings), vec!["n-plus-one-query"]);

    let finding = &findings[0];
    assert_eq!(finding.title, "N+1 query pattern");
    assert_eq!(finding.severity, Severity::Critical);
    assert_eq!(finding.related.len(), 1);
    assert_eq!(finding.related[0].rule_id, "query-in-loop");
    assert!(finding.message.contains("`db.get`"));
    assert!(finding.message.contains("for each `u` in `users`"));

    let note = finding.complexity.as_ref().expect("scope is linear");
    assert_eq!(note.class, ComplexityClass::Linear);
    assert!(note.to_string().starts_with("O(n): loop at"));
}

#[test]
fn nested_concat_is_escalated_and_ranked_after_quadratic_scope() {
    let findings = findings_for("python", NESTED_CONCAT, &AnalysisHints::default());
    assert_eq!(ids(&findings), vec!["quadratic-complexity", "string-concat-in-loop"]);

    let scope = &findings[0];
    assert_eq!(scope.severity, Severity::High);
    assert_eq!(scope.category, Category::Complexity);
    assert!(scope.message.starts_with("module-level code is O(n²)"));
    assert_eq!(scope.captures.text("loop_var"), Some("y"));
    assert_eq!(scope.captures.text("iterable"), Some("ys"));

    let concat = &findings[1];
    assert_eq!(concat.severity, Severity::High);
    assert!(scope.span.contains(&concat.span));
    assert_eq!(
        concat.complexity.as_ref().map(|n| n.class),
        Some(ComplexityClass::Quadratic)
    );
}

#[test]
fn branching_recursion_is_critical() {
    let findings = findings_for("python", FIB, &AnalysisHints::default());
    assert_eq!(ids(&findings), vec!["exponential-complexity"]);
    let finding = &findings[0];
    assert_eq!(finding.severity, Severity::Critical);
    assert_eq!(finding.template, "memoize-recursion");
    assert_eq!(finding.captures.text("callee"), Some("fib"));
    assert_eq!(finding.captures.text("scope"), Some("fib"));
    assert!(finding.message.starts_with("`fib` is O(2^n)"));
}

#[test]
fn linearithmic_scope_needs_a_large_input_hint() {
    let complexity = |hints: &AnalysisHints| -> Vec<&'static str> {
        findings_for("python", MERGE_SORT, hints)
            .into_iter()
            .filter(|f| f.category == Category::Complexity)
            .map(|f| f.id)
            .collect()
    };
    assert!(complexity(&AnalysisHints::default()).is_empty());
    assert_eq!(
        complexity(&AnalysisHints::new().with_large_collection("xs")),
        vec!["linearithmic-complexity"]
    );
}

#[test]
fn hot_scope_hint_raises_memory_findings() {
    let plain = findings_for("python", GROWTH, &AnalysisHints::default());
    assert_eq!(ids(&plain), vec!["unbounded-growth"]);
    assert_eq!(plain[0].severity, Severity::Medium);
    assert!(plain[0].complexity.is_none());

    let hinted = findings_for("python", GROWTH, &AnalysisHints::new().with_hot_scope("record"));
    assert_eq!(hinted[0].severity, Severity::High);

    // hints only adjust severity, they never add findings
    let unrelated = findings_for("python", GROWTH, &AnalysisHints::new().with_hot_scope("__init__"));
    assert_eq!(unrelated.len(), 1);
    assert_eq!(unrelated[0].severity, Severity::Medium);
}

#[test]
fn aggregation_is_deterministic() {
    let hints = AnalysisHints::new().with_large_collection("users");
    let first = findings_for("python", N_PLUS_ONE, &hints);
    let second = findings_for("python", N_PLUS_ONE, &hints);
    assert_eq!(first, second);
}
