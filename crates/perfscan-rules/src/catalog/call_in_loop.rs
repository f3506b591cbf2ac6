//! Table of "costly operation repeated per iteration" rules
//!
//! These rules share one shape: the node must run once per iteration of an
//! enclosing loop of its own scope, and a vocabulary check must recognize the
//! operation. Each entry pairs its metadata with that check.

use perfscan_isg::{
    CollectionOpKind, CollectionShape, IsgNode, Language, LiteralKind, NodeKind, NodeTag, Role,
};

use super::{call_subject, is_dom_query, is_query_call};
use crate::{Captures, Category, Rule, RuleContext, RuleFault, RuleMeta, Severity};

type Matcher = fn(&IsgNode, &RuleContext<'_>) -> Result<Option<Captures>, RuleFault>;

/// A rule that fires on a recognized operation inside a loop
pub struct CallInLoop {
    meta: RuleMeta,
    matcher: Matcher,
}

impl Rule for CallInLoop {
    fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    fn check(&self, node: &IsgNode, cx: &RuleContext<'_>) -> Result<Option<Captures>, RuleFault> {
        if cx.loops_around(node).is_empty() {
            return Ok(None);
        }
        (self.matcher)(node, cx)
    }
}

const CALL: &[NodeTag] = &[NodeTag::Call];

pub(super) fn table() -> Vec<CallInLoop> {
    vec![
        CallInLoop {
            meta: RuleMeta {
                id: "query-in-loop",
                title: "query inside loop",
                category: Category::Query,
                severity: Severity::High,
                targets: CALL,
                languages: &[],
                template: "batch-query",
                summary: "issues a database or service request on every iteration",
            },
            matcher: query_in_loop,
        },
        CallInLoop {
            meta: RuleMeta {
                id: "sync-io-in-loop",
                title: "blocking I/O inside loop",
                category: Category::Io,
                severity: Severity::High,
                targets: CALL,
                languages: &[],
                template: "hoist-io",
                summary: "performs blocking file or system I/O on every iteration",
            },
            matcher: sync_io_in_loop,
        },
        CallInLoop {
            meta: RuleMeta {
                id: "collection-mutation-in-loop",
                title: "costly collection mutation in loop",
                category: Category::Collection,
                severity: Severity::Medium,
                targets: CALL,
                languages: &[],
                template: "front-mutation",
                summary: "shifts every element of the collection on each iteration",
            },
            matcher: collection_mutation_in_loop,
        },
        CallInLoop {
            meta: RuleMeta {
                id: "collection-copy-in-loop",
                title: "collection construction in loop",
                category: Category::Collection,
                severity: Severity::Medium,
                targets: &[NodeTag::Call, NodeTag::Allocation],
                languages: &[],
                template: "accumulate-in-place",
                summary: "copies a whole collection on every iteration",
            },
            matcher: collection_copy_in_loop,
        },
        CallInLoop {
            meta: RuleMeta {
                id: "linear-search-in-loop",
                title: "linear search inside loop",
                category: Category::Search,
                severity: Severity::Medium,
                targets: &[NodeTag::Call, NodeTag::CollectionOp],
                languages: &[],
                template: "index-lookup",
                summary: "scans a list on every iteration",
            },
            matcher: linear_search_in_loop,
        },
        CallInLoop {
            meta: RuleMeta {
                id: "regex-compile-in-loop",
                title: "regex construction in loop",
                category: Category::Regex,
                severity: Severity::Medium,
                targets: CALL,
                languages: &[],
                template: "precompile-regex",
                summary: "compiles a regular expression on every iteration",
            },
            matcher: regex_compile_in_loop,
        },
        CallInLoop {
            meta: RuleMeta {
                id: "regex-literal-match-in-loop",
                title: "uncached regex match in loop",
                category: Category::Regex,
                severity: Severity::Low,
                targets: CALL,
                languages: &[Language::Python, Language::Go],
                template: "precompile-regex",
                summary: "matches against a pattern string that is parsed on every iteration",
            },
            matcher: regex_literal_match_in_loop,
        },
        CallInLoop {
            meta: RuleMeta {
                id: "sort-in-loop",
                title: "sort inside loop",
                category: Category::Sort,
                severity: Severity::Medium,
                targets: CALL,
                languages: &[],
                template: "sort-once",
                summary: "re-sorts the same collection on every iteration",
            },
            matcher: sort_in_loop,
        },
        CallInLoop {
            meta: RuleMeta {
                id: "dom-query-in-loop",
                title: "DOM query inside loop",
                category: Category::Dom,
                severity: Severity::Medium,
                targets: CALL,
                languages: &[Language::JavaScript, Language::TypeScript],
                template: "cache-dom-query",
                summary: "queries the DOM on every iteration",
            },
            matcher: dom_query_in_loop,
        },
        CallInLoop {
            meta: RuleMeta {
                id: "serialization-in-loop",
                title: "serialization inside loop",
                category: Category::Serialization,
                severity: Severity::Low,
                targets: CALL,
                languages: &[],
                template: "hoist-serialization",
                summary: "re-serializes data that does not change between iterations",
            },
            matcher: serialization_in_loop,
        },
        CallInLoop {
            meta: RuleMeta {
                id: "format-in-loop",
                title: "formatting allocation in loop",
                category: Category::String,
                severity: Severity::Low,
                targets: CALL,
                languages: &[Language::Rust],
                template: "write-into-buffer",
                summary: "allocates a new String on every iteration",
            },
            matcher: format_in_loop,
        },
        CallInLoop {
            meta: RuleMeta {
                id: "lock-in-loop",
                title: "lock acquisition in loop",
                category: Category::Lock,
                severity: Severity::Low,
                targets: CALL,
                languages: &[Language::Rust, Language::Go, Language::Java],
                template: "hoist-lock",
                summary: "acquires the same lock on every iteration",
            },
            matcher: lock_in_loop,
        },
    ]
}

fn expect_call(node: &IsgNode) -> Result<&perfscan_isg::CallNode, RuleFault> {
    node.as_call()
        .ok_or_else(|| RuleFault::UnexpectedShape(format!("expected a call, found {:?}", node.tag())))
}

fn fire(node: &IsgNode, cx: &RuleContext<'_>) -> Result<Option<Captures>, RuleFault> {
    Ok(Some(cx.base_captures(node)))
}

fn fire_if(hit: bool, node: &IsgNode, cx: &RuleContext<'_>) -> Result<Option<Captures>, RuleFault> {
    if hit {
        fire(node, cx)
    } else {
        Ok(None)
    }
}

fn arguments(node: &IsgNode) -> impl Iterator<Item = &IsgNode> {
    node.children_with(Role::Argument)
}

fn first_argument_is_zero(node: &IsgNode) -> bool {
    arguments(node)
        .next()
        .and_then(|a| a.as_literal())
        .and_then(|l| l.as_integer())
        == Some(0)
}

fn first_argument_is_string(node: &IsgNode) -> bool {
    arguments(node)
        .next()
        .and_then(|a| a.as_literal())
        .is_some_and(|l| l.kind == LiteralKind::String)
}

/// Name of the first argument when it is a plain or dotted identifier
fn first_argument_name(node: &IsgNode) -> Option<&str> {
    arguments(node).next().and_then(|a| a.as_identifier())
}

fn receiver_is(call: &perfscan_isg::CallNode, names: &[&str]) -> bool {
    call.receiver_root().is_some_and(|r| names.contains(&r))
}

// === Matchers ===

fn query_in_loop(node: &IsgNode, cx: &RuleContext<'_>) -> Result<Option<Captures>, RuleFault> {
    let call = expect_call(node)?;
    fire_if(is_query_call(call), node, cx)
}

const IO_RECEIVERS: &[&str] = &[
    "fs", "os", "ioutil", "io", "files", "file", "shutil", "pathlib", "time", "thread", "path",
];

const IO_CALLS: &[&str] = &[
    "readfile", "writefile", "appendfile", "open", "create", "read", "write", "readlines",
    "read_to_string", "read_to_end", "read_dir", "readdir", "readalllines", "readstring",
    "writestring", "readallbytes", "write_all", "sleep", "stat", "remove", "copy", "rename",
    "exists", "listdir", "makedirs", "mkdir", "walk",
];

const IO_CONSTRUCTORS: &[&str] = &[
    "FileReader",
    "FileWriter",
    "FileInputStream",
    "FileOutputStream",
    "RandomAccessFile",
];

fn sync_io_in_loop(node: &IsgNode, cx: &RuleContext<'_>) -> Result<Option<Captures>, RuleFault> {
    let call = expect_call(node)?;
    let callee = call.callee.as_str();
    let hit = if call.constructs {
        IO_CONSTRUCTORS.contains(&callee)
    } else {
        match call.receiver_root() {
            None => matches!(callee, "open" | "input"),
            Some(root) => {
                let known_receiver = IO_RECEIVERS.contains(&root.to_lowercase().as_str())
                    && IO_CALLS.contains(&callee.to_lowercase().as_str());
                let node_sync_api = callee.len() > 4 && callee.ends_with("Sync");
                known_receiver || node_sync_api
            }
        }
    };
    fire_if(hit, node, cx)
}

fn collection_mutation_in_loop(node: &IsgNode, cx: &RuleContext<'_>) -> Result<Option<Captures>, RuleFault> {
    let call = expect_call(node)?;
    if call.receiver.is_none() {
        return Ok(None);
    }
    let hit = match call.callee.as_str() {
        "unshift" | "shift" | "splice" => true,
        // list.insert(0, x) / list.add(0, x)
        "insert" | "add" => call.arg_count == 2 && first_argument_is_zero(node),
        // list.pop(0) / vec.remove(0)
        "pop" | "remove" => call.arg_count == 1 && first_argument_is_zero(node),
        _ => false,
    };
    fire_if(hit, node, cx)
}

const SPREADS: &[&str] = &["spread_element", "list_splat", "dictionary_splat"];

const COPY_BUILTINS: &[&str] = &["list", "dict", "set", "tuple", "frozenset"];

const COPY_CONSTRUCTORS: &[&str] = &[
    "ArrayList",
    "LinkedList",
    "HashMap",
    "HashSet",
    "TreeMap",
    "TreeSet",
    "LinkedHashMap",
];

fn collection_copy_in_loop(node: &IsgNode, cx: &RuleContext<'_>) -> Result<Option<Captures>, RuleFault> {
    if let NodeKind::Allocation(_) = &node.kind {
        // [...acc, x] / {**acc, k: v}
        let spread = node.children.iter().find_map(|c| match &c.kind {
            NodeKind::Other(kind) if SPREADS.contains(&kind.as_str()) => c
                .children
                .iter()
                .find_map(|inner| inner.as_identifier().map(|name| (name, inner.span))),
            _ => None,
        });
        return match spread {
            Some((name, span)) if cx.outlives_loop(perfscan_isg::root_name(name), node) => {
                let mut captures = cx.base_captures(node);
                captures.insert("source", name, span);
                Ok(Some(captures))
            }
            _ => Ok(None),
        };
    }

    let call = expect_call(node)?;
    let callee = call.callee.as_str();
    let source = if callee == "concat" {
        call.receiver_root()
    } else if receiver_is(call, &["Array"]) && callee == "from" {
        first_argument_name(node)
    } else if receiver_is(call, &["Object"]) && callee == "assign" {
        let into_fresh = arguments(node)
            .next()
            .is_some_and(|a| matches!(&a.kind, NodeKind::Allocation(alloc) if alloc.element_count == 0));
        if into_fresh {
            arguments(node).nth(1).and_then(|a| a.as_identifier())
        } else {
            None
        }
    } else if call.receiver.is_none() && call.arg_count == 1 && (COPY_BUILTINS.contains(&callee) || (call.constructs && COPY_CONSTRUCTORS.contains(&callee))) {
        first_argument_name(node)
    } else {
        None
    };

    match source {
        Some(name) if cx.outlives_loop(perfscan_isg::root_name(name), node) => {
            let mut captures = cx.base_captures(node);
            captures.insert("source", name, node.span);
            Ok(Some(captures))
        }
        _ => Ok(None),
    }
}

/// Whether `name` was built as a list earlier in the scope
fn list_like(name: &str, node: &IsgNode, cx: &RuleContext<'_>) -> bool {
    cx.assignments_before(name, node).iter().any(|assign| {
        assign.children_with(Role::Value).any(|value| match &value.kind {
            NodeKind::Allocation(alloc) => alloc.shape == CollectionShape::List,
            NodeKind::Call(call) => {
                matches!(call.callee.as_str(), "list" | "ArrayList" | "LinkedList" | "asList" | "vec!")
                    || (call.callee == "of" && receiver_is(call, &["List"]))
                    || (call.callee == "new" && receiver_is(call, &["Vec"]))
            }
            _ => false,
        })
    })
}

fn linear_search_in_loop(node: &IsgNode, cx: &RuleContext<'_>) -> Result<Option<Captures>, RuleFault> {
    if let NodeKind::CollectionOp(op) = &node.kind {
        if op.op != CollectionOpKind::Membership {
            return Ok(None);
        }
        return match op.collection.as_deref() {
            Some(name) if cx.outlives_loop(perfscan_isg::root_name(name), node) && list_like(name, node, cx) => {
                let mut captures = cx.base_captures(node);
                captures.insert("receiver", name, node.span);
                Ok(Some(captures))
            }
            _ => Ok(None),
        };
    }

    let call = expect_call(node)?;
    let Some(receiver) = call.receiver.as_deref() else {
        return Ok(None);
    };
    let root = perfscan_isg::root_name(receiver);
    if !cx.outlives_loop(root, node) {
        return Ok(None);
    }
    let hit = match call.callee.as_str() {
        "indexOf" | "lastIndexOf" | "includes" => true,
        "find" | "findIndex" => {
            !is_query_call(call) && arguments(node).any(|a| a.tag() == NodeTag::Closure)
        }
        "index" => cx.language() == Language::Python && call.arg_count == 1,
        "contains" => list_like(receiver, node, cx),
        _ => false,
    };
    fire_if(hit, node, cx)
}

fn regex_compile_in_loop(node: &IsgNode, cx: &RuleContext<'_>) -> Result<Option<Captures>, RuleFault> {
    let call = expect_call(node)?;
    let callee = call.callee.as_str();
    let hit = (call.constructs && callee == "RegExp")
        || (receiver_is(call, &["re"]) && callee == "compile")
        || (receiver_is(call, &["Pattern"]) && callee == "compile")
        || (receiver_is(call, &["Regex", "RegexBuilder"]) && callee == "new")
        || (receiver_is(call, &["regexp"])
            && matches!(callee, "Compile" | "MustCompile" | "CompilePOSIX" | "MustCompilePOSIX"));
    fire_if(hit, node, cx)
}

fn regex_literal_match_in_loop(node: &IsgNode, cx: &RuleContext<'_>) -> Result<Option<Captures>, RuleFault> {
    let call = expect_call(node)?;
    let callee = call.callee.as_str();
    let module_level_match = (receiver_is(call, &["re"])
        && matches!(callee, "match" | "search" | "fullmatch" | "findall" | "finditer" | "sub" | "subn" | "split"))
        || (receiver_is(call, &["regexp"]) && matches!(callee, "MatchString" | "Match" | "MatchReader"));
    fire_if(module_level_match && first_argument_is_string(node), node, cx)
}

const SORT_HELPERS: &[&str] = &["Collections", "Arrays", "sort", "slices"];

fn sort_in_loop(node: &IsgNode, cx: &RuleContext<'_>) -> Result<Option<Captures>, RuleFault> {
    let call = expect_call(node)?;
    let sorting = match call.callee.as_str() {
        "sort" | "sorted" | "sortBy" | "sort_by" | "sort_by_key" | "sort_unstable"
        | "sort_unstable_by" | "sort_unstable_by_key" => true,
        "Slice" | "SliceStable" | "Strings" | "Ints" | "Float64s" | "Sort" | "Stable" => {
            receiver_is(call, &["sort", "slices"])
        }
        _ => false,
    };
    if !sorting {
        return Ok(None);
    }
    match call_subject(node, call, SORT_HELPERS) {
        Some(subject) if cx.outlives_loop(subject, node) => fire(node, cx),
        _ => Ok(None),
    }
}

fn dom_query_in_loop(node: &IsgNode, cx: &RuleContext<'_>) -> Result<Option<Captures>, RuleFault> {
    let call = expect_call(node)?;
    fire_if(is_dom_query(call), node, cx)
}

fn serialization_in_loop(node: &IsgNode, cx: &RuleContext<'_>) -> Result<Option<Captures>, RuleFault> {
    let call = expect_call(node)?;
    let callee = call.callee.as_str();
    let serializes = (receiver_is(call, &["JSON"]) && matches!(callee, "stringify" | "parse"))
        || (receiver_is(call, &["json", "pickle", "marshal", "yaml", "simplejson", "orjson"])
            && matches!(
                callee,
                "dumps" | "loads" | "dump" | "load" | "safe_load" | "Marshal" | "MarshalIndent" | "Unmarshal"
            ))
        || (receiver_is(call, &["serde_json"])
            && matches!(
                callee,
                "to_string" | "to_string_pretty" | "to_vec" | "to_value" | "from_str" | "from_slice" | "from_value"
            ))
        || matches!(callee, "writeValueAsString" | "readValue" | "toJson" | "fromJson");
    if !serializes {
        return Ok(None);
    }
    // Decoding each element is the loop's job; re-encoding outer data is not
    match first_argument_name(node) {
        Some(name) if cx.outlives_loop(perfscan_isg::root_name(name), node) => {
            let mut captures = cx.base_captures(node);
            captures.insert("source", name, node.span);
            Ok(Some(captures))
        }
        _ => Ok(None),
    }
}

fn format_in_loop(node: &IsgNode, cx: &RuleContext<'_>) -> Result<Option<Captures>, RuleFault> {
    let call = expect_call(node)?;
    fire_if(call.callee == "format!", node, cx)
}

fn lock_in_loop(node: &IsgNode, cx: &RuleContext<'_>) -> Result<Option<Captures>, RuleFault> {
    let call = expect_call(node)?;
    let Some(receiver) = call.receiver.as_deref() else {
        return Ok(None);
    };
    let lockish_receiver = super::words(receiver)
        .iter()
        .any(|w| matches!(w.as_str(), "lock" | "rwlock" | "mutex" | "mu" | "rw"));
    let acquires = match call.callee.as_str() {
        "lock" | "Lock" | "RLock" | "lock_owned" => true,
        "read" | "write" => lockish_receiver,
        _ => false,
    };
    if !acquires || !cx.outlives_loop(perfscan_isg::root_name(receiver), node) {
        return Ok(None);
    }
    let mut captures = cx.base_captures(node);
    captures.insert("release", release_of(&call.callee), node.span);
    Ok(Some(captures))
}

/// The explicit unlock paired with an acquire, when the language has one
fn release_of(acquire: &str) -> &'static str {
    match acquire {
        "Lock" => "Unlock",
        "RLock" => "RUnlock",
        _ => "",
    }
}
