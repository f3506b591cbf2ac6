//! The built-in rule catalog
//!
//! Every rule is a self-contained value registered here; nothing else in the
//! crate knows individual rules.

mod call_in_loop;
mod clone;
mod concat;
mod growth;
mod n_plus_one;
mod sequential_await;

use perfscan_isg::{root_name, CallNode, IsgNode, NodeKind};

use crate::Rule;

pub use call_in_loop::CallInLoop;
pub use clone::{CloneInHotScope, CloneInLoop};
pub use concat::StringConcatInLoop;
pub use growth::UnboundedGrowth;
pub use n_plus_one::NPlusOneQuery;
pub use sequential_await::AwaitInLoop;

/// All built-in rules, in catalog order
pub fn builtin_rules() -> Vec<Box<dyn Rule>> {
    let mut rules: Vec<Box<dyn Rule>> = vec![Box::new(NPlusOneQuery::new())];
    rules.extend(
        call_in_loop::table()
            .into_iter()
            .map(|rule| Box::new(rule) as Box<dyn Rule>),
    );
    rules.push(Box::new(CloneInLoop::new()));
    rules.push(Box::new(CloneInHotScope::new()));
    rules.push(Box::new(StringConcatInLoop::new()));
    rules.push(Box::new(UnboundedGrowth::new()));
    rules.push(Box::new(AwaitInLoop::new()));
    rules
}

// === Vocabulary ===

/// Lowercased words of an identifier split on `_`, `$` and camel humps
pub(crate) fn words(name: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for c in name.chars() {
        if c == '_' || c == '$' || c == '!' || c == '.' {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Receivers that front a database, ORM or remote service
const REMOTE_RECEIVERS: &[&str] = &[
    "db", "database", "session", "conn", "connection", "cursor", "repo", "repository", "orm",
    "objects", "client", "api", "http", "https", "axios", "requests", "prisma", "knex", "pool",
    "dao", "em", "model", "mongo", "collection", "redis", "sql", "service",
];

/// Verbs that always reach a data source
const QUERY_VERBS: &[&str] = &["fetch", "query", "execute", "exec", "retrieve", "request", "select"];

/// Verbs that reach a data source when the receiver or name says so
const LOOKUP_VERBS: &[&str] = &["find", "get", "load", "lookup", "read", "filter", "search", "count"];

/// Lookup suffixes marking a repository-style finder (`findById`, `getAll`)
const FINDER_WORDS: &[&str] = &["by", "all", "one", "many", "where", "first", "from"];

const DOM_QUERIES: &[&str] = &[
    "querySelector",
    "querySelectorAll",
    "getElementById",
    "getElementsByClassName",
    "getElementsByTagName",
    "getElementsByName",
    "getComputedStyle",
    "getBoundingClientRect",
];

pub(crate) fn is_dom_query(call: &CallNode) -> bool {
    DOM_QUERIES.contains(&call.callee.as_str())
}

pub(crate) fn has_remote_receiver(call: &CallNode) -> bool {
    call.receiver
        .as_deref()
        .is_some_and(|r| words(r).iter().any(|w| REMOTE_RECEIVERS.contains(&w.as_str())))
}

/// Call whose name or receiver says it reaches a database or service
pub(crate) fn is_query_call(call: &CallNode) -> bool {
    if is_dom_query(call) || call.callee == "requestAnimationFrame" || call.constructs {
        return false;
    }
    let callee_words = words(&call.callee);
    let Some(verb) = callee_words.first() else {
        return false;
    };
    if QUERY_VERBS.contains(&verb.as_str()) {
        return true;
    }
    if !LOOKUP_VERBS.contains(&verb.as_str()) {
        return false;
    }
    if has_remote_receiver(call) {
        return true;
    }
    let finder = callee_words[1..]
        .iter()
        .any(|w| FINDER_WORDS.contains(&w.as_str()));
    let free_lookup = call.receiver.is_none() && callee_words.len() >= 2 && call.arg_count >= 1;
    finder || free_lookup
}

/// Identifier root of what a call operates on: the receiver, or for static
/// helpers (`Collections.sort(xs)`, `sorted(xs)`) the first argument
pub(crate) fn call_subject<'n>(node: &'n IsgNode, call: &'n CallNode, helpers: &[&str]) -> Option<&'n str> {
    match call.receiver_root() {
        Some(root) if !helpers.contains(&root) => Some(root),
        _ => node
            .children
            .iter()
            .find(|c| c.role == perfscan_isg::Role::Argument)
            .and_then(|arg| match &arg.kind {
                NodeKind::Identifier(name) => Some(root_name(name)),
                _ => None,
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_call(callee: &str, receiver: Option<&str>, arg_count: usize) -> CallNode {
        CallNode {
            callee: callee.into(),
            receiver: receiver.map(Into::into),
            arg_count,
            constructs: false,
        }
    }

    #[test]
    fn test_words() {
        assert_eq!(words("findById"), vec!["find", "by", "id"]);
        assert_eq!(words("get_user"), vec!["get", "user"]);
        assert_eq!(words("HTTPClient"), vec!["httpclient"]);
        assert_eq!(words("format!"), vec!["format"]);
    }

    #[test]
    fn test_query_vocabulary() {
        assert!(is_query_call(&make_call("fetch", None, 1)));
        assert!(is_query_call(&make_call("query", Some("db"), 1)));
        assert!(is_query_call(&make_call("get", Some("self.session"), 1)));
        assert!(is_query_call(&make_call("findById", Some("userRepo"), 1)));
        assert!(is_query_call(&make_call("get_user", None, 1)));

        assert!(!is_query_call(&make_call("get", Some("cache"), 1)));
        assert!(!is_query_call(&make_call("getName", Some("user"), 0)));
        assert!(!is_query_call(&make_call("find", Some("items"), 1)));
        assert!(!is_query_call(&make_call("querySelector", Some("document"), 1)));
        assert!(!is_query_call(&make_call("append", Some("db"), 1)));
    }

    #[test]
    fn test_every_rule_has_a_unique_id() {
        let rules = builtin_rules();
        assert_eq!(rules.len(), 18);
        let mut ids: Vec<&str> = rules.iter().map(|r| r.meta().id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 18);
    }
}
