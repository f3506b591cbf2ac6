//! Remediation templates
//!
//! Advice is language independent and exists for every key. Examples are
//! keyed by (key, language) and may only reference captured identifiers
//! through placeholders; everything else is keywords, standard-library API
//! or comments. A key may list several examples for one language: the first
//! whose placeholders can all be filled is used.

use perfscan_isg::Language::{self, Go, Java, JavaScript, Python, Rust};

/// A before/after pair with `{placeholder}` slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExampleTemplate {
    pub key: &'static str,
    pub language: Language,
    pub before: &'static str,
    pub after: &'static str,
}

/// Advice text per template key
pub const ADVICE: &[(&str, &str)] = &[
    (
        "batch-query",
        "Fetch everything the loop needs with one batched query before the loop, then look each item up in memory.",
    ),
    (
        "hoist-io",
        "Move the blocking I/O out of the loop: read or write once and work from memory, or use a buffered or async API.",
    ),
    (
        "front-mutation",
        "Inserting or removing at the front shifts every element. Use a double-ended queue or walk the collection with an index.",
    ),
    (
        "accumulate-in-place",
        "Grow one collection in place instead of copying it on every iteration.",
    ),
    (
        "index-lookup",
        "Build a set or map once before the loop so each lookup is constant time instead of a scan.",
    ),
    (
        "precompile-regex",
        "Compile the regular expression once, outside the loop, and reuse the compiled pattern.",
    ),
    (
        "sort-once",
        "Sort once before the loop, or keep the collection ordered with sorted insertion.",
    ),
    (
        "cache-dom-query",
        "Query the DOM once before the loop and reuse the element references.",
    ),
    (
        "hoist-serialization",
        "Serialize or parse data that does not change once, outside the loop.",
    ),
    (
        "write-into-buffer",
        "Write into one reusable buffer instead of allocating a new String per iteration.",
    ),
    (
        "hoist-lock",
        "Acquire the lock once around the loop, or collect the work first and apply it under a single lock.",
    ),
    (
        "hoist-copy",
        "Copy once outside the loop or borrow the data; copy only the parts that are actually modified.",
    ),
    (
        "join-strings",
        "Collect the pieces and join them once; repeated concatenation copies the whole string every time.",
    ),
    (
        "bound-collection",
        "Give the collection a size limit or an eviction policy, or clear it when its contents are no longer needed.",
    ),
    (
        "gather-awaits",
        "Start the independent async calls together and await them as a group instead of one after another.",
    ),
    (
        "memoize-recursion",
        "Cache results by argument so each subproblem is solved once, or rewrite the recursion as an iterative table.",
    ),
    (
        "index-inner-loop",
        "Replace the inner scan with a lookup in a map or set built once, so the work grows linearly with input size.",
    ),
    (
        "single-pass",
        "This code does n log n work on input that may be large. Check whether a single pass, a streaming approach or a precomputed index avoids the extra factor.",
    ),
];

/// Advice for a template key
pub fn advice_for(key: &str) -> Option<&'static str> {
    ADVICE.iter().find(|(k, _)| *k == key).map(|(_, text)| *text)
}

/// Examples for `key` in `language`, in preference order
///
/// TypeScript uses the JavaScript examples.
pub fn examples_for(key: &str, language: Language) -> impl Iterator<Item = &'static ExampleTemplate> + '_ {
    let language = match language {
        Language::TypeScript => Language::JavaScript,
        other => other,
    };
    EXAMPLES
        .iter()
        .filter(move |e| e.key == key && e.language == language)
}

const fn example(
    key: &'static str,
    language: Language,
    before: &'static str,
    after: &'static str,
) -> ExampleTemplate {
    ExampleTemplate {
        key,
        language,
        before,
        after,
    }
}

pub const EXAMPLES: &[ExampleTemplate] = &[
    // === Python ===
    example(
        "batch-query",
        Python,
        "for {loop_var} in {iterable}:\n    {receiver}.{callee}(...)",
        "# one round trip for every {loop_var}, then look results up in a dict\n{receiver}.{callee}([... for {loop_var} in {iterable}])",
    ),
    example(
        "batch-query",
        Python,
        "for {loop_var} in {iterable}:\n    {callee}(...)",
        "# one round trip for every {loop_var}, then look results up in a dict\n{callee}([... for {loop_var} in {iterable}])",
    ),
    example(
        "hoist-io",
        Python,
        "for {loop_var} in {iterable}:\n    {callee}(...)",
        "{callee}(...)  # once, before the loop\nfor {loop_var} in {iterable}:\n    ...  # work from memory",
    ),
    example(
        "front-mutation",
        Python,
        "{receiver}.{callee}(0)  # inside the loop",
        "from collections import deque\n\n{receiver} = deque({receiver})  # before the loop\n# popleft() and appendleft() are O(1)",
    ),
    example(
        "accumulate-in-place",
        Python,
        "for {loop_var} in {iterable}:\n    ... {source} ...  # a fresh copy per iteration",
        "for {loop_var} in {iterable}:\n    {source}.append(...)  # grow in place",
    ),
    example(
        "index-lookup",
        Python,
        "for {loop_var} in {iterable}:\n    if ... in {receiver}:\n        ...",
        "{receiver} = set({receiver})  # O(1) membership\nfor {loop_var} in {iterable}:\n    if ... in {receiver}:\n        ...",
    ),
    example(
        "precompile-regex",
        Python,
        "for {loop_var} in {iterable}:\n    re.{callee}(\"...\", {loop_var})",
        "# re.compile(\"...\") once at module level, then call the compiled pattern\nfor {loop_var} in {iterable}:\n    ...",
    ),
    example(
        "sort-once",
        Python,
        "for {loop_var} in {iterable}:\n    {receiver}.{callee}()",
        "{receiver}.{callee}()  # once, before the loop\nfor {loop_var} in {iterable}:\n    ...  # bisect.insort keeps it ordered",
    ),
    example(
        "hoist-serialization",
        Python,
        "for {loop_var} in {iterable}:\n    {receiver}.{callee}({source})",
        "{receiver}.{callee}({source})  # once, before the loop\nfor {loop_var} in {iterable}:\n    ...  # reuse the result",
    ),
    example(
        "hoist-copy",
        Python,
        "for {loop_var} in {iterable}:\n    {callee}({source})",
        "for {loop_var} in {iterable}:\n    ...  # read {source} directly, copy only what changes",
    ),
    example(
        "hoist-copy",
        Python,
        "def {scope}(...):\n    {callee}({source})  # on every call",
        "def {scope}(...):\n    ...  # read {source} directly, copy only what changes",
    ),
    example(
        "join-strings",
        Python,
        "for {loop_var} in {iterable}:\n    {target} += ...",
        "{target} = \"\".join(... for {loop_var} in {iterable})",
    ),
    example(
        "bound-collection",
        Python,
        "{target}.{callee}(...)  # never trimmed",
        "from collections import deque\n\n{target} = deque(maxlen=...)  # oldest entries fall off\n{target}.append(...)",
    ),
    example(
        "gather-awaits",
        Python,
        "for {loop_var} in {iterable}:\n    await {callee}(...)",
        "await asyncio.gather(*({callee}(...) for {loop_var} in {iterable}))",
    ),
    example(
        "memoize-recursion",
        Python,
        "def {scope}(...):\n    ... {callee}(...) ... {callee}(...)",
        "from functools import lru_cache\n\n@lru_cache(maxsize=None)\ndef {scope}(...):\n    ... {callee}(...) ... {callee}(...)",
    ),
    example(
        "index-inner-loop",
        Python,
        "for ... in ...:\n    for {loop_var} in {iterable}:\n        if ...:\n            ...",
        "# build a dict over {iterable} once, keyed by what the inner loop compares\nfor ... in ...:\n    ...  # one dict lookup instead of scanning {iterable}",
    ),
    // === JavaScript / TypeScript ===
    example(
        "batch-query",
        JavaScript,
        "for (const {loop_var} of {iterable}) {\n  await {receiver}.{callee}(/* ... */);\n}",
        "// one round trip for every {loop_var}, then look results up in a Map\nawait {receiver}.{callee}({iterable}.map(({loop_var}) => /* ... */));",
    ),
    example(
        "batch-query",
        JavaScript,
        "for (const {loop_var} of {iterable}) {\n  await {callee}(/* ... */);\n}",
        "// one round trip for every {loop_var}, then look results up in a Map\nawait {callee}({iterable}.map(({loop_var}) => /* ... */));",
    ),
    example(
        "hoist-io",
        JavaScript,
        "for (const {loop_var} of {iterable}) {\n  {receiver}.{callee}(/* ... */);\n}",
        "{receiver}.{callee}(/* ... */); // once, before the loop\nfor (const {loop_var} of {iterable}) {\n  // work from memory\n}",
    ),
    example(
        "front-mutation",
        JavaScript,
        "{receiver}.{callee}(); // inside the loop",
        "// keep a read index into {receiver} instead of calling {callee}(),\n// which moves every remaining element",
    ),
    example(
        "accumulate-in-place",
        JavaScript,
        "for (const {loop_var} of {iterable}) {\n  {source} = [...{source}, /* ... */];\n}",
        "for (const {loop_var} of {iterable}) {\n  {source}.push(/* ... */);\n}",
    ),
    example(
        "index-lookup",
        JavaScript,
        "for (const {loop_var} of {iterable}) {\n  {receiver}.{callee}(/* ... */);\n}",
        "// new Set({receiver}) or a Map keyed by id, built once before the loop\nfor (const {loop_var} of {iterable}) {\n  // .has(...) is O(1)\n}",
    ),
    example(
        "precompile-regex",
        JavaScript,
        "for (const {loop_var} of {iterable}) {\n  new RegExp(/* ... */).test({loop_var});\n}",
        "// construct the RegExp once, before the loop, and reuse it\nfor (const {loop_var} of {iterable}) {\n  // .test({loop_var})\n}",
    ),
    example(
        "sort-once",
        JavaScript,
        "for (const {loop_var} of {iterable}) {\n  {receiver}.{callee}();\n}",
        "{receiver}.{callee}(); // once, before the loop\nfor (const {loop_var} of {iterable}) {\n  // {receiver} is already ordered\n}",
    ),
    example(
        "cache-dom-query",
        JavaScript,
        "for (const {loop_var} of {iterable}) {\n  {receiver}.{callee}(/* ... */);\n}",
        "// call {receiver}.{callee}(...) once before the loop and keep the result in a const\nfor (const {loop_var} of {iterable}) {\n  // reuse the element\n}",
    ),
    example(
        "hoist-serialization",
        JavaScript,
        "for (const {loop_var} of {iterable}) {\n  {receiver}.{callee}({source});\n}",
        "{receiver}.{callee}({source}); // once, before the loop\nfor (const {loop_var} of {iterable}) {\n  // reuse the result\n}",
    ),
    example(
        "hoist-copy",
        JavaScript,
        "for (const {loop_var} of {iterable}) {\n  {callee}({source});\n}",
        "for (const {loop_var} of {iterable}) {\n  // read {source} directly, copy only what changes\n}",
    ),
    example(
        "join-strings",
        JavaScript,
        "for (const {loop_var} of {iterable}) {\n  {target} += /* ... */;\n}",
        "{target} = {iterable}.map(({loop_var}) => /* ... */).join(\"\");",
    ),
    example(
        "bound-collection",
        JavaScript,
        "{target}.{callee}(/* ... */); // never trimmed",
        "{target}.{callee}(/* ... */);\nif ({target}.length > /* limit */) {target}.splice(0, {target}.length - /* limit */);",
    ),
    example(
        "gather-awaits",
        JavaScript,
        "for (const {loop_var} of {iterable}) {\n  await {callee}({loop_var});\n}",
        "await Promise.all({iterable}.map(({loop_var}) => {callee}({loop_var})));",
    ),
    example(
        "memoize-recursion",
        JavaScript,
        "function {scope}(/* ... */) {\n  return {callee}(/* ... */) + {callee}(/* ... */);\n}",
        "// keep finished results in a Map outside {scope} and return early on a hit\nfunction {scope}(/* ... */) {\n  return {callee}(/* ... */) + {callee}(/* ... */);\n}",
    ),
    example(
        "index-inner-loop",
        JavaScript,
        "for (/* ... */) {\n  for (const {loop_var} of {iterable}) {\n    /* ... */\n  }\n}",
        "// build a Map over {iterable} once, keyed by what the inner loop compares\nfor (/* ... */) {\n  // one Map lookup instead of scanning {iterable}\n}",
    ),
    // === Rust ===
    example(
        "hoist-io",
        Rust,
        "for {loop_var} in {iterable} {\n    {receiver}::{callee}(/* ... */)?;\n}",
        "{receiver}::{callee}(/* ... */)?; // once, before the loop\nfor {loop_var} in {iterable} {\n    // work from memory\n}",
    ),
    example(
        "hoist-copy",
        Rust,
        "for {loop_var} in {iterable} {\n    {receiver}.clone();\n}",
        "for {loop_var} in {iterable} {\n    &{receiver}; // borrow instead of cloning\n}",
    ),
    example(
        "write-into-buffer",
        Rust,
        "for {loop_var} in {iterable} {\n    format!(\"...\", {loop_var});\n}",
        "// one String reused across iterations, written with std::fmt::Write\nfor {loop_var} in {iterable} {\n    write!(/* buffer */, \"...\", {loop_var})?;\n}",
    ),
    example(
        "hoist-lock",
        Rust,
        "for {loop_var} in {iterable} {\n    {receiver}.{callee}();\n}",
        "// call {receiver}.{callee}() once and hold the guard for the whole loop\nfor {loop_var} in {iterable} {\n    // work through the guard\n}",
    ),
    example(
        "join-strings",
        Rust,
        "for {loop_var} in {iterable} {\n    {target} += /* ... */;\n}",
        "{target} = {iterable}.iter().map(|{loop_var}| /* ... */).collect::<String>();",
    ),
    example(
        "precompile-regex",
        Rust,
        "for {loop_var} in {iterable} {\n    {receiver}::{callee}(/* ... */);\n}",
        "// build the regex once, e.g. in a std::sync::OnceLock, and reuse it\nfor {loop_var} in {iterable} {\n    // match against the compiled regex\n}",
    ),
    example(
        "sort-once",
        Rust,
        "for {loop_var} in {iterable} {\n    {receiver}.{callee}();\n}",
        "{receiver}.{callee}(); // once, before the loop\nfor {loop_var} in {iterable} {\n    // {receiver} is already ordered\n}",
    ),
    // === Go ===
    example(
        "hoist-lock",
        Go,
        "for _, {loop_var} := range {iterable} {\n\t{receiver}.{callee}()\n\t// ...\n}",
        "{receiver}.{callee}()\ndefer {receiver}.{release}()\nfor _, {loop_var} := range {iterable} {\n\t// ...\n}",
    ),
    example(
        "precompile-regex",
        Go,
        "for _, {loop_var} := range {iterable} {\n\tregexp.{callee}(`...`, {loop_var})\n}",
        "// compile once at package level with regexp.MustCompile and reuse it\nfor _, {loop_var} := range {iterable} {\n\t// ...\n}",
    ),
    example(
        "join-strings",
        Go,
        "for _, {loop_var} := range {iterable} {\n\t{target} += {loop_var}\n}",
        "// write each piece to one strings.Builder and call String() once\nfor _, {loop_var} := range {iterable} {\n\t// ...\n}",
    ),
    // === Java ===
    example(
        "hoist-lock",
        Java,
        "for (var {loop_var} : {iterable}) {\n    {receiver}.{callee}();\n    // ...\n}",
        "{receiver}.{callee}();\ntry {\n    for (var {loop_var} : {iterable}) {\n        // ...\n    }\n} finally {\n    {receiver}.unlock();\n}",
    ),
    example(
        "join-strings",
        Java,
        "for (var {loop_var} : {iterable}) {\n    {target} += {loop_var};\n}",
        "// append to one StringBuilder and call toString() once after the loop\nfor (var {loop_var} : {iterable}) {\n    // ...\n}",
    ),
    example(
        "index-lookup",
        Java,
        "for (var {loop_var} : {iterable}) {\n    {receiver}.{callee}(/* ... */);\n}",
        "// new HashSet<>({receiver}) once, before the loop\nfor (var {loop_var} : {iterable}) {\n    // contains(...) is O(1) on the set\n}",
    ),
    example(
        "precompile-regex",
        Java,
        "for (var {loop_var} : {iterable}) {\n    Pattern.compile(\"...\").matcher({loop_var});\n}",
        "// hold the Pattern.compile(\"...\") result in a static final field and reuse it\nfor (var {loop_var} : {iterable}) {\n    // ...\n}",
    ),
];
