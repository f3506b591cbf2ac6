//! Per-language mapping tables
//!
//! Each supported language owns exactly one table from grammar node kinds to
//! ISG constructs. Everything downstream of the adapter only ever sees the
//! constructs.

use perfscan_isg::{CollectionShape, Language, LiteralKind, LoopKind};

/// What a grammar kind becomes in the ISG
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Construct {
    Module,
    Function,
    /// Wrapper carrying decorators for the definition it holds
    Decorated,
    Block,
    Loop(LoopKind),
    /// Python comprehension / generator expression
    Comprehension,
    /// Go `for` whose shape depends on its clause child
    ClauseLoop,
    Call,
    /// `new X(...)`
    New,
    /// `name!(...)`
    MacroCall,
    /// `a.b`, `A::b`
    Member,
    Index,
    Assign,
    /// Binding introduction (`let`, `const`, `:=`, declarators)
    Declare,
    Binary,
    Range,
    Identifier,
    Literal(LiteralKind),
    Collection(CollectionShape),
    Closure,
    Conditional,
    Return,
    Await,
    /// Wrapper with no meaning of its own; collapses to its only named child
    Transparent,
}

/// Node-kind correspondences for one language
#[derive(Debug)]
pub struct MappingTable {
    pub language: Language,
    pub kinds: &'static [(&'static str, Construct)],
    /// Callees producing literal-bounded integer ranges (`range(10)`)
    pub range_callees: &'static [&'static str],
}

impl MappingTable {
    pub fn construct(&self, kind: &str) -> Option<Construct> {
        self.kinds
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, construct)| *construct)
    }
}
