use perfscan_isg::{CollectionShape, Language, LiteralKind, LoopKind};

use crate::{Construct, MappingTable};

/// TypeScript's grammar extends JavaScript's; type-only nodes stay unmapped
const KINDS: &[(&str, Construct)] = &[
    ("program", Construct::Module),
    ("function_declaration", Construct::Function),
    ("generator_function_declaration", Construct::Function),
    ("method_definition", Construct::Function),
    ("function_expression", Construct::Closure),
    ("function", Construct::Closure),
    ("arrow_function", Construct::Closure),
    ("statement_block", Construct::Block),
    ("for_statement", Construct::Loop(LoopKind::For)),
    ("for_in_statement", Construct::Loop(LoopKind::ForEach)),
    ("while_statement", Construct::Loop(LoopKind::While)),
    ("do_statement", Construct::Loop(LoopKind::While)),
    ("call_expression", Construct::Call),
    ("new_expression", Construct::New),
    ("member_expression", Construct::Member),
    ("subscript_expression", Construct::Index),
    ("assignment_expression", Construct::Assign),
    ("augmented_assignment_expression", Construct::Assign),
    ("variable_declarator", Construct::Declare),
    ("binary_expression", Construct::Binary),
    ("identifier", Construct::Identifier),
    ("property_identifier", Construct::Identifier),
    ("shorthand_property_identifier", Construct::Identifier),
    ("this", Construct::Identifier),
    ("string", Construct::Literal(LiteralKind::String)),
    ("template_string", Construct::Literal(LiteralKind::String)),
    ("number", Construct::Literal(LiteralKind::Number)),
    ("true", Construct::Literal(LiteralKind::Bool)),
    ("false", Construct::Literal(LiteralKind::Bool)),
    ("null", Construct::Literal(LiteralKind::Null)),
    ("undefined", Construct::Literal(LiteralKind::Null)),
    ("regex", Construct::Literal(LiteralKind::Regex)),
    ("array", Construct::Collection(CollectionShape::List)),
    ("object", Construct::Collection(CollectionShape::Map)),
    ("if_statement", Construct::Conditional),
    ("ternary_expression", Construct::Conditional),
    ("return_statement", Construct::Return),
    ("await_expression", Construct::Await),
    ("expression_statement", Construct::Transparent),
    ("parenthesized_expression", Construct::Transparent),
    ("lexical_declaration", Construct::Transparent),
    ("variable_declaration", Construct::Transparent),
];

pub static JAVASCRIPT: MappingTable = MappingTable {
    language: Language::JavaScript,
    kinds: KINDS,
    range_callees: &[],
};

pub static TYPESCRIPT: MappingTable = MappingTable {
    language: Language::TypeScript,
    kinds: KINDS,
    range_callees: &[],
};
