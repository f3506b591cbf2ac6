use perfscan_isg::{CollectionShape, Language, LiteralKind, LoopKind};

use crate::{Construct, MappingTable};

pub static RUST: MappingTable = MappingTable {
    language: Language::Rust,
    kinds: &[
        ("source_file", Construct::Module),
        ("function_item", Construct::Function),
        ("closure_expression", Construct::Closure),
        ("block", Construct::Block),
        ("for_expression", Construct::Loop(LoopKind::ForEach)),
        ("while_expression", Construct::Loop(LoopKind::While)),
        ("loop_expression", Construct::Loop(LoopKind::Infinite)),
        ("call_expression", Construct::Call),
        ("macro_invocation", Construct::MacroCall),
        ("field_expression", Construct::Member),
        ("scoped_identifier", Construct::Member),
        ("index_expression", Construct::Index),
        ("let_declaration", Construct::Declare),
        ("assignment_expression", Construct::Assign),
        ("compound_assignment_expr", Construct::Assign),
        ("binary_expression", Construct::Binary),
        ("range_expression", Construct::Range),
        ("identifier", Construct::Identifier),
        ("field_identifier", Construct::Identifier),
        ("type_identifier", Construct::Identifier),
        ("self", Construct::Identifier),
        ("string_literal", Construct::Literal(LiteralKind::String)),
        ("raw_string_literal", Construct::Literal(LiteralKind::String)),
        ("integer_literal", Construct::Literal(LiteralKind::Number)),
        ("float_literal", Construct::Literal(LiteralKind::Number)),
        ("boolean_literal", Construct::Literal(LiteralKind::Bool)),
        ("array_expression", Construct::Collection(CollectionShape::List)),
        ("if_expression", Construct::Conditional),
        ("return_expression", Construct::Return),
        ("await_expression", Construct::Await),
        ("expression_statement", Construct::Transparent),
        ("parenthesized_expression", Construct::Transparent),
    ],
    range_callees: &[],
};
