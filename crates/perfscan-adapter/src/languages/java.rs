use perfscan_isg::{CollectionShape, Language, LiteralKind, LoopKind};

use crate::{Construct, MappingTable};

pub static JAVA: MappingTable = MappingTable {
    language: Language::Java,
    kinds: &[
        ("program", Construct::Module),
        ("method_declaration", Construct::Function),
        ("constructor_declaration", Construct::Function),
        ("lambda_expression", Construct::Closure),
        ("block", Construct::Block),
        ("constructor_body", Construct::Block),
        ("for_statement", Construct::Loop(LoopKind::For)),
        ("enhanced_for_statement", Construct::Loop(LoopKind::ForEach)),
        ("while_statement", Construct::Loop(LoopKind::While)),
        ("do_statement", Construct::Loop(LoopKind::While)),
        ("method_invocation", Construct::Call),
        ("object_creation_expression", Construct::New),
        ("field_access", Construct::Member),
        ("array_access", Construct::Index),
        ("variable_declarator", Construct::Declare),
        ("assignment_expression", Construct::Assign),
        ("binary_expression", Construct::Binary),
        ("identifier", Construct::Identifier),
        ("type_identifier", Construct::Identifier),
        ("this", Construct::Identifier),
        ("string_literal", Construct::Literal(LiteralKind::String)),
        ("decimal_integer_literal", Construct::Literal(LiteralKind::Number)),
        ("decimal_floating_point_literal", Construct::Literal(LiteralKind::Number)),
        ("true", Construct::Literal(LiteralKind::Bool)),
        ("false", Construct::Literal(LiteralKind::Bool)),
        ("null_literal", Construct::Literal(LiteralKind::Null)),
        ("array_initializer", Construct::Collection(CollectionShape::List)),
        ("array_creation_expression", Construct::Collection(CollectionShape::List)),
        ("if_statement", Construct::Conditional),
        ("return_statement", Construct::Return),
        ("expression_statement", Construct::Transparent),
        ("parenthesized_expression", Construct::Transparent),
        ("local_variable_declaration", Construct::Transparent),
    ],
    range_callees: &[],
};
