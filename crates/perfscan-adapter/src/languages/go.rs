use perfscan_isg::{CollectionShape, Language, LiteralKind};

use crate::{Construct, MappingTable};

pub static GO: MappingTable = MappingTable {
    language: Language::Go,
    kinds: &[
        ("source_file", Construct::Module),
        ("function_declaration", Construct::Function),
        ("method_declaration", Construct::Function),
        ("func_literal", Construct::Closure),
        ("block", Construct::Block),
        ("for_statement", Construct::ClauseLoop),
        ("call_expression", Construct::Call),
        ("selector_expression", Construct::Member),
        ("index_expression", Construct::Index),
        ("short_var_declaration", Construct::Declare),
        ("assignment_statement", Construct::Assign),
        ("binary_expression", Construct::Binary),
        ("identifier", Construct::Identifier),
        ("field_identifier", Construct::Identifier),
        ("package_identifier", Construct::Identifier),
        ("interpreted_string_literal", Construct::Literal(LiteralKind::String)),
        ("raw_string_literal", Construct::Literal(LiteralKind::String)),
        ("int_literal", Construct::Literal(LiteralKind::Number)),
        ("float_literal", Construct::Literal(LiteralKind::Number)),
        ("true", Construct::Literal(LiteralKind::Bool)),
        ("false", Construct::Literal(LiteralKind::Bool)),
        ("nil", Construct::Literal(LiteralKind::Null)),
        ("composite_literal", Construct::Collection(CollectionShape::List)),
        ("if_statement", Construct::Conditional),
        ("return_statement", Construct::Return),
        ("expression_statement", Construct::Transparent),
        ("parenthesized_expression", Construct::Transparent),
        ("expression_list", Construct::Transparent),
    ],
    range_callees: &[],
};
