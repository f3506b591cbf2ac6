use perfscan_isg::{CollectionShape, Language, LiteralKind, LoopKind};

use crate::{Construct, MappingTable};

pub static PYTHON: MappingTable = MappingTable {
    language: Language::Python,
    kinds: &[
        ("module", Construct::Module),
        ("function_definition", Construct::Function),
        ("decorated_definition", Construct::Decorated),
        ("block", Construct::Block),
        ("for_statement", Construct::Loop(LoopKind::ForEach)),
        ("while_statement", Construct::Loop(LoopKind::While)),
        ("list_comprehension", Construct::Comprehension),
        ("set_comprehension", Construct::Comprehension),
        ("dictionary_comprehension", Construct::Comprehension),
        ("generator_expression", Construct::Comprehension),
        ("call", Construct::Call),
        ("attribute", Construct::Member),
        ("subscript", Construct::Index),
        ("assignment", Construct::Assign),
        ("augmented_assignment", Construct::Assign),
        ("binary_operator", Construct::Binary),
        ("comparison_operator", Construct::Binary),
        ("boolean_operator", Construct::Binary),
        ("identifier", Construct::Identifier),
        ("string", Construct::Literal(LiteralKind::String)),
        ("concatenated_string", Construct::Literal(LiteralKind::String)),
        ("integer", Construct::Literal(LiteralKind::Number)),
        ("float", Construct::Literal(LiteralKind::Number)),
        ("true", Construct::Literal(LiteralKind::Bool)),
        ("false", Construct::Literal(LiteralKind::Bool)),
        ("none", Construct::Literal(LiteralKind::Null)),
        ("list", Construct::Collection(CollectionShape::List)),
        ("tuple", Construct::Collection(CollectionShape::List)),
        ("dictionary", Construct::Collection(CollectionShape::Map)),
        ("set", Construct::Collection(CollectionShape::Set)),
        ("lambda", Construct::Closure),
        ("if_statement", Construct::Conditional),
        ("conditional_expression", Construct::Conditional),
        ("return_statement", Construct::Return),
        ("await", Construct::Await),
        ("expression_statement", Construct::Transparent),
        ("parenthesized_expression", Construct::Transparent),
    ],
    range_callees: &["range", "xrange"],
};
