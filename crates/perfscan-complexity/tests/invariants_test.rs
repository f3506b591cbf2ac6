//! Property tests over generated ISG shapes

use perfscan_complexity::{estimate, ComplexityClass};
use perfscan_isg::{
    Budget, CallNode, Isg, IsgNode, Language, LoopBound, LoopKind, LoopNode, NodeId, NodeKind, Role, Span,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct Shape {
    kind: NodeKind,
    role: Role,
    children: Vec<Shape>,
}

fn straight_line_kind() -> impl Strategy<Value = NodeKind> {
    prop_oneof![
        Just(NodeKind::Block),
        Just(NodeKind::Conditional),
        Just(NodeKind::Return),
        Just(NodeKind::Await),
        "[a-z]{1,6}".prop_map(NodeKind::Identifier),
        "[a-z]{1,6}".prop_map(|callee| NodeKind::Call(CallNode {
            callee,
            receiver: None,
            arg_count: 0,
            constructs: false,
        })),
    ]
}

/// Trees with no loops and no functions
fn straight_line() -> impl Strategy<Value = Shape> {
    let leaf = straight_line_kind().prop_map(|kind| Shape {
        kind,
        role: Role::Item,
        children: vec![],
    });
    leaf.prop_recursive(4, 48, 4, |inner| {
        (straight_line_kind(), prop::collection::vec(inner, 0..4)).prop_map(|(kind, children)| Shape {
            kind,
            role: Role::Item,
            children,
        })
    })
}

fn input_loop(body: Vec<Shape>) -> Shape {
    Shape {
        kind: NodeKind::Loop(LoopNode {
            loop_kind: LoopKind::ForEach,
            binding: Some("x".into()),
            iterable: Some("xs".into()),
            bound: LoopBound::Input,
        }),
        role: Role::Item,
        children: body
            .into_iter()
            .map(|mut s| {
                s.role = Role::Body;
                s
            })
            .collect(),
    }
}

/// Number ids densely in pre-order, as the adapter does
fn build(shape: &Shape, next: &mut u32) -> IsgNode {
    let id = NodeId(*next);
    *next += 1;
    let children = shape.children.iter().map(|c| build(c, next)).collect();
    IsgNode {
        id,
        kind: shape.kind.clone(),
        role: shape.role,
        span: Span::dummy(),
        children,
    }
}

fn module_of(items: Vec<Shape>) -> Isg {
    let module = Shape {
        kind: NodeKind::Module,
        role: Role::Item,
        children: items,
    };
    Isg::new(Language::Python, build(&module, &mut 0))
}

proptest! {
    #[test]
    fn loop_free_scopes_are_constant(items in prop::collection::vec(straight_line(), 0..6)) {
        let isg = module_of(items);
        let result = estimate(&isg.index(), Budget::unlimited());
        prop_assert!(result.complete);
        for scope in &result.scopes {
            prop_assert_eq!(scope.class, ComplexityClass::Constant);
        }
    }

    #[test]
    fn sequential_loops_are_never_quadratic(bodies in prop::collection::vec(straight_line(), 1..6)) {
        let loops: Vec<Shape> = bodies.into_iter().map(|b| input_loop(vec![b])).collect();
        let isg = module_of(loops);
        let result = estimate(&isg.index(), Budget::unlimited());
        prop_assert_eq!(result.scopes[0].class, ComplexityClass::Linear);
    }

    #[test]
    fn nesting_depth_is_the_degree(depth in 1u32..6) {
        let mut shape = input_loop(vec![]);
        for _ in 1..depth {
            shape = input_loop(vec![shape]);
        }
        let isg = module_of(vec![shape]);
        let class = estimate(&isg.index(), Budget::unlimited()).scopes[0].class;
        let expected = match depth {
            1 => ComplexityClass::Linear,
            2 => ComplexityClass::Quadratic,
            d => ComplexityClass::Polynomial(d),
        };
        prop_assert_eq!(class, expected);
    }

    #[test]
    fn estimation_is_deterministic(items in prop::collection::vec(straight_line(), 0..4), depth in 0u32..4) {
        let mut shapes = items;
        for _ in 0..depth {
            shapes = vec![input_loop(shapes)];
        }
        let isg = module_of(shapes);
        let first = estimate(&isg.index(), Budget::unlimited());
        let second = estimate(&isg.index(), Budget::unlimited());
        prop_assert_eq!(first, second);
    }
}
