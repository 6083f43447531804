//! Tests for TreeBuilder and the tree printer

use rstest::rstest;

use exprtree::domain::{
    render, Converter, DomainError, ExprNode, Mode, Operator, TreeBuilder,
};

fn build(infix: &str) -> exprtree::domain::ExprTree {
    let postfix = Converter::default().convert(infix).unwrap();
    TreeBuilder::default().build_from_postfix(&postfix).unwrap()
}

// ============================================================
// Shape
// ============================================================

#[test]
fn given_single_number_when_building_then_one_leaf_tree() {
    let tree = build("42");

    assert_eq!(tree.len(), 1);
    assert_eq!(tree.depth(), 1);
    let root = tree.get_node(tree.root().unwrap()).unwrap();
    assert_eq!(root, &ExprNode::Operand("42".into()));
    assert!(!root.is_operator());
}

#[test]
fn given_empty_postfix_when_building_then_tree_is_empty() {
    let tree = TreeBuilder::default().build("").unwrap();
    assert!(tree.is_empty());
    assert!(tree.root().is_none());
    assert_eq!(tree.len(), 0);
}

#[test]
fn given_expression_when_building_then_operators_have_two_children_and_leaves_none() {
    let tree = build("((15/(7-(1+1)))*3)-(2+(1+1))");

    for (_, node) in tree.iter() {
        match node {
            ExprNode::Operator { left, right, .. } => {
                assert!(tree.get_node(*left).is_some());
                assert!(tree.get_node(*right).is_some());
            }
            ExprNode::Operand(literal) => assert!(literal.parse::<f64>().is_ok()),
        }
    }
    assert_eq!(tree.len(), 15);
}

#[test]
fn given_precedence_when_building_then_root_is_lowest_operator() {
    let tree = build("10+20*30/2");

    let root = tree.get_node(tree.root().unwrap()).unwrap();
    match root {
        ExprNode::Operator { op, left, right } => {
            assert_eq!(*op, Operator::Add);
            assert_eq!(tree.get_node(*left), Some(&ExprNode::Operand("10".into())));
            assert!(tree.get_node(*right).unwrap().is_operator());
        }
        other => panic!("expected operator root, got {:?}", other),
    }
    assert_eq!(tree.leaf_values(), vec!["10", "20", "30", "2"]);
}

#[rstest]
#[case("(3+5)*(2-8)")]
#[case("2^3+5*4")]
#[case("1.5")]
#[case("")]
fn given_same_input_twice_when_building_then_postorder_values_identical(#[case] infix: &str) {
    let first = build(infix);
    let second = build(infix);
    assert_eq!(first.postorder_values(), second.postorder_values());
}

#[rstest]
#[case("3 5 + 2 8 - *")]
#[case("2 3 ^ 5 4 * +")]
fn given_postfix_when_building_then_postorder_reproduces_it(#[case] postfix: &str) {
    let tree = TreeBuilder::default().build(postfix).unwrap();
    assert_eq!(tree.postorder_values().join(" "), postfix);
}

// ============================================================
// Malformed structure
// ============================================================

#[rstest]
#[case("+", '+', 0, 0)]
#[case("1 +", '+', 1, 1)]
#[case("1 2 + *", '*', 3, 1)]
#[case("4 ^", '^', 1, 1)]
fn given_operator_without_two_operands_when_building_then_malformed_structure(
    #[case] postfix: &str,
    #[case] operator: char,
    #[case] position: usize,
    #[case] available: usize,
) {
    let result = TreeBuilder::default().build(postfix);
    assert_eq!(
        result.unwrap_err(),
        DomainError::MalformedStructure {
            operator,
            position,
            available
        }
    );
}

#[test]
fn given_infix_with_missing_operand_when_building_then_malformed_structure() {
    let postfix = Converter::default().convert("3+").unwrap();
    let err = TreeBuilder::default().build_from_postfix(&postfix).unwrap_err();
    assert!(matches!(err, DomainError::MalformedStructure { .. }));
    assert!(err.to_string().contains("needs 2"));
}

#[test]
fn given_dangling_operands_when_building_strictly_then_rejected() {
    let result = TreeBuilder::new(Mode::Strict).build("3 4");
    assert_eq!(result.unwrap_err(), DomainError::DanglingOperands { count: 2 });
}

// ============================================================
// Printer
// ============================================================

#[test]
fn given_tree_when_rendering_then_children_indented_under_parent() {
    let tree = build("(3+5)*(2-8)");
    let rendered = render(&tree);
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines.len(), 7);
    assert_eq!(lines[0], "*");
    assert_eq!(lines[1], "├── +");
    assert_eq!(lines[2], "│   ├── 3");
    assert_eq!(lines[3], "│   └── 5");
    assert_eq!(lines[4], "└── -");
    assert_eq!(lines[5], "    ├── 2");
    assert_eq!(lines[6], "    └── 8");
}
