//! Postorder walk shared by evaluation and event emission.
//!
//! [`walk`] evaluates a tree bottom-up and reports every step to a
//! [`Visitor`]. Plain evaluation is the walk with a visitor that does nothing,
//! so the evaluator and the event emitter cannot disagree on a result.

use std::convert::Infallible;
use std::ops::ControlFlow;

use generational_arena::Index;
use tracing::instrument;

use crate::domain::arena::{ExprNode, ExprTree};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::operator::Operator;

/// One applied operator: `left op right = result`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Computation {
    pub op: Operator,
    pub left: f64,
    pub right: f64,
    pub result: f64,
}

/// Observer of a postorder walk. Returning `Break` stops the walk.
pub trait Visitor {
    type Break;

    /// Called on entry, before any child is walked.
    fn enter(&mut self, _idx: Index, _node: &ExprNode, _depth: usize) -> ControlFlow<Self::Break> {
        ControlFlow::Continue(())
    }

    fn operand(
        &mut self,
        _idx: Index,
        _literal: &str,
        _value: f64,
        _depth: usize,
    ) -> ControlFlow<Self::Break> {
        ControlFlow::Continue(())
    }

    /// Called once both children have produced their values.
    fn operator(
        &mut self,
        _idx: Index,
        _computation: Computation,
        _depth: usize,
    ) -> ControlFlow<Self::Break> {
        ControlFlow::Continue(())
    }
}

macro_rules! propagate {
    ($flow:expr) => {
        if let ControlFlow::Break(reason) = $flow {
            return Ok(ControlFlow::Break(reason));
        }
    };
}

/// Pending work of the walk; children are pushed above their operator.
enum Frame {
    Enter { idx: Index, depth: usize },
    Combine { idx: Index, op: Operator, depth: usize },
}

/// Walks `tree` in postorder, left subtree before right.
///
/// The walk keeps its own frame stack, so tree depth is bounded by memory
/// rather than by the thread stack. An empty tree evaluates to 0 without
/// visiting anything; a child handle that resolves to no node counts as 0.
pub fn walk<V: Visitor>(tree: &ExprTree, visitor: &mut V) -> DomainResult<ControlFlow<V::Break, f64>> {
    let Some(root) = tree.root() else {
        return Ok(ControlFlow::Continue(0.0));
    };
    let mut frames = vec![Frame::Enter { idx: root, depth: 0 }];
    let mut values: Vec<f64> = Vec::new();

    while let Some(frame) = frames.pop() {
        match frame {
            Frame::Enter { idx, depth } => {
                let Some(node) = tree.get_node(idx) else {
                    values.push(0.0);
                    continue;
                };
                propagate!(visitor.enter(idx, node, depth));
                match node {
                    ExprNode::Operand(literal) => {
                        let value = parse_operand(literal)?;
                        propagate!(visitor.operand(idx, literal, value, depth));
                        values.push(value);
                    }
                    ExprNode::Operator { op, left, right } => {
                        frames.push(Frame::Combine { idx, op: *op, depth });
                        frames.push(Frame::Enter { idx: *right, depth: depth + 1 });
                        frames.push(Frame::Enter { idx: *left, depth: depth + 1 });
                    }
                }
            }
            Frame::Combine { idx, op, depth } => {
                // both children pushed exactly one value each
                let right = values.pop().unwrap_or_default();
                let left = values.pop().unwrap_or_default();
                let computation = Computation {
                    op,
                    left,
                    right,
                    result: op.apply(left, right),
                };
                propagate!(visitor.operator(idx, computation, depth));
                values.push(computation.result);
            }
        }
    }
    Ok(ControlFlow::Continue(values.pop().unwrap_or_default()))
}

pub fn parse_operand(literal: &str) -> DomainResult<f64> {
    literal.parse::<f64>().map_err(|_| DomainError::NumericParse {
        literal: literal.to_string(),
    })
}

struct Silent;

impl Visitor for Silent {
    type Break = Infallible;
}

/// Numeric value of the tree; an empty tree is 0.
///
/// # Errors
/// [`DomainError::NumericParse`] when an operand literal is not a number.
#[instrument(level = "debug", skip(tree))]
pub fn evaluate(tree: &ExprTree) -> DomainResult<f64> {
    match walk(tree, &mut Silent)? {
        ControlFlow::Continue(value) => Ok(value),
        ControlFlow::Break(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::builder::TreeBuilder;

    #[derive(Default)]
    struct Budget {
        entered: usize,
        limit: usize,
    }

    impl Visitor for Budget {
        type Break = usize;

        fn enter(&mut self, _idx: Index, _node: &ExprNode, _depth: usize) -> ControlFlow<usize> {
            self.entered += 1;
            if self.entered > self.limit {
                ControlFlow::Break(self.entered)
            } else {
                ControlFlow::Continue(())
            }
        }
    }

    #[test]
    fn test_visitor_break_stops_walk() {
        let tree = TreeBuilder::default().build("1 2 + 3 *").unwrap();
        let mut budget = Budget { limit: 2, ..Default::default() };
        let flow = walk(&tree, &mut budget).unwrap();
        assert_eq!(flow, ControlFlow::Break(3));
    }

    #[test]
    fn test_evaluate_left_before_right() {
        let tree = TreeBuilder::default().build("2 3 ^").unwrap();
        assert_eq!(evaluate(&tree).unwrap(), 8.0);
        let tree = TreeBuilder::default().build("9 3 /").unwrap();
        assert_eq!(evaluate(&tree).unwrap(), 3.0);
    }

    #[derive(Default)]
    struct Recorder {
        trail: Vec<String>,
    }

    impl Visitor for Recorder {
        type Break = Infallible;

        fn enter(&mut self, _idx: Index, node: &ExprNode, depth: usize) -> ControlFlow<Infallible> {
            self.trail.push(format!("enter {node}@{depth}"));
            ControlFlow::Continue(())
        }

        fn operand(&mut self, _idx: Index, literal: &str, _value: f64, depth: usize) -> ControlFlow<Infallible> {
            self.trail.push(format!("operand {literal}@{depth}"));
            ControlFlow::Continue(())
        }

        fn operator(&mut self, _idx: Index, c: Computation, depth: usize) -> ControlFlow<Infallible> {
            self.trail.push(format!("operator {}={}@{depth}", c.op, c.result));
            ControlFlow::Continue(())
        }
    }

    #[test]
    fn test_hooks_fire_in_postorder_with_depth() {
        let tree = TreeBuilder::default().build("1 2 - 3 *").unwrap();
        let mut recorder = Recorder::default();
        assert_eq!(walk(&tree, &mut recorder).unwrap(), ControlFlow::Continue(-3.0));
        assert_eq!(
            recorder.trail,
            vec![
                "enter *@0",
                "enter -@1",
                "enter 1@2",
                "operand 1@2",
                "enter 2@2",
                "operand 2@2",
                "operator -=-1@1",
                "enter 3@1",
                "operand 3@1",
                "operator *=-3@0",
            ]
        );
    }

    #[test]
    fn test_bad_literal_is_numeric_parse_fault() {
        let tree = TreeBuilder::default().build("1.2.3 1 +").unwrap();
        assert_eq!(
            evaluate(&tree),
            Err(DomainError::NumericParse {
                literal: "1.2.3".into()
            })
        );
    }
}
