//! Indented text rendering of tree shape, for logs and diagnostics.

use generational_arena::Index;
use termtree::Tree;

use crate::domain::arena::{ExprNode, ExprTree};

/// Label shown for a child handle that does not resolve to a node.
pub const NULL_MARKER: &str = "null";

pub const EMPTY_MARKER: &str = "(empty)";

/// Label standing in for an operator subtree below [`MAX_RENDER_DEPTH`].
pub const ELIDED_MARKER: &str = "...";

/// Deepest level printed in full; deeper operator subtrees are elided.
pub const MAX_RENDER_DEPTH: usize = 512;

pub trait TreeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

enum Step {
    Visit { idx: Index, depth: usize },
    Join { label: String },
}

impl TreeConvert for ExprTree {
    /// Builds the termtree bottom-up from an explicit stack.
    fn to_tree_string(&self) -> Tree<String> {
        let Some(root) = self.root() else {
            return Tree::new(EMPTY_MARKER.to_string());
        };
        let mut steps = vec![Step::Visit { idx: root, depth: 0 }];
        let mut built: Vec<Tree<String>> = Vec::new();

        while let Some(step) = steps.pop() {
            match step {
                Step::Visit { idx, depth } => match self.get_node(idx) {
                    None => built.push(Tree::new(NULL_MARKER.to_string())),
                    Some(node @ ExprNode::Operand(_)) => built.push(Tree::new(node.to_string())),
                    Some(ExprNode::Operator { .. }) if depth >= MAX_RENDER_DEPTH => {
                        built.push(Tree::new(ELIDED_MARKER.to_string()))
                    }
                    Some(node @ ExprNode::Operator { left, right, .. }) => {
                        steps.push(Step::Join {
                            label: node.to_string(),
                        });
                        steps.push(Step::Visit {
                            idx: *right,
                            depth: depth + 1,
                        });
                        steps.push(Step::Visit {
                            idx: *left,
                            depth: depth + 1,
                        });
                    }
                },
                Step::Join { label } => {
                    let right = built.pop();
                    let left = built.pop();
                    built.push(Tree::new(label).with_leaves(left.into_iter().chain(right)));
                }
            }
        }
        built
            .pop()
            .unwrap_or_else(|| Tree::new(EMPTY_MARKER.to_string()))
    }
}

/// Multi-line rendering, one node per line with box-drawing connectors.
pub fn render(tree: &ExprTree) -> String {
    tree.to_tree_string().to_string()
}
