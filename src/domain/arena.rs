use std::fmt;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::operator::Operator;

/// Node payload of an expression tree.
///
/// An operator always owns exactly two children, an operand owns none.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprNode {
    /// Literal text of a postfix token, parsed only when evaluated.
    Operand(String),
    Operator {
        op: Operator,
        left: Index,
        right: Index,
    },
}

impl ExprNode {
    pub fn is_operator(&self) -> bool {
        matches!(self, ExprNode::Operator { .. })
    }

    /// `(left, right)` for operators, None for operands.
    pub fn children(&self) -> Option<(Index, Index)> {
        match self {
            ExprNode::Operand(_) => None,
            ExprNode::Operator { left, right, .. } => Some((*left, *right)),
        }
    }
}

impl fmt::Display for ExprNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprNode::Operand(literal) => write!(f, "{}", literal),
            ExprNode::Operator { op, .. } => write!(f, "{}", op),
        }
    }
}

/// Arena-backed binary expression tree.
///
/// Nodes are addressed by generational indices; the tree is built once by
/// [`crate::domain::TreeBuilder`] and read-only afterwards.
#[derive(Debug, Clone)]
pub struct ExprTree {
    arena: Arena<ExprNode>,
    root: Option<Index>,
}

impl Default for ExprTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ExprTree {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    pub(crate) fn insert_operand(&mut self, literal: impl Into<String>) -> Index {
        self.arena.insert(ExprNode::Operand(literal.into()))
    }

    pub(crate) fn insert_operator(&mut self, op: Operator, left: Index, right: Index) -> Index {
        self.arena.insert(ExprNode::Operator { op, left, right })
    }

    pub(crate) fn set_root(&mut self, root: Index) {
        self.root = Some(root);
    }

    /// Removes the subtree rooted at `idx` from the arena.
    pub(crate) fn prune(&mut self, idx: Index) {
        let mut stack = vec![idx];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.arena.remove(current) {
                if let Some((left, right)) = node.children() {
                    stack.push(left);
                    stack.push(right);
                }
            }
        }
    }

    pub fn get_node(&self, idx: Index) -> Option<&ExprNode> {
        self.arena.get(idx)
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }

    /// Node labels in postorder, which is the postfix token order.
    pub fn postorder_values(&self) -> Vec<String> {
        self.iter_postorder().map(|(_, node)| node.to_string()).collect()
    }

    /// Number of levels; a single leaf has depth 1, an empty tree 0.
    #[instrument(level = "trace", skip(self))]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(Index, usize)> = self.root.map(|root| (root, 1)).into_iter().collect();
        while let Some((idx, level)) = stack.pop() {
            if let Some(node) = self.get_node(idx) {
                deepest = deepest.max(level);
                if let Some((left, right)) = node.children() {
                    stack.push((left, level + 1));
                    stack.push((right, level + 1));
                }
            }
        }
        deepest
    }

    /// Operand literals from left to right.
    pub fn leaf_values(&self) -> Vec<String> {
        self.iter()
            .filter_map(|(_, node)| match node {
                ExprNode::Operand(literal) => Some(literal.clone()),
                ExprNode::Operator { .. } => None,
            })
            .collect()
    }
}

/// Preorder (node, left, right) iterator.
pub struct TreeIterator<'a> {
    tree: &'a ExprTree,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a ExprTree) -> Self {
        Self {
            tree,
            stack: tree.root().into_iter().collect(),
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a ExprNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current) {
                // right first so left is popped first
                if let Some((left, right)) = node.children() {
                    self.stack.push(right);
                    self.stack.push(left);
                }
                return Some((current, node));
            }
        }
        None
    }
}

/// Postorder (left, right, node) iterator.
pub struct PostOrderIterator<'a> {
    tree: &'a ExprTree,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(tree: &'a ExprTree) -> Self {
        Self {
            tree,
            stack: tree.root().map(|root| (root, false)).into_iter().collect(),
        }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a ExprNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, expanded)) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current) {
                if expanded {
                    return Some((current, node));
                }
                self.stack.push((current, true));
                if let Some((left, right)) = node.children() {
                    self.stack.push((right, false));
                    self.stack.push((left, false));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // (1 + 2) * 3
    fn sample() -> ExprTree {
        let mut tree = ExprTree::new();
        let one = tree.insert_operand("1");
        let two = tree.insert_operand("2");
        let sum = tree.insert_operator(Operator::Add, one, two);
        let three = tree.insert_operand("3");
        let product = tree.insert_operator(Operator::Mul, sum, three);
        tree.set_root(product);
        tree
    }

    #[test]
    fn test_iterators_order() {
        let tree = sample();
        let preorder: Vec<String> = tree.iter().map(|(_, n)| n.to_string()).collect();
        assert_eq!(preorder, vec!["*", "+", "1", "2", "3"]);
        assert_eq!(tree.postorder_values(), vec!["1", "2", "+", "3", "*"]);
    }

    #[test]
    fn test_depth_and_leaves() {
        let tree = sample();
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.leaf_values(), vec!["1", "2", "3"]);
        assert_eq!(ExprTree::new().depth(), 0);
    }

    #[test]
    fn test_prune_removes_whole_subtree() {
        let mut tree = sample();
        let root = tree.root().unwrap();
        let (sum, _) = tree.get_node(root).unwrap().children().unwrap();
        tree.prune(sum);
        assert_eq!(tree.len(), 2);
        assert!(tree.get_node(sum).is_none());
        assert_eq!(tree.postorder_values(), vec!["3", "*"]);
    }
}
