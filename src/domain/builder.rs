//! Tree builder: postfix tokens to expression tree.

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::domain::arena::ExprTree;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::operator::Operator;
use crate::domain::postfix::{Mode, Postfix};

/// Constructs expression trees from postfix token sequences.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeBuilder {
    mode: Mode,
}

impl TreeBuilder {
    pub fn new(mode: Mode) -> Self {
        Self { mode }
    }

    /// Build a tree from whitespace-separated postfix tokens.
    ///
    /// Every token becomes a node; a token that is one of the five operator
    /// symbols takes the two most recent nodes as (left, right) children.
    /// Empty input yields an empty tree.
    ///
    /// # Errors
    /// * [`DomainError::MalformedStructure`] when an operator finds fewer than two operands
    /// * [`DomainError::DanglingOperands`] in strict mode when more than one node is left over
    #[instrument(level = "debug", skip(self))]
    pub fn build(&self, postfix: &str) -> DomainResult<ExprTree> {
        let mut tree = ExprTree::new();
        let mut stack: Vec<Index> = Vec::new();

        for (position, token) in postfix.split_whitespace().enumerate() {
            let idx = match Operator::from_token(token) {
                Some(op) => {
                    if stack.len() < 2 {
                        return Err(DomainError::MalformedStructure {
                            operator: op.symbol(),
                            position,
                            available: stack.len(),
                        });
                    }
                    let operands = stack.split_off(stack.len() - 2);
                    tree.insert_operator(op, operands[0], operands[1])
                }
                None => tree.insert_operand(token),
            };
            stack.push(idx);
        }

        match stack.len() {
            0 => {}
            1 => tree.set_root(stack[0]),
            count if self.mode == Mode::Strict => {
                return Err(DomainError::DanglingOperands { count })
            }
            count => {
                debug!("{} subtrees left over, keeping the last one as root", count);
                if let Some(root) = stack.pop() {
                    for orphan in stack {
                        tree.prune(orphan);
                    }
                    tree.set_root(root);
                }
            }
        }
        Ok(tree)
    }

    pub fn build_from_postfix(&self, postfix: &Postfix) -> DomainResult<ExprTree> {
        self.build(&postfix.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::arena::ExprNode;

    #[test]
    fn test_first_pop_is_right_child() {
        let tree = TreeBuilder::default().build("8 2 -").unwrap();
        let root = tree.get_node(tree.root().unwrap()).unwrap();
        let (left, right) = root.children().unwrap();
        assert_eq!(tree.get_node(left), Some(&ExprNode::Operand("8".into())));
        assert_eq!(tree.get_node(right), Some(&ExprNode::Operand("2".into())));
    }

    #[test]
    fn test_leftover_operands_keep_last_in_permissive_mode() {
        let tree = TreeBuilder::default().build("3 4").unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.postorder_values(), vec!["4"]);
    }

    #[test]
    fn test_leftover_operands_rejected_in_strict_mode() {
        let err = TreeBuilder::new(Mode::Strict).build("1 2 + 3").unwrap_err();
        assert_eq!(err, DomainError::DanglingOperands { count: 2 });
    }
}
