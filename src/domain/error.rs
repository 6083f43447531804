//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors describe expressions that cannot be turned into a value.
/// Arithmetic edge values (division by zero, NaN powers) are not errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("malformed expression: operator '{operator}' at token {position} has {available} operand(s), needs 2")]
    MalformedStructure {
        operator: char,
        position: usize,
        available: usize,
    },

    #[error("not a number: '{literal}'")]
    NumericParse { literal: String },

    #[error("unbalanced bracket at position {position}")]
    UnbalancedBracket { position: usize },

    #[error("unexpected character '{ch}' at position {position}")]
    UnexpectedCharacter { ch: char, position: usize },

    #[error("malformed expression: {count} operands left without an operator")]
    DanglingOperands { count: usize },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
