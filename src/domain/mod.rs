//! Domain layer: the expression pipeline
//!
//! infix text → [`Converter`] → [`Postfix`] → [`TreeBuilder`] → [`ExprTree`]
//! → {[`evaluate`] | [`emit`]/[`stream`] | [`render`]}.
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod error;
pub mod events;
pub mod operator;
pub mod postfix;
pub mod render;
pub mod walk;

pub use arena::{ExprNode, ExprTree};
pub use builder::TreeBuilder;
pub use error::{DomainError, DomainResult};
pub use events::{emit, format_number, stream, EventKind, StreamOutcome, TraversalEvent};
pub use operator::Operator;
pub use postfix::{tokenize, Converter, Lexeme, Mode, Postfix, Token};
pub use render::{render, TreeConvert, ELIDED_MARKER, MAX_RENDER_DEPTH};
pub use walk::{evaluate, walk, Computation, Visitor};
