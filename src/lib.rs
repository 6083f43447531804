//! Arithmetic expression trees.
//!
//! Converts infix text to postfix with the shunting-yard algorithm, builds a
//! binary expression tree, evaluates it and emits the ordered postorder
//! traversal events that drive a step-by-step evaluation display.
//!
//! ```
//! use exprtree::application::services::ExpressionService;
//!
//! let analysis = ExpressionService::default().analyze("2^3+5*4").unwrap();
//! assert_eq!(analysis.postfix.to_string(), "2 3 ^ 5 4 * +");
//! assert_eq!(analysis.result, 28.0);
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;
