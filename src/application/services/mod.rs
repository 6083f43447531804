//! Application services
//!
//! Concrete service implementations that orchestrate the domain pipeline.

mod expression;
mod playback;

pub use expression::{Analysis, ExpressionService, Session, SAMPLE_EXPRESSIONS};
pub use playback::{CancelToken, PlaybackOutcome, Player};
