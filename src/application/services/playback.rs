//! Paced step-by-step playback
//!
//! A producer thread walks the tree and hands each traversal event over a
//! rendezvous channel; the calling thread waits the configured delay before
//! each node visit and passes the node's result straight after it, one pause
//! per node. Either side stops at the next event boundary once the shared
//! [`CancelToken`] is set.

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{stream, EventKind, ExprTree, StreamOutcome, TraversalEvent};

/// Cooperative cancellation flag, cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackOutcome {
    Completed { result: f64, events: usize },
    Cancelled { events: usize },
}

/// Delivers traversal events with a fixed delay in front of each visited node.
#[derive(Debug, Clone, Copy)]
pub struct Player {
    delay: Duration,
}

impl Player {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Play all events of `tree` into `on_event`.
    ///
    /// # Errors
    /// A domain fault raised during the walk, or a crashed producer thread.
    #[instrument(level = "debug", skip_all, fields(delay_ms = self.delay.as_millis() as u64))]
    pub fn play<F>(
        &self,
        tree: &ExprTree,
        cancel: &CancelToken,
        mut on_event: F,
    ) -> ApplicationResult<PlaybackOutcome>
    where
        F: FnMut(&TraversalEvent),
    {
        let (tx, rx) = mpsc::sync_channel::<TraversalEvent>(0);

        thread::scope(|scope| -> ApplicationResult<PlaybackOutcome> {
            let producer = scope.spawn(move || {
                stream(tree, |event| {
                    if cancel.is_cancelled() {
                        return ControlFlow::Break(());
                    }
                    match tx.send(event) {
                        Ok(()) => ControlFlow::Continue(()),
                        Err(_) => ControlFlow::Break(()),
                    }
                })
            });

            let mut delivered = 0;
            let mut stopped = false;
            for event in rx.iter() {
                if cancel.is_cancelled() {
                    stopped = true;
                    break;
                }
                let paced = matches!(event.kind, EventKind::Visit { .. });
                if paced && !self.delay.is_zero() {
                    thread::sleep(self.delay);
                }
                if cancel.is_cancelled() {
                    stopped = true;
                    break;
                }
                on_event(&event);
                delivered += 1;
            }
            // unblocks a producer waiting in send()
            drop(rx);

            let outcome = producer.join().map_err(|_| ApplicationError::Playback {
                message: "event producer panicked".to_string(),
            })??;
            debug!("playback finished: {:?} after {} events", outcome, delivered);

            Ok(match outcome {
                StreamOutcome::Completed(result) if !stopped => PlaybackOutcome::Completed {
                    result,
                    events: delivered,
                },
                _ => PlaybackOutcome::Cancelled { events: delivered },
            })
        })
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new(Duration::from_millis(crate::config::DEFAULT_STEP_DELAY_MS))
    }
}
