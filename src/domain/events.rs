//! Traversal events for step-by-step evaluation.
//!
//! The emitter reports every node of a postorder walk: a `Visit` on entry,
//! then `Resolved` for an operand or, once both children are done, `Computed`
//! for an operator. Events are produced synchronously and carry no timing;
//! pacing belongs to the consumer (see `application::services::Player`).

use std::fmt;
use std::ops::ControlFlow;

use generational_arena::Index;
use tracing::{instrument, trace};

use crate::domain::arena::{ExprNode, ExprTree};
use crate::domain::error::DomainResult;
use crate::domain::walk::{walk, Computation, Visitor};

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    Visit { value: String },
    Resolved { value: String, number: f64 },
    Computed(Computation),
}

/// One step of a postorder evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct TraversalEvent {
    /// Node the event refers to, for highlighting.
    pub node: Index,
    /// Number of ancestors above the node; the root is 0.
    pub depth: usize,
    pub kind: EventKind,
}

impl TraversalEvent {
    pub fn value(&self) -> String {
        match &self.kind {
            EventKind::Visit { value } | EventKind::Resolved { value, .. } => value.clone(),
            EventKind::Computed(computation) => computation.op.to_string(),
        }
    }
}

impl fmt::Display for TraversalEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indent = "  ".repeat(self.depth);
        match &self.kind {
            EventKind::Visit { value } => write!(f, "{indent}Visiting: {value}"),
            EventKind::Resolved { number, .. } => {
                write!(f, "{indent}  → Operand value: {}", format_number(*number))
            }
            EventKind::Computed(c) => write!(
                f,
                "{indent}  → Computing: {} {} {} = {}",
                format_number(c.left),
                c.op,
                format_number(c.right),
                format_number(c.result)
            ),
        }
    }
}

/// Formats a value the way the step log shows it: plain decimals with at
/// least one fractional digit (`28.0`) for magnitudes in `[1e-3, 1e7)`,
/// otherwise `d.dddE±n` (`1.0E8`, `2.5E-4`). Non-finite values are spelled out.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let sign = if value > 0.0 { "" } else { "-" };
        return format!("{sign}Infinity");
    }
    let magnitude = value.abs();
    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        let plain = value.to_string();
        if plain.contains('.') {
            plain
        } else {
            format!("{plain}.0")
        }
    } else {
        let scientific = format!("{value:e}");
        match scientific.split_once('e') {
            Some((mantissa, exponent)) if mantissa.contains('.') => format!("{mantissa}E{exponent}"),
            Some((mantissa, exponent)) => format!("{mantissa}.0E{exponent}"),
            None => scientific,
        }
    }
}

/// How a streamed traversal ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StreamOutcome {
    Completed(f64),
    Cancelled,
}

struct Forward<F> {
    sink: F,
}

impl<F> Forward<F>
where
    F: FnMut(TraversalEvent) -> ControlFlow<()>,
{
    /// The root's final event is the last one; stopping after it is completion.
    fn deliver_final(&mut self, event: TraversalEvent) -> ControlFlow<()> {
        if event.depth == 0 {
            if (self.sink)(event).is_break() {
                trace!("cancelled after final event");
            }
            ControlFlow::Continue(())
        } else {
            (self.sink)(event)
        }
    }
}

impl<F> Visitor for Forward<F>
where
    F: FnMut(TraversalEvent) -> ControlFlow<()>,
{
    type Break = ();

    fn enter(&mut self, idx: Index, node: &ExprNode, depth: usize) -> ControlFlow<()> {
        (self.sink)(TraversalEvent {
            node: idx,
            depth,
            kind: EventKind::Visit {
                value: node.to_string(),
            },
        })
    }

    fn operand(&mut self, idx: Index, literal: &str, value: f64, depth: usize) -> ControlFlow<()> {
        self.deliver_final(TraversalEvent {
            node: idx,
            depth,
            kind: EventKind::Resolved {
                value: literal.to_string(),
                number: value,
            },
        })
    }

    fn operator(&mut self, idx: Index, computation: Computation, depth: usize) -> ControlFlow<()> {
        self.deliver_final(TraversalEvent {
            node: idx,
            depth,
            kind: EventKind::Computed(computation),
        })
    }
}

/// Pushes events to `sink` one at a time, in order.
///
/// The sink cancels by returning `ControlFlow::Break`; events already
/// delivered stand. A fault (unparseable operand) ends the stream with an
/// error after the events preceding it were delivered.
#[instrument(level = "debug", skip_all)]
pub fn stream<F>(tree: &ExprTree, sink: F) -> DomainResult<StreamOutcome>
where
    F: FnMut(TraversalEvent) -> ControlFlow<()>,
{
    let mut forward = Forward { sink };
    Ok(match walk(tree, &mut forward)? {
        ControlFlow::Continue(result) => StreamOutcome::Completed(result),
        ControlFlow::Break(()) => StreamOutcome::Cancelled,
    })
}

/// The complete event sequence for `tree`.
pub fn emit(tree: &ExprTree) -> DomainResult<Vec<TraversalEvent>> {
    let mut events = Vec::new();
    stream(tree, |event| {
        events.push(event);
        ControlFlow::Continue(())
    })?;
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::builder::TreeBuilder;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(28.0), "28.0");
        assert_eq!(format_number(-6.0), "-6.0");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(0.0), "0.0");
        assert_eq!(format_number(-0.0), "-0.0");
    }

    #[test]
    fn test_format_number_switches_to_exponent_form_outside_plain_range() {
        assert_eq!(format_number(0.001), "0.001");
        assert_eq!(format_number(9_999_999.0), "9999999.0");
        assert_eq!(format_number(1e7), "1.0E7");
        assert_eq!(format_number(1e8), "1.0E8");
        assert_eq!(format_number(1e15), "1.0E15");
        assert_eq!(format_number(-1.5e20), "-1.5E20");
        assert_eq!(format_number(1e-4), "1.0E-4");
        assert_eq!(format_number(2.5e-7), "2.5E-7");
    }

    #[test]
    fn test_event_lines_are_indented_by_depth() {
        let tree = TreeBuilder::default().build("3 5 +").unwrap();
        let lines: Vec<String> = emit(&tree).unwrap().iter().map(|e| e.to_string()).collect();
        assert_eq!(
            lines,
            vec![
                "Visiting: +",
                "  Visiting: 3",
                "    → Operand value: 3.0",
                "  Visiting: 5",
                "    → Operand value: 5.0",
                "  → Computing: 3.0 + 5.0 = 8.0",
            ]
        );
    }

    #[test]
    fn test_cancel_on_final_event_completes() {
        let tree = TreeBuilder::default().build("3 5 +").unwrap();
        let outcome = stream(&tree, |event| {
            if matches!(event.kind, EventKind::Computed(_)) {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .unwrap();
        assert_eq!(outcome, StreamOutcome::Completed(8.0));
    }
}
