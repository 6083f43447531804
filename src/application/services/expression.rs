//! Expression service
//!
//! Runs the full pipeline (convert, build, evaluate) for one infix string and
//! keeps the last successful result for interactive callers.

use tracing::{debug, instrument};

use crate::application::ApplicationResult;
use crate::domain::{
    emit, evaluate, render, Converter, ExprTree, Mode, Postfix, TraversalEvent, TreeBuilder,
};

/// Expressions offered as ready-made samples.
pub const SAMPLE_EXPRESSIONS: [&str; 4] = [
    "(3+5)*(2-8)",
    "2^3+5*4",
    "((15/(7-(1+1)))*3)-(2+(1+1))",
    "10+20*30/2",
];

/// Everything known about one processed expression.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub infix: String,
    pub postfix: Postfix,
    pub tree: ExprTree,
    pub result: f64,
}

impl Analysis {
    pub fn rendered_tree(&self) -> String {
        render(&self.tree)
    }
}

/// Service for processing infix expressions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpressionService {
    converter: Converter,
    builder: TreeBuilder,
}

impl ExpressionService {
    pub fn new(mode: Mode) -> Self {
        Self {
            converter: Converter::new(mode),
            builder: TreeBuilder::new(mode),
        }
    }

    pub fn postfix(&self, infix: &str) -> ApplicationResult<Postfix> {
        Ok(self.converter.convert(infix.trim())?)
    }

    pub fn tree(&self, infix: &str) -> ApplicationResult<ExprTree> {
        let postfix = self.postfix(infix)?;
        Ok(self.builder.build_from_postfix(&postfix)?)
    }

    pub fn evaluate(&self, infix: &str) -> ApplicationResult<f64> {
        Ok(evaluate(&self.tree(infix)?)?)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn analyze(&self, infix: &str) -> ApplicationResult<Analysis> {
        let infix = infix.trim();
        let postfix = self.converter.convert(infix)?;
        let tree = self.builder.build_from_postfix(&postfix)?;
        let result = evaluate(&tree)?;
        debug!("analyze: postfix='{}' nodes={} result={}", postfix, tree.len(), result);
        Ok(Analysis {
            infix: infix.to_string(),
            postfix,
            tree,
            result,
        })
    }

    /// Tree plus its complete traversal event sequence.
    pub fn steps(&self, infix: &str) -> ApplicationResult<(ExprTree, Vec<TraversalEvent>)> {
        let tree = self.tree(infix)?;
        let events = emit(&tree)?;
        Ok((tree, events))
    }
}

/// Retains the most recent successful analysis.
///
/// A failed submission leaves the previous analysis in place.
#[derive(Debug, Default)]
pub struct Session {
    service: ExpressionService,
    current: Option<Analysis>,
}

impl Session {
    pub fn new(service: ExpressionService) -> Self {
        Self {
            service,
            current: None,
        }
    }

    pub fn submit(&mut self, infix: &str) -> ApplicationResult<&Analysis> {
        let analysis = self.service.analyze(infix)?;
        Ok(self.current.insert(analysis))
    }

    pub fn current(&self) -> Option<&Analysis> {
        self.current.as_ref()
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_evaluate() {
        let service = ExpressionService::default();
        let results: Vec<f64> = SAMPLE_EXPRESSIONS
            .iter()
            .map(|e| service.evaluate(e).unwrap())
            .collect();
        assert_eq!(results, vec![-48.0, 28.0, 5.0, 310.0]);
    }

    #[test]
    fn test_analyze_trims_input() {
        let analysis = ExpressionService::default().analyze("  1+2 \n").unwrap();
        assert_eq!(analysis.infix, "1+2");
        assert_eq!(analysis.postfix.to_string(), "1 2 +");
        assert_eq!(analysis.result, 3.0);
    }
}
