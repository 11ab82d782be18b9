//! Pipeline evaluation.
//!
//! Runs handlers strictly in construction order against one record:
//! 1. Emit `Started`
//! 2. For each handler: `check`; on pass continue, on reject stop
//! 3. Emit `Completed` and return the boolean result
//!
//! A rejected handler is the last one to run. Mutations made by the
//! handlers that passed before it stay on the record.

use std::sync::Arc;

use serde::Serialize;

use crate::events::{EvaluationEvent, EventSink, LogSink};
use crate::handlers::{RuleViolation, Verdict};
use crate::record::Record;

use super::builder::Pipeline;
use super::context::EvaluationContext;

/// Position of one evaluation call.
///
/// `Pending -> Running(i) -> Succeeded | Failed(i)`. Terminal states are
/// sticky; there are no backward transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "index", rename_all = "snake_case")]
pub enum EvaluationState {
    Pending,
    Running(usize),
    Succeeded,
    Failed(usize),
}

impl EvaluationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, EvaluationState::Succeeded | EvaluationState::Failed(_))
    }

    /// Leave `Pending` for a pipeline of `len` handlers.
    pub fn start(self, len: usize) -> Self {
        match self {
            EvaluationState::Pending if len == 0 => EvaluationState::Succeeded,
            EvaluationState::Pending => EvaluationState::Running(0),
            other => other,
        }
    }

    /// Apply the verdict of the running handler.
    pub fn advance(self, passed: bool, len: usize) -> Self {
        match self {
            EvaluationState::Running(i) if !passed => EvaluationState::Failed(i),
            EvaluationState::Running(i) if i + 1 >= len => EvaluationState::Succeeded,
            EvaluationState::Running(i) => EvaluationState::Running(i + 1),
            other => other,
        }
    }
}

/// Diagnostic view of one evaluation. `passed` is the authoritative result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationOutcome {
    pub evaluation_id: String,
    pub passed: bool,
    /// Handlers that ran, in order. Includes the rejecting one.
    pub executed: Vec<String>,
    pub rejection: Option<RuleViolation>,
    pub state: EvaluationState,
}

impl EvaluationOutcome {
    /// Name of the handler that stopped evaluation.
    pub fn stopped_at(&self) -> Option<&str> {
        self.rejection.as_ref().map(|r| r.handler.as_str())
    }
}

/// Evaluates pipelines and reports progress to an [`EventSink`].
#[derive(Clone)]
pub struct PipelineEvaluator {
    sink: Arc<dyn EventSink>,
}

impl Default for PipelineEvaluator {
    fn default() -> Self {
        Self {
            sink: Arc::new(LogSink),
        }
    }
}

impl PipelineEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }

    /// Evaluate `pipeline` against `record`; `true` iff every handler passed.
    pub fn evaluate(&self, pipeline: &Pipeline, record: &mut Record) -> bool {
        self.evaluate_detailed(pipeline, record).passed
    }

    pub fn evaluate_detailed(
        &self,
        pipeline: &Pipeline,
        record: &mut Record,
    ) -> EvaluationOutcome {
        let ctx = EvaluationContext::new();
        let len = pipeline.len();

        self.sink.emit(&EvaluationEvent::Started {
            evaluation_id: ctx.evaluation_id.clone(),
            handler_count: len,
        });

        let mut state = EvaluationState::Pending.start(len);
        let mut executed = Vec::with_capacity(len);
        let mut rejection = None;

        while let EvaluationState::Running(index) = state {
            let handler = &pipeline.handlers()[index];
            let name = handler.name();
            executed.push(name.to_string());

            let verdict = handler.check(record, &ctx.handler_context(name));
            match &verdict {
                Verdict::Pass => {
                    self.sink.emit(&EvaluationEvent::HandlerPassed {
                        evaluation_id: ctx.evaluation_id.clone(),
                        index,
                        handler: name.to_string(),
                    });
                }
                Verdict::Reject { reason } => {
                    self.sink.emit(&EvaluationEvent::HandlerRejected {
                        evaluation_id: ctx.evaluation_id.clone(),
                        index,
                        handler: name.to_string(),
                        reason: reason.clone(),
                    });
                    rejection = Some(RuleViolation {
                        handler: name.to_string(),
                        reason: reason.clone(),
                    });
                }
            }

            state = state.advance(verdict.is_pass(), len);
        }

        let passed = state == EvaluationState::Succeeded;

        self.sink.emit(&EvaluationEvent::Completed {
            evaluation_id: ctx.evaluation_id.clone(),
            passed,
            executed: executed.len(),
        });
        log::trace!(
            "{} EVALUATION_TIMING elapsed_ms={}",
            ctx.log_context(),
            ctx.elapsed_ms()
        );

        EvaluationOutcome {
            evaluation_id: ctx.evaluation_id,
            passed,
            executed,
            rejection,
            state,
        }
    }
}

/// Evaluate with the default logging evaluator.
pub fn evaluate(pipeline: &Pipeline, record: &mut Record) -> bool {
    PipelineEvaluator::default().evaluate(pipeline, record)
}
