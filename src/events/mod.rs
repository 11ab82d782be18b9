//! Evaluation events.
//!
//! The evaluator reports what it does to an [`EventSink`]. Sinks observe;
//! they never influence the result.

use parking_lot::Mutex;
use serde::Serialize;

use crate::logging::structured::LogContext;

/// Something that happened during one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EvaluationEvent {
    Started {
        evaluation_id: String,
        handler_count: usize,
    },
    HandlerPassed {
        evaluation_id: String,
        index: usize,
        handler: String,
    },
    HandlerRejected {
        evaluation_id: String,
        index: usize,
        handler: String,
        reason: Option<String>,
    },
    Completed {
        evaluation_id: String,
        passed: bool,
        executed: usize,
    },
}

impl EvaluationEvent {
    pub fn evaluation_id(&self) -> &str {
        match self {
            EvaluationEvent::Started { evaluation_id, .. }
            | EvaluationEvent::HandlerPassed { evaluation_id, .. }
            | EvaluationEvent::HandlerRejected { evaluation_id, .. }
            | EvaluationEvent::Completed { evaluation_id, .. } => evaluation_id,
        }
    }
}

/// Receiver of evaluation events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &EvaluationEvent);
}

/// Writes events through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: &EvaluationEvent) {
        let ctx = LogContext::new(event.evaluation_id());
        match event {
            EvaluationEvent::Started { handler_count, .. } => {
                crate::log_debug!(ctx, "EVALUATION_START", handlers = handler_count);
            }
            EvaluationEvent::HandlerPassed { index, handler, .. } => {
                crate::log_debug!(ctx.with_handler(handler), "HANDLER_PASSED", index = index);
            }
            EvaluationEvent::HandlerRejected {
                index,
                handler,
                reason,
                ..
            } => {
                crate::log_info!(
                    ctx.with_handler(handler),
                    "HANDLER_REJECTED",
                    index = index,
                    reason = reason.as_deref().unwrap_or("unspecified"),
                );
            }
            EvaluationEvent::Completed {
                passed, executed, ..
            } => {
                crate::log_info!(
                    ctx,
                    "EVALUATION_COMPLETE",
                    passed = passed,
                    executed = executed
                );
            }
        }
    }
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<EvaluationEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<EvaluationEvent> {
        self.events.lock().clone()
    }

    /// Names of handlers that passed, in order.
    pub fn passed_handlers(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                EvaluationEvent::HandlerPassed { handler, .. } => Some(handler.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &EvaluationEvent) {
        self.events.lock().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_keeps_order() {
        let sink = RecordingSink::new();
        sink.emit(&EvaluationEvent::Started {
            evaluation_id: "eval-1".into(),
            handler_count: 2,
        });
        sink.emit(&EvaluationEvent::HandlerPassed {
            evaluation_id: "eval-1".into(),
            index: 0,
            handler: "a".into(),
        });
        sink.emit(&EvaluationEvent::HandlerPassed {
            evaluation_id: "eval-1".into(),
            index: 1,
            handler: "b".into(),
        });

        assert_eq!(sink.events().len(), 3);
        assert_eq!(sink.passed_handlers(), vec!["a", "b"]);

        sink.clear();
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_event_json_shape() {
        let event = EvaluationEvent::HandlerRejected {
            evaluation_id: "eval-1".into(),
            index: 2,
            handler: "valid".into(),
            reason: Some("order is invalid".into()),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "handler_rejected");
        assert_eq!(json["handler"], "valid");
        assert_eq!(event.evaluation_id(), "eval-1");
    }

    #[test]
    fn test_log_sink_does_not_panic() {
        LogSink.emit(&EvaluationEvent::Completed {
            evaluation_id: "eval-1".into(),
            passed: true,
            executed: 0,
        });
    }
}
