//! Evaluation context management.
//!
//! Provides the per-evaluation identity used for logging and events.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::logging::structured::LogContext;

/// Context for one evaluation of a pipeline against a record.
#[derive(Debug, Clone)]
pub struct EvaluationContext {
    pub evaluation_id: String,
    pub started_at: DateTime<Utc>,
}

impl Default for EvaluationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl EvaluationContext {
    pub fn new() -> Self {
        let evaluation_id = format!("eval-{}", &Uuid::new_v4().to_string()[..8]);

        Self {
            evaluation_id,
            started_at: Utc::now(),
        }
    }

    pub fn log_context(&self) -> LogContext {
        LogContext::new(&self.evaluation_id)
    }

    /// Log context scoped to one handler.
    pub fn handler_context(&self, handler: &str) -> LogContext {
        self.log_context().with_handler(handler)
    }

    pub fn elapsed_ms(&self) -> i64 {
        (Utc::now() - self.started_at).num_milliseconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluation_ids_are_unique() {
        let a = EvaluationContext::new();
        let b = EvaluationContext::new();
        assert!(a.evaluation_id.starts_with("eval-"));
        assert_eq!(a.evaluation_id.len(), "eval-".len() + 8);
        assert_ne!(a.evaluation_id, b.evaluation_id);
    }

    #[test]
    fn test_handler_context() {
        let ctx = EvaluationContext::new();
        let log_ctx = ctx.handler_context("valid");
        assert_eq!(log_ctx.handler.as_deref(), Some("valid"));
        assert_eq!(log_ctx.evaluation_id, ctx.evaluation_id);
        assert!(ctx.elapsed_ms() >= 0);
    }
}
