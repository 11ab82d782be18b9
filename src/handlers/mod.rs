//! Pipeline handlers.
//!
//! A handler is one named check-and-effect step. It reads the record,
//! may write to it when it passes, and reports a [`Verdict`]. Handlers
//! never return errors: failures of anything they call are folded into
//! the verdict according to a [`CollaboratorPolicy`].

pub mod order;

pub use order::*;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::logging::structured::LogContext;
use crate::record::Record;

/// Outcome of a single handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Reject { reason: Option<String> },
}

impl Verdict {
    pub fn reject(reason: impl Into<String>) -> Self {
        Verdict::Reject {
            reason: Some(reason.into()),
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Verdict::Pass => None,
            Verdict::Reject { reason } => reason.as_deref(),
        }
    }
}

impl From<bool> for Verdict {
    fn from(passed: bool) -> Self {
        if passed {
            Verdict::Pass
        } else {
            Verdict::Reject { reason: None }
        }
    }
}

/// A business rule that was not met. Expected and non-fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleViolation {
    pub handler: String,
    pub reason: Option<String>,
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            Some(reason) => write!(f, "{}: {}", self.handler, reason),
            None => write!(f, "{}: rejected", self.handler),
        }
    }
}

/// What a handler does when a collaborator it calls fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollaboratorPolicy {
    /// Reject the record.
    #[default]
    FailClosed,
    /// Log the failure and pass without applying the side effect.
    FailOpen,
}

/// One step of a pipeline.
pub trait Handler: Send + Sync {
    /// Unique name within a pipeline; used in logs and outcomes.
    fn name(&self) -> &str;

    /// Check the record, applying this handler's side effect on success.
    ///
    /// `ctx` identifies the running evaluation and this handler; any log
    /// line the handler writes goes through it.
    fn check(&self, record: &mut Record, ctx: &LogContext) -> Verdict;
}

/// Handler backed by a closure.
pub struct FnHandler<F> {
    name: String,
    check: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&mut Record) -> Verdict + Send + Sync,
{
    pub fn new(name: impl Into<String>, check: F) -> Self {
        Self {
            name: name.into(),
            check,
        }
    }
}

impl<F> Handler for FnHandler<F>
where
    F: Fn(&mut Record) -> Verdict + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self, record: &mut Record, _ctx: &LogContext) -> Verdict {
        (self.check)(record)
    }
}

impl<F> fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler").field("name", &self.name).finish()
    }
}
