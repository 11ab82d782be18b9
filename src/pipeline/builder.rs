//! Pipeline assembly.
//!
//! All structural checks happen here so that a [`Pipeline`] that exists
//! is always well formed: names are valid identifiers, no name appears
//! twice, and emptiness is only possible when explicitly allowed.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::handlers::Handler;

lazy_static! {
    /// Lower-case identifier; dots and dashes allowed after the first char.
    static ref HANDLER_NAME: Regex = Regex::new(r"^[a-z][a-z0-9_.\-]*$").unwrap();
}

/// What an empty handler list means.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyPipelinePolicy {
    /// Refuse to build an empty pipeline.
    #[default]
    Reject,
    /// Build it; evaluating it succeeds (vacuous truth).
    Allow,
}

/// Immutable ordered sequence of handlers.
///
/// Cloning shares the handlers. A pipeline can be evaluated from several
/// threads at once as long as each evaluation has its own record.
#[derive(Clone)]
pub struct Pipeline {
    handlers: Arc<[Arc<dyn Handler>]>,
}

impl Pipeline {
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn handlers(&self) -> &[Arc<dyn Handler>] {
        &self.handlers
    }

    /// Handler names in evaluation order.
    pub fn handler_names(&self) -> Vec<&str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.handlers.iter().position(|h| h.name() == name)
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("handlers", &self.handler_names())
            .finish()
    }
}

/// Collects handlers in evaluation order and validates them on `build`.
#[derive(Default)]
pub struct PipelineBuilder {
    handlers: Vec<Arc<dyn Handler>>,
    empty_policy: EmptyPipelinePolicy,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn empty_policy(mut self, policy: EmptyPipelinePolicy) -> Self {
        self.empty_policy = policy;
        self
    }

    /// Append a handler. Later calls run later.
    pub fn then<H: Handler + 'static>(mut self, handler: H) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    pub fn then_shared(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn extend(mut self, handlers: impl IntoIterator<Item = Arc<dyn Handler>>) -> Self {
        self.handlers.extend(handlers);
        self
    }

    pub fn build(self) -> Result<Pipeline, ConfigurationError> {
        if self.handlers.is_empty() && self.empty_policy == EmptyPipelinePolicy::Reject {
            log::warn!("PIPELINE_BUILD_FAILED reason=empty");
            return Err(ConfigurationError::EmptyPipeline);
        }

        {
            let mut seen = HashSet::with_capacity(self.handlers.len());
            for handler in &self.handlers {
                let name = handler.name();
                if !HANDLER_NAME.is_match(name) {
                    log::warn!("PIPELINE_BUILD_FAILED reason=invalid_name handler={:?}", name);
                    return Err(ConfigurationError::InvalidHandlerName(name.to_string()));
                }
                if !seen.insert(name) {
                    log::warn!("PIPELINE_BUILD_FAILED reason=duplicate handler={}", name);
                    return Err(ConfigurationError::DuplicateHandler(name.to_string()));
                }
            }
        }

        let pipeline = Pipeline {
            handlers: self.handlers.into(),
        };
        log::info!(
            "PIPELINE_BUILT handlers={:?} policy={:?}",
            pipeline.handler_names(),
            self.empty_policy
        );
        Ok(pipeline)
    }
}

/// Build a pipeline from handlers in evaluation order.
///
/// Empty lists are rejected; use [`PipelineBuilder::empty_policy`] to allow them.
pub fn build_pipeline(handlers: Vec<Arc<dyn Handler>>) -> Result<Pipeline, ConfigurationError> {
    PipelineBuilder::new().extend(handlers).build()
}
