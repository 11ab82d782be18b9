//! Orderchain Core - short-circuiting request pipeline evaluator
//!
//! A pipeline is an immutable ordered list of named handlers. Evaluating
//! it against a mutable [`Record`] runs the handlers in order and stops at
//! the first one that rejects. The implementation prioritizes:
//!
//! 1. **Fail-fast** - a rejected handler is the last one to run
//! 2. **Logging** - every decision is emitted as a structured event
//! 3. **Construction-time checks** - a built pipeline is always well formed
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `pipeline` - Builder, evaluator and per-evaluation context
//! - `handlers` - Handler trait and the built-in order gate handlers
//! - `record` - The record under evaluation
//! - `cache` - Cache collaborators used by the caching step
//! - `events` - Evaluation events and sinks
//! - `config` - JSON pipeline documents
//! - `logging` - Structured logging with evaluation context
//!
//! ```
//! use std::sync::Arc;
//! use orderchain_core::cache::InMemoryCache;
//! use orderchain_core::config::{Collaborators, PipelineConfig};
//! use orderchain_core::{evaluate, Record};
//!
//! let collaborators = Collaborators::new().with_cache(Arc::new(InMemoryCache::new()));
//! let pipeline = PipelineConfig::order_gate().build(&collaborators).unwrap();
//!
//! let mut order = Record::order(true, true, true);
//! assert!(evaluate(&pipeline, &mut order));
//! assert!(order.flag("cached"));
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod events;
pub mod handlers;
pub mod logging;
pub mod pipeline;
pub mod record;

pub use error::{CacheError, ConfigurationError, Error, Result};
pub use handlers::{Handler, RuleViolation, Verdict};
pub use pipeline::{
    build_pipeline, evaluate, EvaluationOutcome, Pipeline, PipelineBuilder, PipelineEvaluator,
};
pub use record::Record;

/// Initialize the `env_logger` backend.
///
/// Safe to call repeatedly; only the first call installs the logger.
pub fn init_logger() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp_millis()
        .try_init();
}
