//! Pipeline construction and evaluation.
//!
//! A pipeline is an immutable ordered list of handlers. Evaluation runs
//! them in order against one record and stops at the first rejection.

pub mod builder;
pub mod context;
pub mod evaluator;

pub use builder::*;
pub use context::*;
pub use evaluator::*;
