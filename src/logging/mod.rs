//! Structured logging with evaluation context.
//!
//! Provides logging macros and utilities that include the evaluation id
//! and, where relevant, the handler name in every log message.

pub mod structured;

pub use structured::*;
