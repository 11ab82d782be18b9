//! Structured logging utilities.
//!
//! Provides context-aware logging with eval and handler ids included
//! in every log message.

use std::fmt;

/// Logging context for one evaluation.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub evaluation_id: String,
    pub handler: Option<String>,
}

impl LogContext {
    pub fn new(evaluation_id: &str) -> Self {
        Self {
            evaluation_id: evaluation_id.to_string(),
            handler: None,
        }
    }

    pub fn with_handler(&self, handler: &str) -> Self {
        Self {
            evaluation_id: self.evaluation_id.clone(),
            handler: Some(handler.to_string()),
        }
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.handler {
            Some(name) => write!(f, "[eval={}] [handler={}]", self.evaluation_id, name),
            None => write!(f, "[eval={}]", self.evaluation_id),
        }
    }
}

/// Render `key=value` pairs for the logging macros.
#[doc(hidden)]
pub fn render_fields(pairs: &[(&str, &dyn fmt::Debug)]) -> String {
    let mut out = String::new();
    for (key, value) in pairs {
        out.push_str(&format!(" {}={:?}", key, value));
    }
    out
}

/// Log an info message with context.
#[macro_export]
macro_rules! log_info {
    ($ctx:expr, $event:expr $(, $key:ident = $value:expr)* $(,)?) => {
        log::info!(
            "{} {}{}",
            $ctx,
            $event,
            $crate::logging::render_fields(&[
                $((stringify!($key), &$value as &dyn ::std::fmt::Debug)),*
            ])
        );
    };
}

/// Log a warning message with context.
#[macro_export]
macro_rules! log_warn {
    ($ctx:expr, $event:expr $(, $key:ident = $value:expr)* $(,)?) => {
        log::warn!(
            "{} {}{}",
            $ctx,
            $event,
            $crate::logging::render_fields(&[
                $((stringify!($key), &$value as &dyn ::std::fmt::Debug)),*
            ])
        );
    };
}

/// Log a debug message with context.
#[macro_export]
macro_rules! log_debug {
    ($ctx:expr, $event:expr $(, $key:ident = $value:expr)* $(,)?) => {
        log::debug!(
            "{} {}{}",
            $ctx,
            $event,
            $crate::logging::render_fields(&[
                $((stringify!($key), &$value as &dyn ::std::fmt::Debug)),*
            ])
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_context_display() {
        let ctx = LogContext::new("eval-123");
        assert_eq!(format!("{}", ctx), "[eval=eval-123]");

        let with_handler = ctx.with_handler("authenticated");
        assert_eq!(
            format!("{}", with_handler),
            "[eval=eval-123] [handler=authenticated]"
        );
    }

    #[test]
    fn test_render_fields() {
        let reason = "user is not authenticated";
        let index = 2usize;
        assert_eq!(
            render_fields(&[("index", &index), ("reason", &reason)]),
            r#" index=2 reason="user is not authenticated""#
        );
        assert_eq!(render_fields(&[]), "");
    }
}
