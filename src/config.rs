//! Pipeline documents.
//!
//! A pipeline can be described as JSON and built against injected
//! collaborators:
//!
//! ```json
//! {
//!   "empty_policy": "reject",
//!   "collaborator_policy": "fail_closed",
//!   "handlers": [
//!     { "kind": "require_flag", "name": "authenticated", "field": "authenticated",
//!       "reason": "user is not authenticated" },
//!     { "kind": "mark_cached" },
//!     { "kind": "always_succeed", "name": "place_order" }
//!   ]
//! }
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cache::CacheBackend;
use crate::error::ConfigurationError;
use crate::handlers::{AlwaysSucceed, CollaboratorPolicy, Handler, MarkCached, RequireFlag};
use crate::pipeline::{EmptyPipelinePolicy, Pipeline, PipelineBuilder};
use crate::record::fields;

/// One handler entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HandlerSpec {
    RequireFlag {
        /// Defaults to the field name.
        #[serde(default)]
        name: Option<String>,
        field: String,
        #[serde(default)]
        reason: Option<String>,
    },
    MarkCached {
        #[serde(default)]
        name: Option<String>,
        /// Overrides the document-wide collaborator policy.
        #[serde(default)]
        policy: Option<CollaboratorPolicy>,
    },
    AlwaysSucceed {
        #[serde(default = "default_terminal_name")]
        name: String,
    },
}

fn default_terminal_name() -> String {
    "place_order".to_string()
}

/// Whole pipeline document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub empty_policy: EmptyPipelinePolicy,
    #[serde(default)]
    pub collaborator_policy: CollaboratorPolicy,
    #[serde(default)]
    pub handlers: Vec<HandlerSpec>,
}

/// External services handed to handlers at build time.
#[derive(Clone, Default)]
pub struct Collaborators {
    pub cache: Option<Arc<dyn CacheBackend>>,
}

impl Collaborators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache(mut self, cache: Arc<dyn CacheBackend>) -> Self {
        self.cache = Some(cache);
        self
    }
}

impl PipelineConfig {
    pub fn from_json(document: &str) -> Result<Self, ConfigurationError> {
        Ok(serde_json::from_str(document)?)
    }

    /// The standard order gate:
    /// `authenticated -> authorized -> valid -> mark_cached -> place_order`.
    pub fn order_gate() -> Self {
        let flag = |field: &str, reason: &str| HandlerSpec::RequireFlag {
            name: None,
            field: field.to_string(),
            reason: Some(reason.to_string()),
        };

        Self {
            empty_policy: EmptyPipelinePolicy::Reject,
            collaborator_policy: CollaboratorPolicy::FailClosed,
            handlers: vec![
                flag(fields::AUTHENTICATED, "user is not authenticated"),
                flag(fields::AUTHORIZED, "user is not authorized"),
                flag(fields::VALID, "order is invalid"),
                HandlerSpec::MarkCached {
                    name: None,
                    policy: None,
                },
                HandlerSpec::AlwaysSucceed {
                    name: default_terminal_name(),
                },
            ],
        }
    }

    pub fn build(&self, collaborators: &Collaborators) -> Result<Pipeline, ConfigurationError> {
        let mut builder = PipelineBuilder::new().empty_policy(self.empty_policy);

        for spec in &self.handlers {
            let handler: Arc<dyn Handler> = match spec {
                HandlerSpec::RequireFlag {
                    name,
                    field,
                    reason,
                } => Arc::new(RequireFlag::new(
                    name.clone().unwrap_or_else(|| field.clone()),
                    field.clone(),
                    reason
                        .clone()
                        .unwrap_or_else(|| format!("{} is not set", field)),
                )),
                HandlerSpec::MarkCached { name, policy } => {
                    let cache = collaborators.cache.clone().ok_or_else(|| {
                        ConfigurationError::MissingCollaborator("mark_cached".into())
                    })?;
                    let mut handler = MarkCached::new(cache)
                        .with_policy(policy.unwrap_or(self.collaborator_policy));
                    if let Some(name) = name {
                        handler = handler.with_name(name.clone());
                    }
                    Arc::new(handler)
                }
                HandlerSpec::AlwaysSucceed { name } => Arc::new(AlwaysSucceed::new(name.clone())),
            };
            builder = builder.then_shared(handler);
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCache;

    #[test]
    fn test_parse_document() {
        let config = PipelineConfig::from_json(
            r#"{
                "collaborator_policy": "fail_open",
                "handlers": [
                    { "kind": "require_flag", "field": "authenticated" },
                    { "kind": "mark_cached", "policy": "fail_closed" },
                    { "kind": "always_succeed" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.empty_policy, EmptyPipelinePolicy::Reject);
        assert_eq!(config.collaborator_policy, CollaboratorPolicy::FailOpen);
        assert_eq!(config.handlers.len(), 3);
        assert_eq!(
            config.handlers[2],
            HandlerSpec::AlwaysSucceed {
                name: "place_order".into()
            }
        );
    }

    #[test]
    fn test_invalid_document() {
        let err = PipelineConfig::from_json(r#"{"handlers": [{"kind": "teleport"}]}"#).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidDocument(_)));
    }

    #[test]
    fn test_build_order_gate() {
        let collaborators = Collaborators::new().with_cache(Arc::new(InMemoryCache::new()));
        let pipeline = PipelineConfig::order_gate().build(&collaborators).unwrap();
        assert_eq!(
            pipeline.handler_names(),
            vec!["authenticated", "authorized", "valid", "mark_cached", "place_order"]
        );
    }

    #[test]
    fn test_mark_cached_requires_cache() {
        let err = PipelineConfig::order_gate()
            .build(&Collaborators::new())
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::MissingCollaborator(ref k) if k == "mark_cached"
        ));
    }

    #[test]
    fn test_empty_document_follows_policy() {
        let err = PipelineConfig::default().build(&Collaborators::new()).unwrap_err();
        assert!(matches!(err, ConfigurationError::EmptyPipeline));

        let allowed = PipelineConfig::from_json(r#"{"empty_policy": "allow"}"#)
            .unwrap()
            .build(&Collaborators::new())
            .unwrap();
        assert!(allowed.is_empty());
    }

    #[test]
    fn test_default_reason_uses_field() {
        let config = PipelineConfig::from_json(
            r#"{"handlers": [{"kind": "require_flag", "name": "paid", "field": "payment_ok"}]}"#,
        )
        .unwrap();
        let pipeline = config.build(&Collaborators::new()).unwrap();
        let mut record = crate::record::Record::new();
        let ctx = crate::logging::LogContext::new("eval-test");
        let verdict = pipeline.handlers()[0].check(&mut record, &ctx);
        assert_eq!(verdict.reason(), Some("payment_ok is not set"));
    }
}
