//! Built-in handlers for the order gate.
//!
//! `Authenticated? -> Authorized? -> Valid? -> MarkCached -> PlaceOrder`

use std::fmt;
use std::sync::Arc;

use crate::cache::CacheBackend;
use crate::error::CacheError;
use crate::logging::structured::LogContext;
use crate::record::{fields, Record};

use super::{CollaboratorPolicy, Handler, Verdict};

/// Passes iff a boolean field is true.
#[derive(Debug, Clone)]
pub struct RequireFlag {
    name: String,
    field: String,
    reason: String,
}

impl RequireFlag {
    pub fn new(
        name: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }
}

impl Handler for RequireFlag {
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self, record: &mut Record, _ctx: &LogContext) -> Verdict {
        if record.flag(&self.field) {
            Verdict::Pass
        } else {
            Verdict::reject(self.reason.clone())
        }
    }
}

pub fn require_authenticated() -> RequireFlag {
    RequireFlag::new(
        fields::AUTHENTICATED,
        fields::AUTHENTICATED,
        "user is not authenticated",
    )
}

pub fn require_authorized() -> RequireFlag {
    RequireFlag::new(fields::AUTHORIZED, fields::AUTHORIZED, "user is not authorized")
}

pub fn require_valid() -> RequireFlag {
    RequireFlag::new(fields::VALID, fields::VALID, "order is invalid")
}

/// Writes the record digest to the cache and marks the record cached.
///
/// Already-cached records pass without touching the backend. A digest the
/// backend already holds counts as a hit and is not written again. When
/// the backend fails, the outcome depends on the [`CollaboratorPolicy`]:
/// fail-closed rejects with the backend error as the reason, fail-open
/// passes but leaves `cached` unset.
pub struct MarkCached {
    name: String,
    cache: Arc<dyn CacheBackend>,
    policy: CollaboratorPolicy,
}

impl MarkCached {
    pub const DEFAULT_NAME: &'static str = "mark_cached";

    pub fn new(cache: Arc<dyn CacheBackend>) -> Self {
        Self {
            name: Self::DEFAULT_NAME.to_string(),
            cache,
            policy: CollaboratorPolicy::FailClosed,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_policy(mut self, policy: CollaboratorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> CollaboratorPolicy {
        self.policy
    }

    fn write(&self, key: &str, ctx: &LogContext) -> Result<(), CacheError> {
        if self.cache.contains(key)? {
            crate::log_debug!(ctx, "CACHE_HIT", key = key);
            return Ok(());
        }
        self.cache.store(key)?;
        crate::log_debug!(ctx, "CACHE_WRITE", key = key);
        Ok(())
    }
}

impl Handler for MarkCached {
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self, record: &mut Record, ctx: &LogContext) -> Verdict {
        if record.flag(fields::CACHED) {
            crate::log_debug!(ctx, "CACHE_SKIP", reason = "already_cached");
            return Verdict::Pass;
        }

        let key = record.digest();
        match self.write(&key, ctx) {
            Ok(()) => {
                record.set_flag(fields::CACHED, true);
                Verdict::Pass
            }
            Err(e) => match self.policy {
                CollaboratorPolicy::FailClosed => {
                    crate::log_warn!(
                        ctx,
                        "CACHE_WRITE_FAILED",
                        policy = "fail_closed",
                        error = e.to_string(),
                    );
                    Verdict::reject(e.to_string())
                }
                CollaboratorPolicy::FailOpen => {
                    crate::log_warn!(
                        ctx,
                        "CACHE_WRITE_FAILED",
                        policy = "fail_open",
                        error = e.to_string(),
                    );
                    Verdict::Pass
                }
            },
        }
    }
}

impl fmt::Debug for MarkCached {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkCached")
            .field("name", &self.name)
            .field("policy", &self.policy)
            .finish()
    }
}

/// Terminal step: always passes.
#[derive(Debug, Clone)]
pub struct AlwaysSucceed {
    name: String,
}

impl AlwaysSucceed {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The ordering step of the order gate.
    pub fn place_order() -> Self {
        Self::new("place_order")
    }
}

impl Handler for AlwaysSucceed {
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self, _record: &mut Record, ctx: &LogContext) -> Verdict {
        crate::log_info!(ctx, "ORDER_PLACED");
        Verdict::Pass
    }
}
