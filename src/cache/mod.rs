//! Cache collaborators.
//!
//! The caching step of an order pipeline talks to a [`CacheBackend`]. The
//! backend is injected into the handler; nothing here is process-global.

pub mod memory;

pub use memory::*;

use crate::error::CacheError;

/// Storage the caching handler writes record digests into.
///
/// Implementations are shared between concurrent evaluations and must do
/// their own locking.
pub trait CacheBackend: Send + Sync {
    /// Whether `key` is already stored.
    fn contains(&self, key: &str) -> Result<bool, CacheError>;

    /// Store `key`. Storing an existing key is not an error.
    fn store(&self, key: &str) -> Result<(), CacheError>;
}
