//! Error types.
//!
//! Only construction can fail with an `Err`. Rule violations travel as
//! [`Verdict::Reject`](crate::handlers::Verdict) and collaborator failures
//! are converted by the handler that hit them, so neither ever reaches
//! the evaluator as an error.

/// Pipeline assembled incorrectly. Always raised before evaluation starts.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// No handlers were supplied and the empty-pipeline policy rejects that.
    #[error("pipeline has no handlers")]
    EmptyPipeline,

    /// Two handlers share a name.
    #[error("handler `{0}` appears more than once")]
    DuplicateHandler(String),

    /// Handler name is not a lower-case identifier.
    #[error("invalid handler name `{0}`")]
    InvalidHandlerName(String),

    /// Pipeline document could not be parsed.
    #[error("invalid pipeline document: {0}")]
    InvalidDocument(#[from] serde_json::Error),

    /// A handler kind needs a collaborator that was not injected.
    #[error("handler kind `{0}` requires a collaborator that was not provided")]
    MissingCollaborator(String),
}

/// Failure of a cache backend invoked by a handler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),

    #[error("cache write rejected for key {key}: {reason}")]
    WriteRejected { key: String, reason: String },
}

/// Crate-level error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("collaborator failure: {0}")]
    Collaborator(#[from] CacheError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
