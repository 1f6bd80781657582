//! Error types for the authorization core

use thiserror::Error;

/// Authorization core errors
#[derive(Debug, Error)]
pub enum AuthzError {
    /// Attempted write to a protected runtime role
    #[error("runtime role '{0}' is immutable and cannot be modified")]
    ImmutableRole(String),

    /// Tenant or role named by a write does not exist or is not accessible
    #[error("not found: {0}")]
    NotFound(String),

    /// Underlying content-repository fault during a read or write
    #[error("repository access failed: {0}")]
    RepositoryAccess(String),

    /// Invalid input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Rule evaluation error
    #[error("rule evaluation failed: {0}")]
    Evaluation(String),
}

/// Result type for authorization operations
pub type Result<T> = std::result::Result<T, AuthzError>;
