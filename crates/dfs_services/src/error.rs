use thiserror::Error;

/// Typed failures cluster adapters attach to their errors. Anything an
/// adapter cannot express as one of these is left untyped and surfaces as
/// IOFailure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClusterError {
    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Path already exists: {0}")]
    AlreadyExists(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Not a file: {0}")]
    NotAFile(String),

    #[error("Parent directory does not exist: {0}")]
    ParentNotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Directory is not empty: {0}")]
    NotEmpty(String),

    #[error("Cluster unavailable: {0}")]
    Unavailable(String),
}
