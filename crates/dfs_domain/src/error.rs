use serde::Serialize;
use thiserror::Error;

/// The closed set of failure kinds a facade operation can report.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    strum_macros::Display,
    strum_macros::AsRefStr,
    strum_macros::EnumIter,
)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    NotADirectory,
    NotAFile,
    AlreadyExists,
    #[strum(serialize = "IOFailure")]
    #[serde(rename = "IOFailure")]
    IoFailure,
    ClusterUnavailable,
}

// Built by `dfs_services::classify`, not converted from `anyhow::Error`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{kind}: {message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn not_a_directory(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotADirectory, message)
    }

    pub fn not_a_file(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotAFile, message)
    }

    pub fn io_failure(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IoFailure, message)
    }

    /// Local-side failures (the gateway host's own disk) are never cluster
    /// failures, so they are reported as IOFailure with the whole chain kept.
    pub fn local(error: &anyhow::Error) -> Self {
        Self::io_failure(format!("{error:#}"))
    }
}

/// Tagged outcome returned by every facade operation.
pub type OperationResult<A> = std::result::Result<A, Error>;

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_error_display_includes_kind() {
        let error = Error::not_found("/a/b.txt");
        assert_eq!(error.to_string(), "NotFound: /a/b.txt");
    }

    #[test]
    fn test_io_failure_spelling() {
        assert_eq!(ErrorKind::IoFailure.to_string(), "IOFailure");
        assert_eq!(
            serde_json::to_string(&ErrorKind::IoFailure).unwrap(),
            "\"IOFailure\""
        );
    }

    #[test]
    fn test_local_keeps_context_chain() {
        let cause = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let error = anyhow::Error::from(cause).context("Failed to write file /tmp/x");
        let actual = Error::local(&error);
        assert_eq!(actual.kind, ErrorKind::IoFailure);
        assert_eq!(actual.message, "Failed to write file /tmp/x: disk full");
    }
}
