use dfs_domain::{Error, ErrorKind};

use crate::ClusterError;

/// Translates a cluster-side failure into exactly one [`ErrorKind`]. The
/// first [`ClusterError`] in the chain decides; without one the failure is an
/// unclassified IOFailure. The full chain is kept as the message.
pub fn classify(error: anyhow::Error) -> Error {
    let kind = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<ClusterError>())
        .map(kind_of)
        .unwrap_or(ErrorKind::IoFailure);

    Error::new(kind, format!("{error:#}"))
}

fn kind_of(error: &ClusterError) -> ErrorKind {
    match error {
        ClusterError::NotFound(_) | ClusterError::ParentNotFound(_) => ErrorKind::NotFound,
        ClusterError::AlreadyExists(_) => ErrorKind::AlreadyExists,
        ClusterError::NotADirectory(_) => ErrorKind::NotADirectory,
        ClusterError::NotAFile(_) => ErrorKind::NotAFile,
        ClusterError::Unavailable(_) => ErrorKind::ClusterUnavailable,
        ClusterError::PermissionDenied(_) | ClusterError::NotEmpty(_) => ErrorKind::IoFailure,
    }
}
