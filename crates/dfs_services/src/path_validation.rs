use std::path::PathBuf;

use dfs_domain::{ClusterPath, Error, OperationResult};
use tracing::debug;

/// Validates a raw request parameter naming a cluster path. Only rejects
/// blank input and control characters; whether the path is legal in the
/// cluster's namespace is for the cluster to decide.
pub fn validate_path(raw: &str) -> OperationResult<ClusterPath> {
    ClusterPath::parse(raw).inspect_err(|error| {
        debug!(raw = raw, error = %error, "Rejected cluster path parameter");
    })
}

/// Validates a raw request parameter naming a path on the gateway host.
pub fn validate_local_path(raw: &str) -> OperationResult<PathBuf> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        debug!("Rejected empty local path parameter");
        return Err(Error::invalid_argument("Local path must not be empty"));
    }
    if trimmed.chars().any(|c| c.is_control()) {
        debug!(raw = raw, "Rejected local path parameter");
        return Err(Error::invalid_argument(format!(
            "Local path contains control characters: {:?}",
            trimmed
        )));
    }
    Ok(PathBuf::from(trimmed))
}
