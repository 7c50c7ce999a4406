use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use dfs_domain::{Environment, ParentPolicy, WritePolicy};
use dfs_services::EnvironmentService;

/// Serves the configuration the gateway was started with. It is resolved
/// once, from `.env` and the process environment, and never re-read.
pub struct GatewayEnvironmentService {
    environment: Environment,
}

impl GatewayEnvironmentService {
    pub fn new(environment: Environment) -> Self {
        Self { environment }
    }

    /// Reads `.env` (if present) and the process environment.
    pub fn from_env() -> Result<Environment> {
        dotenv::dotenv().ok();
        Self::resolve(|key| std::env::var(key).ok())
    }

    fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Result<Environment> {
        let defaults = Environment::default();
        let identity = lookup("HDFS_USERNAME")
            .or_else(|| lookup("USER"))
            .filter(|identity| !identity.trim().is_empty())
            .unwrap_or(defaults.identity.clone());

        Ok(Environment {
            cluster_endpoint: lookup("HDFS_PATH").unwrap_or(defaults.cluster_endpoint),
            identity,
            bind_address: lookup("DFS_GATEWAY_ADDR").unwrap_or(defaults.bind_address),
            chunk_size: parse(&lookup, "DFS_CHUNK_SIZE")?.unwrap_or(defaults.chunk_size),
            block_size: parse(&lookup, "DFS_BLOCK_SIZE")?.unwrap_or(defaults.block_size),
            write_policy: parse(&lookup, "DFS_CREATE_OVERWRITE")?
                .map(WritePolicy::from_overwrite)
                .unwrap_or(defaults.write_policy),
            parent_policy: parse(&lookup, "DFS_COPY_CREATE_PARENTS")?
                .map(ParentPolicy::from_create_missing)
                .unwrap_or(defaults.parent_policy),
            connect_timeout: parse(&lookup, "DFS_CONNECT_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.connect_timeout),
            log_dir: lookup("DFS_LOG_DIR")
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("Invalid value {raw:?} for {key}"))
        })
        .transpose()
}

impl EnvironmentService for GatewayEnvironmentService {
    fn get_environment(&self) -> Environment {
        self.environment.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn resolve(pairs: &[(&str, &str)]) -> Result<Environment> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        GatewayEnvironmentService::resolve(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let actual = resolve(&[]).unwrap();

        assert_eq!(actual.cluster_endpoint, "webhdfs://localhost:9870");
        assert_eq!(actual.identity, "hdfs");
        assert_eq!(actual.bind_address, "127.0.0.1:8080");
        assert_eq!(actual.chunk_size, 64 * 1024);
        assert_eq!(actual.write_policy, WritePolicy::Reject);
        assert_eq!(actual.parent_policy, ParentPolicy::Reject);
        assert_eq!(actual.log_dir, None);
    }

    #[test]
    fn test_overrides() {
        let actual = resolve(&[
            ("HDFS_PATH", "webhdfs://nn:9870"),
            ("HDFS_USERNAME", "alice"),
            ("USER", "bob"),
            ("DFS_CHUNK_SIZE", "1024"),
            ("DFS_CREATE_OVERWRITE", "true"),
            ("DFS_COPY_CREATE_PARENTS", "true"),
            ("DFS_CONNECT_TIMEOUT_SECS", "3"),
            ("DFS_LOG_DIR", "/var/log/dfs"),
        ])
        .unwrap();

        assert_eq!(actual.cluster_endpoint, "webhdfs://nn:9870");
        assert_eq!(actual.identity, "alice");
        assert_eq!(actual.chunk_size, 1024);
        assert_eq!(actual.write_policy, WritePolicy::Overwrite);
        assert_eq!(actual.parent_policy, ParentPolicy::CreateMissing);
        assert_eq!(actual.connect_timeout, Duration::from_secs(3));
        assert_eq!(actual.log_dir, Some(PathBuf::from("/var/log/dfs")));
    }

    #[test]
    fn test_identity_falls_back_to_user() {
        let actual = resolve(&[("USER", "bob")]).unwrap();
        assert_eq!(actual.identity, "bob");
    }

    #[test]
    fn test_invalid_number() {
        let actual = resolve(&[("DFS_CHUNK_SIZE", "lots")]).unwrap_err();
        assert_eq!(actual.to_string(), "Invalid value \"lots\" for DFS_CHUNK_SIZE");
    }
}
