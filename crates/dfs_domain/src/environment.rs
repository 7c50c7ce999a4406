use std::path::PathBuf;
use std::time::Duration;

use derive_setters::Setters;

use crate::{ParentPolicy, WritePolicy};

pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;
pub const DEFAULT_BLOCK_SIZE: u64 = 128 * 1024 * 1024;

#[derive(Debug, Clone, Setters)]
#[setters(strip_option)]
/// Represents the configuration the gateway was started with. Read once at
/// startup and never mutated afterwards.
pub struct Environment {
    /// Cluster endpoint, e.g. `webhdfs://namenode:9870`, `file:///srv/dfs`
    /// or `memory://`.
    pub cluster_endpoint: String,
    /// Identity passed through to the cluster on every call.
    pub identity: String,
    /// Address the HTTP router listens on.
    pub bind_address: String,
    /// Size of the chunks content is streamed in.
    pub chunk_size: usize,
    /// Block size reported by backends that do not have real blocks.
    pub block_size: u64,
    pub write_policy: WritePolicy,
    pub parent_policy: ParentPolicy,
    pub connect_timeout: Duration,
    /// Directory for rolling log files; stdout only when absent.
    pub log_dir: Option<PathBuf>,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            cluster_endpoint: "webhdfs://localhost:9870".to_string(),
            identity: "hdfs".to_string(),
            bind_address: "127.0.0.1:8080".to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            block_size: DEFAULT_BLOCK_SIZE,
            write_policy: WritePolicy::default(),
            parent_policy: ParentPolicy::default(),
            connect_timeout: Duration::from_secs(10),
            log_dir: None,
        }
    }
}
