use std::path::PathBuf;

use clap::Parser;
use dfs_domain::Environment;

#[derive(Parser, Debug)]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Cluster endpoint, e.g. `webhdfs://namenode:9870`.
    ///
    /// `file:///dir` serves a local directory as a single-node cluster and
    /// `memory://` keeps everything in memory. Overrides `HDFS_PATH`.
    #[arg(long, short = 'e')]
    pub endpoint: Option<String>,

    /// Identity passed to the cluster on every call. Overrides
    /// `HDFS_USERNAME`.
    #[arg(long, short = 'u')]
    pub user: Option<String>,

    /// Address to listen on. Overrides `DFS_GATEWAY_ADDR`.
    #[arg(long, short = 'b')]
    pub bind: Option<String>,

    /// Directory for hourly rolling log files. Overrides `DFS_LOG_DIR`.
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(long, short = 'v', default_value_t = false)]
    pub verbose: bool,
}

impl Cli {
    /// Flags win over the environment.
    pub fn apply(&self, environment: Environment) -> Environment {
        let mut environment = environment;
        if let Some(endpoint) = &self.endpoint {
            environment = environment.cluster_endpoint(endpoint.clone());
        }
        if let Some(user) = &self.user {
            environment = environment.identity(user.clone());
        }
        if let Some(bind) = &self.bind {
            environment = environment.bind_address(bind.clone());
        }
        if let Some(log_dir) = &self.log_dir {
            environment = environment.log_dir(log_dir.clone());
        }
        environment
    }
}
