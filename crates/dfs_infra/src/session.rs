use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use dfs_domain::{ByteStream, ClusterPath, Environment};
use dfs_services::{ByteSink, Cluster, FileStatus, MemoryCluster, NativeBlockLocation};
use tracing::{info, warn};
use url::Url;

use crate::local_cluster::LocalCluster;
use crate::webhdfs::{rest_base, WebHdfsCluster};

/// Which adapter an endpoint selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    WebHdfs(Url),
    Local(PathBuf),
    Memory,
}

impl Backend {
    pub fn parse(endpoint: &str) -> Result<Self> {
        let endpoint = endpoint.trim();
        let (scheme, _) = endpoint
            .split_once("://")
            .with_context(|| format!("Cluster endpoint {endpoint:?} has no scheme"))?;

        match scheme {
            "memory" => Ok(Self::Memory),
            "file" => {
                let url = Url::parse(endpoint)
                    .with_context(|| format!("Invalid cluster endpoint {endpoint}"))?;
                match url.to_file_path() {
                    Ok(root) => Ok(Self::Local(root)),
                    Err(()) => bail!("Cluster endpoint {endpoint} is not an absolute file path"),
                }
            }
            _ => Ok(Self::WebHdfs(rest_base(endpoint)?)),
        }
    }
}

/// The one handle to the cluster the process holds. It is connected at
/// startup, shared by every request and closed on shutdown.
pub struct ClusterSession {
    backend: Backend,
    inner: Arc<dyn Cluster>,
}

impl ClusterSession {
    pub async fn connect(environment: &Environment) -> Result<Self> {
        let backend = Backend::parse(&environment.cluster_endpoint)?;
        let inner: Arc<dyn Cluster> = match &backend {
            Backend::Memory => Arc::new(
                MemoryCluster::new(environment.identity.clone())
                    .with_chunk_size(environment.chunk_size)
                    .with_block_size(environment.block_size),
            ),
            Backend::Local(root) => Arc::new(
                LocalCluster::open(
                    root.clone(),
                    environment.identity.clone(),
                    environment.chunk_size,
                    environment.block_size,
                )
                .await?,
            ),
            Backend::WebHdfs(_) => Arc::new(WebHdfsCluster::new(
                &environment.cluster_endpoint,
                environment.identity.clone(),
                environment.connect_timeout,
            )?),
        };

        let session = Self { backend, inner };
        // An unreachable cluster is reported per request, not at startup.
        if let Err(error) = session.inner.stat(&ClusterPath::root()).await {
            warn!("Cluster is not reachable yet: {error:#}");
        }
        info!(
            backend = ?session.backend,
            identity = %environment.identity,
            "Cluster session opened"
        );
        Ok(session)
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn close(&self) {
        info!(backend = ?self.backend, "Cluster session closed");
    }
}

#[async_trait::async_trait]
impl Cluster for ClusterSession {
    async fn make_directory(&self, path: &ClusterPath) -> Result<bool> {
        self.inner.make_directory(path).await
    }

    async fn stat(&self, path: &ClusterPath) -> Result<Option<FileStatus>> {
        self.inner.stat(path).await
    }

    async fn list(&self, path: &ClusterPath) -> Result<Vec<FileStatus>> {
        self.inner.list(path).await
    }

    async fn open_for_read(&self, path: &ClusterPath) -> Result<ByteStream> {
        self.inner.open_for_read(path).await
    }

    async fn open_for_write(
        &self,
        path: &ClusterPath,
        overwrite: bool,
    ) -> Result<Box<dyn ByteSink>> {
        self.inner.open_for_write(path, overwrite).await
    }

    async fn rename(&self, from: &ClusterPath, to: &ClusterPath) -> Result<bool> {
        self.inner.rename(from, to).await
    }

    async fn delete(&self, path: &ClusterPath, recursive: bool) -> Result<bool> {
        self.inner.delete(path, recursive).await
    }

    async fn block_locations(&self, path: &ClusterPath) -> Result<Vec<NativeBlockLocation>> {
        self.inner.block_locations(path).await
    }

    async fn exists(&self, path: &ClusterPath) -> Result<bool> {
        self.inner.exists(path).await
    }

    async fn copy(&self, from: &ClusterPath, to: &ClusterPath, overwrite: bool) -> Result<u64> {
        self.inner.copy(from, to, overwrite).await
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_backend_parse() {
        assert_eq!(Backend::parse("memory://").unwrap(), Backend::Memory);
        assert_eq!(
            Backend::parse("file:///srv/dfs").unwrap(),
            Backend::Local(PathBuf::from("/srv/dfs"))
        );
        assert_eq!(
            Backend::parse(" webhdfs://nn:9870 ").unwrap(),
            Backend::WebHdfs(Url::parse("http://nn:9870/webhdfs/v1").unwrap())
        );
    }

    #[test]
    fn test_backend_parse_rejects() {
        assert!(Backend::parse("namenode:9870").is_err());
        assert!(Backend::parse("hdfs://nn:8020").is_err());
        assert!(Backend::parse("ftp://nn").is_err());
    }

    #[tokio::test]
    async fn test_connect_local() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("cluster");
        let environment = Environment::default()
            .cluster_endpoint(Url::from_directory_path(&root).unwrap().to_string());

        let session = ClusterSession::connect(&environment).await.unwrap();

        assert_eq!(session.backend(), &Backend::Local(root.clone()));
        assert!(root.is_dir());
        assert!(session.make_directory(&ClusterPath::parse("/a").unwrap()).await.unwrap());
        assert!(root.join("a").is_dir());
        session.close();
    }

    #[tokio::test]
    async fn test_connect_memory() {
        let environment = Environment::default().cluster_endpoint("memory://".to_string());

        let session = ClusterSession::connect(&environment).await.unwrap();

        assert!(session.exists(&ClusterPath::root()).await.unwrap());
    }
}
