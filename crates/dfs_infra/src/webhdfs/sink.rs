use anyhow::{anyhow, Result};
use bytes::Bytes;
use dfs_domain::ClusterPath;
use dfs_services::{ByteSink, Cluster, ClusterError};
use reqwest::Method;
use tracing::{debug, warn};

use super::WebHdfsCluster;

const TEMP_SUFFIX: &str = "._COPYING_";

/// Writes into `<name>.<unique>._COPYING_` beside the target, one `APPEND`
/// per chunk, and renames it over the target on close. Each sink owns its
/// temporary file, so concurrent writers to one target never mix content.
pub struct WebHdfsSink {
    cluster: WebHdfsCluster,
    target: ClusterPath,
    temp: ClusterPath,
    overwrite: bool,
}

impl WebHdfsSink {
    pub async fn create(
        cluster: WebHdfsCluster,
        target: ClusterPath,
        overwrite: bool,
    ) -> Result<Self> {
        let temp = temp_path(&target);
        debug!(path = %temp, "CREATE");

        let mut url = cluster.url(&temp, "CREATE");
        url.query_pairs_mut().append_pair("overwrite", "false");
        cluster.upload(Method::PUT, url, Bytes::new()).await?;

        Ok(Self { cluster, target, temp, overwrite })
    }
}

#[async_trait::async_trait]
impl ByteSink for WebHdfsSink {
    async fn write(&mut self, chunk: Bytes) -> Result<()> {
        if chunk.is_empty() {
            return Ok(());
        }
        debug!(path = %self.temp, bytes = chunk.len(), "APPEND");
        let url = self.cluster.url(&self.temp, "APPEND");
        self.cluster.upload(Method::POST, url, chunk).await
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let moved = if self.overwrite {
            self.cluster.replace(&self.temp, &self.target).await.map(|()| true)
        } else {
            self.cluster.rename(&self.temp, &self.target).await
        };

        let target = self.target.clone();
        match moved {
            Ok(true) => {
                debug!(path = %target, "Committed file");
                Ok(())
            }
            Ok(false) => {
                let exists = self.cluster.exists(&target).await;
                self.abort().await?;
                match exists {
                    Ok(true) => Err(ClusterError::AlreadyExists(target.to_string()).into()),
                    Ok(false) => {
                        Err(anyhow!("Cluster refused to move the written file to {target}"))
                    }
                    Err(error) => Err(error),
                }
            }
            Err(error) => {
                if let Err(abort) = self.abort().await {
                    warn!(path = %target, error = %abort, "Failed to discard partial file");
                }
                Err(error)
            }
        }
    }

    async fn abort(self: Box<Self>) -> Result<()> {
        debug!(path = %self.temp, "Discarding partial file");
        if !self.cluster.delete(&self.temp, false).await? {
            warn!(path = %self.temp, "Partial file was already gone");
        }
        Ok(())
    }
}

fn temp_path(target: &ClusterPath) -> ClusterPath {
    let parent = target.parent().unwrap_or_else(ClusterPath::root);
    parent.join(&format!(
        "{}.{}{TEMP_SUFFIX}",
        target.name(),
        uuid::Uuid::new_v4().simple()
    ))
}
