use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use bytes::Bytes;
use dfs_domain::{ByteStream, ClusterPath};
use dfs_fs::{AtomicFile, LocalEntry, LocalFS};
use dfs_services::{
    single_host_blocks, ByteSink, Cluster, ClusterError, FileStatus, FileType, NativeBlockLocation,
};
use tracing::debug;

/// A directory on the gateway host serving as a single-node cluster, for
/// development and for running without a NameNode.
pub struct LocalCluster {
    root: PathBuf,
    owner: String,
    chunk_size: usize,
    block_size: u64,
}

impl LocalCluster {
    pub async fn open(
        root: impl Into<PathBuf>,
        owner: impl Into<String>,
        chunk_size: usize,
        block_size: u64,
    ) -> Result<Self> {
        let root = root.into();
        LocalFS::create_dir_all(&root).await?;
        Ok(Self { root, owner: owner.into(), chunk_size: chunk_size.max(1), block_size })
    }

    fn resolve(&self, path: &ClusterPath) -> Result<PathBuf> {
        if path.segments().any(|segment| segment == "." || segment == "..") {
            return Err(ClusterError::PermissionDenied(format!(
                "{path} leaves the cluster root"
            ))
            .into());
        }
        Ok(self.root.join(path.relative()))
    }

    async fn entry(&self, path: &ClusterPath) -> Result<Option<LocalEntry>> {
        LocalFS::stat(self.resolve(path)?).await
    }

    fn status(&self, path_suffix: &str, entry: &LocalEntry) -> FileStatus {
        let modification_time = entry
            .modified
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as i64)
            .unwrap_or_default();
        FileStatus {
            path_suffix: path_suffix.to_string(),
            file_type: if entry.is_dir { FileType::Directory } else { FileType::File },
            length: entry.len,
            owner: self.owner.clone(),
            group: "supergroup".to_string(),
            modification_time,
            replication: if entry.is_dir { 0 } else { 1 },
            block_size: if entry.is_dir { 0 } else { self.block_size },
        }
    }
}

#[async_trait::async_trait]
impl Cluster for LocalCluster {
    async fn make_directory(&self, path: &ClusterPath) -> Result<bool> {
        let mut current = ClusterPath::root();
        for segment in path.segments() {
            current = current.join(segment);
            if LocalFS::is_file(self.resolve(&current)?) {
                return Ok(false);
            }
        }
        LocalFS::create_dir_all(self.resolve(path)?).await?;
        Ok(true)
    }

    async fn stat(&self, path: &ClusterPath) -> Result<Option<FileStatus>> {
        Ok(self.entry(path).await?.map(|entry| self.status("", &entry)))
    }

    async fn list(&self, path: &ClusterPath) -> Result<Vec<FileStatus>> {
        match self.entry(path).await? {
            None => Err(ClusterError::NotFound(path.to_string()).into()),
            Some(entry) if !entry.is_dir => Err(ClusterError::NotADirectory(path.to_string()).into()),
            Some(_) => {
                let statuses = LocalFS::read_dir(self.resolve(path)?)
                    .await?
                    .into_iter()
                    .filter(|entry| !AtomicFile::is_temp_path(Path::new(&entry.name)))
                    .map(|entry| self.status(&entry.name, &entry))
                    .collect();
                Ok(statuses)
            }
        }
    }

    async fn open_for_read(&self, path: &ClusterPath) -> Result<ByteStream> {
        match self.entry(path).await? {
            None => Err(ClusterError::NotFound(path.to_string()).into()),
            Some(entry) if entry.is_dir => Err(ClusterError::NotAFile(path.to_string()).into()),
            Some(_) => Ok(Box::pin(
                LocalFS::read_chunks(self.resolve(path)?, self.chunk_size).await?,
            )),
        }
    }

    async fn open_for_write(
        &self,
        path: &ClusterPath,
        overwrite: bool,
    ) -> Result<Box<dyn ByteSink>> {
        match self.entry(path).await? {
            Some(entry) if entry.is_dir => {
                return Err(ClusterError::NotAFile(path.to_string()).into());
            }
            Some(_) if !overwrite => {
                return Err(ClusterError::AlreadyExists(path.to_string()).into());
            }
            _ => {}
        }
        if path.is_root() {
            return Err(ClusterError::NotAFile(path.to_string()).into());
        }

        let parent = path.parent().unwrap_or_else(ClusterPath::root);
        if !self.make_directory(&parent).await? {
            return Err(ClusterError::NotADirectory(parent.to_string()).into());
        }

        let file = AtomicFile::create(self.resolve(path)?).await?;
        Ok(Box::new(LocalSink { file, path: path.clone(), overwrite }))
    }

    async fn rename(&self, from: &ClusterPath, to: &ClusterPath) -> Result<bool> {
        let parent_is_dir = match to.parent() {
            Some(parent) => LocalFS::is_dir(self.resolve(&parent)?),
            None => false,
        };
        if from.is_root()
            || to.is_within(from)
            || !parent_is_dir
            || self.entry(to).await?.is_some()
            || self.entry(from).await?.is_none()
        {
            return Ok(false);
        }

        LocalFS::rename(self.resolve(from)?, self.resolve(to)?).await?;
        Ok(true)
    }

    async fn delete(&self, path: &ClusterPath, recursive: bool) -> Result<bool> {
        if path.is_root() {
            return Ok(false);
        }
        let target = self.resolve(path)?;
        match self.entry(path).await? {
            None => Ok(false),
            Some(entry) if !entry.is_dir => {
                LocalFS::remove_file(&target).await?;
                Ok(true)
            }
            Some(_) if recursive => {
                LocalFS::remove_dir_all(&target).await?;
                Ok(true)
            }
            Some(_) => {
                if !LocalFS::read_dir(&target).await?.is_empty() {
                    return Err(ClusterError::NotEmpty(path.to_string()).into());
                }
                LocalFS::remove_dir(&target).await?;
                Ok(true)
            }
        }
    }

    async fn block_locations(&self, path: &ClusterPath) -> Result<Vec<NativeBlockLocation>> {
        match self.entry(path).await? {
            None => Err(ClusterError::NotFound(path.to_string()).into()),
            Some(entry) if entry.is_dir => Err(ClusterError::NotAFile(path.to_string()).into()),
            Some(entry) => Ok(single_host_blocks(entry.len, self.block_size)),
        }
    }
}

struct LocalSink {
    file: AtomicFile,
    path: ClusterPath,
    overwrite: bool,
}

#[async_trait::async_trait]
impl ByteSink for LocalSink {
    async fn write(&mut self, chunk: Bytes) -> Result<()> {
        self.file.write(&chunk).await
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let LocalSink { file, path, overwrite } = *self;
        match file.commit(overwrite).await {
            Ok(written) => {
                debug!(path = %path, bytes = written, "Local cluster committed file");
                Ok(())
            }
            Err(error)
                if matches!(
                    error.downcast_ref::<dfs_fs::Error>(),
                    Some(dfs_fs::Error::TargetExists(_))
                ) =>
            {
                Err(ClusterError::AlreadyExists(path.to_string()).into())
            }
            Err(error) => Err(error).with_context(|| format!("Failed to commit {path}")),
        }
    }

    async fn abort(self: Box<Self>) -> Result<()> {
        self.file.discard().await
    }
}
