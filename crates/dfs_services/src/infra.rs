use std::path::Path;

use anyhow::Result;
use bytes::Bytes;
use dfs_domain::{ByteStream, ClusterPath, Environment};

/// Type of an entry as the cluster reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    File,
    Directory,
    Symlink,
}

/// Cluster-native status record for one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStatus {
    /// Child name relative to the listed directory; empty when the record
    /// describes the requested path itself.
    pub path_suffix: String,
    pub file_type: FileType,
    pub length: u64,
    pub owner: String,
    pub group: String,
    /// Milliseconds since the Unix epoch.
    pub modification_time: i64,
    pub replication: u16,
    pub block_size: u64,
}

/// Cluster-native placement record for one block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NativeBlockLocation {
    pub offset: u64,
    pub length: u64,
    pub hosts: Vec<String>,
    pub names: Vec<String>,
    pub topology_paths: Vec<String>,
    pub corrupt: bool,
}

/// Destination for streamed content. Nothing becomes visible at the target
/// path until [`ByteSink::close`] succeeds; [`ByteSink::abort`] discards
/// everything written so far.
#[async_trait::async_trait]
pub trait ByteSink: Send {
    async fn write(&mut self, chunk: Bytes) -> Result<()>;

    /// Commits the content. On failure the sink cleans up after itself.
    async fn close(self: Box<Self>) -> Result<()>;

    async fn abort(self: Box<Self>) -> Result<()>;
}

/// The storage cluster as seen by the gateway. Every method is one network
/// round-trip (or a stream of them); implementations never retry.
///
/// Failures caused by the cluster are reported as [`crate::ClusterError`]
/// somewhere in the returned error chain so they can be classified.
#[async_trait::async_trait]
pub trait Cluster: Send + Sync {
    /// Creates the directory and any missing parents. `Ok(true)` if it exists
    /// as a directory afterwards, `Ok(false)` if a file blocks the way.
    async fn make_directory(&self, path: &ClusterPath) -> Result<bool>;

    /// `Ok(None)` if nothing exists at `path`.
    async fn stat(&self, path: &ClusterPath) -> Result<Option<FileStatus>>;

    /// Children of a directory. Fails with `NotFound` or `NotADirectory`.
    async fn list(&self, path: &ClusterPath) -> Result<Vec<FileStatus>>;

    async fn open_for_read(&self, path: &ClusterPath) -> Result<ByteStream>;

    /// Missing parents are created. Fails with `AlreadyExists` when the target
    /// is a file and `overwrite` is false, with `NotAFile` when it is a
    /// directory.
    async fn open_for_write(&self, path: &ClusterPath, overwrite: bool)
        -> Result<Box<dyn ByteSink>>;

    /// `Ok(false)` if `from` is absent, `to` exists, or `to`'s parent is not
    /// an existing directory.
    async fn rename(&self, from: &ClusterPath, to: &ClusterPath) -> Result<bool>;

    /// `Ok(false)` if nothing exists at `path`.
    async fn delete(&self, path: &ClusterPath, recursive: bool) -> Result<bool>;

    /// Fails with `NotFound` if absent, `NotAFile` if `path` is a directory.
    async fn block_locations(&self, path: &ClusterPath) -> Result<Vec<NativeBlockLocation>>;

    async fn exists(&self, path: &ClusterPath) -> Result<bool> {
        Ok(self.stat(path).await?.is_some())
    }

    /// Streams `from` into `to`. Not atomic for the cluster as a whole, but a
    /// failure part-way never leaves a partial `to` behind.
    async fn copy(&self, from: &ClusterPath, to: &ClusterPath, overwrite: bool) -> Result<u64> {
        let content = self.open_for_read(from).await?;
        let sink = self.open_for_write(to, overwrite).await?;
        crate::pump(content, sink).await
    }
}

/// Access to the gateway host's own disk, used by upload and download.
#[async_trait::async_trait]
pub trait LocalFsService: Send + Sync {
    async fn read_chunks(&self, path: &Path, chunk_size: usize) -> Result<ByteStream>;

    /// Writes through a temporary file; on error nothing is left at `path`
    /// that was not there before.
    async fn write_stream(&self, path: &Path, content: ByteStream) -> Result<u64>;
}

pub trait EnvironmentService: Send + Sync {
    fn get_environment(&self) -> Environment;
}

pub trait Infrastructure: Send + Sync + 'static {
    type Cluster: Cluster;
    type LocalFsService: LocalFsService;
    type EnvironmentService: EnvironmentService;

    fn cluster(&self) -> &Self::Cluster;
    fn local_fs_service(&self) -> &Self::LocalFsService;
    fn environment_service(&self) -> &Self::EnvironmentService;
}
