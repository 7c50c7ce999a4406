use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use bytes::{Bytes, BytesMut};
use dfs_domain::{ByteStream, ClusterPath, DEFAULT_BLOCK_SIZE, DEFAULT_CHUNK_SIZE};
use futures::StreamExt;
use tracing::debug;

use crate::{chunked, ByteSink, Cluster, ClusterError, FileStatus, FileType, NativeBlockLocation};

#[derive(Debug, Clone)]
enum Node {
    Directory { modified: i64 },
    File { content: Bytes, modified: i64 },
}

#[derive(Debug)]
struct Tree {
    nodes: BTreeMap<ClusterPath, Node>,
}

impl Tree {
    fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(ClusterPath::root(), Node::Directory { modified: now() });
        Self { nodes }
    }

    fn get(&self, path: &ClusterPath) -> Option<&Node> {
        self.nodes.get(path)
    }

    fn is_dir(&self, path: &ClusterPath) -> bool {
        matches!(self.get(path), Some(Node::Directory { .. }))
    }

    /// `mkdir -p`; false if a file sits on the way.
    fn make_dirs(&mut self, path: &ClusterPath) -> bool {
        let mut current = ClusterPath::root();
        for segment in path.segments() {
            current = current.join(segment);
            match self.nodes.get(&current) {
                Some(Node::File { .. }) => return false,
                Some(Node::Directory { .. }) => {}
                None => {
                    self.nodes
                        .insert(current.clone(), Node::Directory { modified: now() });
                }
            }
        }
        true
    }

    fn children(&self, path: &ClusterPath) -> Vec<(&ClusterPath, &Node)> {
        self.nodes
            .iter()
            .filter(|(candidate, _)| candidate.parent().as_ref() == Some(path))
            .collect()
    }

    fn subtree(&self, path: &ClusterPath) -> Vec<ClusterPath> {
        self.nodes
            .keys()
            .filter(|candidate| candidate.is_within(path))
            .cloned()
            .collect()
    }

    /// Validates that a file may be written at `path` and creates its
    /// parents.
    fn prepare_write(&mut self, path: &ClusterPath, overwrite: bool) -> Result<(), ClusterError> {
        match self.get(path) {
            Some(Node::Directory { .. }) => {
                return Err(ClusterError::NotAFile(path.to_string()));
            }
            Some(Node::File { .. }) if !overwrite => {
                return Err(ClusterError::AlreadyExists(path.to_string()));
            }
            _ => {}
        }

        let parent = path.parent().unwrap_or_else(ClusterPath::root);
        if !self.make_dirs(&parent) {
            return Err(ClusterError::NotADirectory(parent.to_string()));
        }
        Ok(())
    }
}

/// An in-process cluster. Content lives in a shared tree guarded by a mutex;
/// writes are buffered in their sink and become visible atomically on close.
///
/// Besides serving the `memory://` endpoint it carries a few hooks for
/// exercising failure paths: a call counter, an availability switch and
/// per-path read failures.
pub struct MemoryCluster {
    tree: Arc<Mutex<Tree>>,
    owner: String,
    chunk_size: usize,
    block_size: u64,
    available: AtomicBool,
    calls: AtomicUsize,
    failing_reads: Mutex<HashSet<ClusterPath>>,
}

impl MemoryCluster {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            tree: Arc::new(Mutex::new(Tree::new())),
            owner: owner.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            block_size: DEFAULT_BLOCK_SIZE,
            available: AtomicBool::new(true),
            calls: AtomicUsize::new(0),
            failing_reads: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_block_size(mut self, block_size: u64) -> Self {
        self.block_size = block_size.max(1);
        self
    }

    /// Number of primitive calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// While unavailable every primitive fails with `ClusterError::Unavailable`.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Reads of `path` yield their first chunk and then fail.
    pub fn fail_reads_of(&self, path: &ClusterPath) {
        lock(&self.failing_reads).insert(path.clone());
    }

    /// Every path in the namespace, the root included, in sorted order.
    pub fn paths(&self) -> Vec<ClusterPath> {
        self.tree().nodes.keys().cloned().collect()
    }

    fn tree(&self) -> MutexGuard<'_, Tree> {
        lock(&self.tree)
    }

    fn enter(&self, operation: &str, path: &ClusterPath) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        debug!(operation = operation, path = %path, "Memory cluster call");
        if !self.available.load(Ordering::SeqCst) {
            return Err(ClusterError::Unavailable("memory cluster switched off".to_string()).into());
        }
        Ok(())
    }

    fn status(&self, path_suffix: &str, node: &Node) -> FileStatus {
        let (file_type, length, modified) = match node {
            Node::Directory { modified } => (FileType::Directory, 0, *modified),
            Node::File { content, modified } => (FileType::File, content.len() as u64, *modified),
        };
        FileStatus {
            path_suffix: path_suffix.to_string(),
            file_type,
            length,
            owner: self.owner.clone(),
            group: "supergroup".to_string(),
            modification_time: modified,
            replication: if file_type == FileType::File { 1 } else { 0 },
            block_size: if file_type == FileType::File { self.block_size } else { 0 },
        }
    }
}

#[async_trait::async_trait]
impl Cluster for MemoryCluster {
    async fn make_directory(&self, path: &ClusterPath) -> Result<bool> {
        self.enter("mkdirs", path)?;
        Ok(self.tree().make_dirs(path))
    }

    async fn stat(&self, path: &ClusterPath) -> Result<Option<FileStatus>> {
        self.enter("stat", path)?;
        Ok(self.tree().get(path).map(|node| self.status("", node)))
    }

    async fn list(&self, path: &ClusterPath) -> Result<Vec<FileStatus>> {
        self.enter("list", path)?;
        let tree = self.tree();
        match tree.get(path) {
            None => Err(ClusterError::NotFound(path.to_string()).into()),
            Some(Node::File { .. }) => Err(ClusterError::NotADirectory(path.to_string()).into()),
            Some(Node::Directory { .. }) => {
                let mut statuses = tree
                    .children(path)
                    .into_iter()
                    .map(|(child, node)| self.status(child.name(), node))
                    .collect::<Vec<_>>();
                statuses.sort_by(|a, b| a.path_suffix.cmp(&b.path_suffix));
                Ok(statuses)
            }
        }
    }

    async fn open_for_read(&self, path: &ClusterPath) -> Result<ByteStream> {
        self.enter("open", path)?;
        let content = match self.tree().get(path) {
            None => return Err(ClusterError::NotFound(path.to_string()).into()),
            Some(Node::Directory { .. }) => {
                return Err(ClusterError::NotAFile(path.to_string()).into())
            }
            Some(Node::File { content, .. }) => content.clone(),
        };

        let stream = chunked(content, self.chunk_size);
        if lock(&self.failing_reads).contains(path) {
            let failure = futures::stream::once(async {
                Err(anyhow::anyhow!("Simulated read failure"))
            });
            return Ok(Box::pin(stream.take(1).chain(failure)));
        }
        Ok(stream)
    }

    async fn open_for_write(
        &self,
        path: &ClusterPath,
        overwrite: bool,
    ) -> Result<Box<dyn ByteSink>> {
        self.enter("create", path)?;
        self.tree().prepare_write(path, overwrite)?;
        Ok(Box::new(MemorySink {
            tree: self.tree.clone(),
            path: path.clone(),
            overwrite,
            buffer: BytesMut::new(),
        }))
    }

    async fn rename(&self, from: &ClusterPath, to: &ClusterPath) -> Result<bool> {
        self.enter("rename", from)?;
        let mut tree = self.tree();

        let parent_ok = to.parent().map(|parent| tree.is_dir(&parent)).unwrap_or(false);
        if from.is_root()
            || tree.get(from).is_none()
            || tree.get(to).is_some()
            || !parent_ok
            || to.is_within(from)
        {
            return Ok(false);
        }

        let modified = now();
        for old in tree.subtree(from) {
            if let Some(node) = tree.nodes.remove(&old) {
                let suffix = &old.as_str()[from.as_str().len()..];
                let new = ClusterPath::parse(&format!("{to}{suffix}"))?;
                let node = match node {
                    Node::Directory { .. } if old == *from => Node::Directory { modified },
                    node => node,
                };
                tree.nodes.insert(new, node);
            }
        }
        Ok(true)
    }

    async fn delete(&self, path: &ClusterPath, recursive: bool) -> Result<bool> {
        self.enter("delete", path)?;
        let mut tree = self.tree();
        if path.is_root() || tree.get(path).is_none() {
            return Ok(false);
        }
        if !recursive && !tree.children(path).is_empty() {
            return Err(ClusterError::NotEmpty(path.to_string()).into());
        }
        for doomed in tree.subtree(path) {
            tree.nodes.remove(&doomed);
        }
        Ok(true)
    }

    async fn block_locations(&self, path: &ClusterPath) -> Result<Vec<NativeBlockLocation>> {
        self.enter("block_locations", path)?;
        let length = match self.tree().get(path) {
            None => return Err(ClusterError::NotFound(path.to_string()).into()),
            Some(Node::Directory { .. }) => {
                return Err(ClusterError::NotAFile(path.to_string()).into())
            }
            Some(Node::File { content, .. }) => content.len() as u64,
        };
        Ok(single_host_blocks(length, self.block_size))
    }
}

/// Splits `length` bytes into `block_size` blocks held by `localhost`.
pub fn single_host_blocks(length: u64, block_size: u64) -> Vec<NativeBlockLocation> {
    let block_size = block_size.max(1);
    (0..length)
        .step_by(block_size as usize)
        .map(|offset| NativeBlockLocation {
            offset,
            length: block_size.min(length - offset),
            hosts: vec!["localhost".to_string()],
            names: vec!["localhost:9866".to_string()],
            topology_paths: vec!["/default-rack/localhost:9866".to_string()],
            corrupt: false,
        })
        .collect()
}

struct MemorySink {
    tree: Arc<Mutex<Tree>>,
    path: ClusterPath,
    overwrite: bool,
    buffer: BytesMut,
}

#[async_trait::async_trait]
impl ByteSink for MemorySink {
    async fn write(&mut self, chunk: Bytes) -> Result<()> {
        self.buffer.extend_from_slice(&chunk);
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let MemorySink { tree, path, overwrite, buffer } = *self;
        let mut tree = lock(&tree);
        // The namespace may have changed since the sink was opened.
        tree.prepare_write(&path, overwrite)?;
        debug!(path = %path, bytes = buffer.len(), "Memory cluster committed file");
        tree.nodes
            .insert(path, Node::File { content: buffer.freeze(), modified: now() });
        Ok(())
    }

    async fn abort(self: Box<Self>) -> Result<()> {
        debug!(path = %self.path, "Memory cluster discarded partial file");
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn now() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
