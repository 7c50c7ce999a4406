use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use dfs_domain::{
    BlockLocation, ByteStream, ClusterPath, DirectoryEntry, EntryKind, Error, ErrorKind,
    ListItem, OperationResult, ParentPolicy, WritePolicy,
};
use futures::TryStreamExt;
use tracing::debug;

use crate::{
    classify, pump, validate_local_path, validate_path, Cluster, EnvironmentService,
    Infrastructure, LocalFsService, MetadataMapper,
};

/// The operation set the routing layer consumes. Every operation validates
/// all of its parameters before the first cluster call, and every failure
/// leaves here as an [`Error`] with exactly one [`ErrorKind`].
///
/// The facade borrows the process-wide cluster handle from `F`; it never
/// opens a session of its own.
pub struct FileFacade<F> {
    infra: Arc<F>,
    chunk_size: usize,
    write_policy: WritePolicy,
    parent_policy: ParentPolicy,
}

impl<F> Clone for FileFacade<F> {
    fn clone(&self) -> Self {
        Self {
            infra: self.infra.clone(),
            chunk_size: self.chunk_size,
            write_policy: self.write_policy,
            parent_policy: self.parent_policy,
        }
    }
}

impl<F: Infrastructure> FileFacade<F> {
    pub fn new(infra: Arc<F>) -> Self {
        let environment = infra.environment_service().get_environment();
        Self {
            chunk_size: environment.chunk_size.max(1),
            write_policy: environment.write_policy,
            parent_policy: environment.parent_policy,
            infra,
        }
    }

    fn cluster(&self) -> &F::Cluster {
        self.infra.cluster()
    }

    pub async fn create_directory(&self, path: &str) -> OperationResult<bool> {
        let path = validate_path(path)?;
        debug!(path = %path, "Creating directory");
        self.cluster().make_directory(&path).await.map_err(classify)
    }

    /// Entries of every child of a directory.
    pub async fn read_directory_info(&self, path: &str) -> OperationResult<Vec<DirectoryEntry>> {
        let path = validate_path(path)?;
        debug!(path = %path, "Reading directory info");
        let statuses = self.cluster().list(&path).await.map_err(classify)?;
        Ok(MetadataMapper::entries(&path, &statuses))
    }

    pub async fn get_block_locations(&self, path: &str) -> OperationResult<Vec<BlockLocation>> {
        let path = validate_path(path)?;
        debug!(path = %path, "Getting block locations");
        let blocks = self
            .cluster()
            .block_locations(&path)
            .await
            .map_err(classify)
            .map_err(|error| match error.kind {
                ErrorKind::NotAFile => Error::invalid_argument(format!(
                    "Block locations exist for files only: {}",
                    error.message
                )),
                _ => error,
            })?;
        Ok(MetadataMapper::blocks(&blocks))
    }

    /// Writes `content` to `path` following the configured [`WritePolicy`].
    pub async fn create_file(&self, path: &str, content: ByteStream) -> OperationResult<()> {
        self.create_file_with(path, content, self.write_policy).await
    }

    /// Writes `content` to `path`, creating missing parents. Nothing is
    /// visible at `path` until the last chunk is committed.
    pub async fn create_file_with(
        &self,
        path: &str,
        content: ByteStream,
        policy: WritePolicy,
    ) -> OperationResult<()> {
        let path = validate_path(path)?;
        debug!(path = %path, policy = ?policy, "Creating file");
        let sink = self
            .cluster()
            .open_for_write(&path, policy.overwrite())
            .await
            .map_err(classify)?;
        let written = pump(content, sink).await.map_err(classify)?;
        debug!(path = %path, bytes = written, "Created file");
        Ok(())
    }

    /// Invalid UTF-8 sequences are replaced rather than rejected.
    pub async fn read_file_as_text(&self, path: &str) -> OperationResult<String> {
        let content = self.read_file_as_bytes(path).await?;
        Ok(String::from_utf8_lossy(&content).into_owned())
    }

    pub async fn read_file_as_bytes(&self, path: &str) -> OperationResult<Bytes> {
        let stream = self.open_file(path).await?;
        let content = stream
            .try_fold(BytesMut::new(), |mut buffer, chunk| async move {
                buffer.extend_from_slice(&chunk);
                Ok(buffer)
            })
            .await
            .map_err(classify)?;
        Ok(content.freeze())
    }

    /// The file's content as it arrives from the cluster. Dropping the stream
    /// releases the read.
    pub async fn open_file(&self, path: &str) -> OperationResult<ByteStream> {
        let path = validate_path(path)?;
        debug!(path = %path, "Opening file");
        self.cluster().open_for_read(&path).await.map_err(classify)
    }

    /// Children of a directory, the file itself for a file, nothing for an
    /// absent path.
    pub async fn list_directory(&self, path: &str) -> OperationResult<Vec<ListItem>> {
        let path = validate_path(path)?;
        debug!(path = %path, "Listing directory");
        let Some(status) = self.cluster().stat(&path).await.map_err(classify)? else {
            return Ok(Vec::new());
        };

        let entry = MetadataMapper::entry(&path, &status);
        if entry.kind == EntryKind::File {
            return Ok(vec![ListItem::from(&entry)]);
        }

        match self.cluster().list(&path).await.map_err(classify) {
            Ok(statuses) => Ok(statuses
                .iter()
                .map(|status| MetadataMapper::list_item(&path, status))
                .collect()),
            // Removed between the two calls.
            Err(error) if error.kind == ErrorKind::NotFound => Ok(Vec::new()),
            Err(error) => Err(error),
        }
    }

    pub async fn rename(&self, old_path: &str, new_path: &str) -> OperationResult<bool> {
        let old_path = validate_path(old_path)?;
        let new_path = validate_path(new_path)?;
        debug!(from = %old_path, to = %new_path, "Renaming");
        self.cluster()
            .rename(&old_path, &new_path)
            .await
            .map_err(classify)
    }

    /// Deletes a file or a whole directory tree. `false` if nothing was there.
    pub async fn delete_file(&self, path: &str) -> OperationResult<bool> {
        let path = validate_path(path)?;
        debug!(path = %path, "Deleting");
        self.cluster().delete(&path, true).await.map_err(classify)
    }

    /// Copies a file from the gateway host into the cluster, replacing the
    /// remote target.
    pub async fn upload(&self, local_source: &str, remote_path: &str) -> OperationResult<()> {
        let local_source = validate_local_path(local_source)?;
        let remote_path = validate_path(remote_path)?;
        debug!(from = %local_source.display(), to = %remote_path, "Uploading");

        let content = self
            .infra
            .local_fs_service()
            .read_chunks(&local_source, self.chunk_size)
            .await
            .map_err(|error| Error::local(&error))?;
        let sink = self
            .cluster()
            .open_for_write(&remote_path, true)
            .await
            .map_err(classify)?;
        let written = pump(content, sink).await.map_err(classify)?;
        debug!(to = %remote_path, bytes = written, "Uploaded");
        Ok(())
    }

    /// Copies a cluster file onto the gateway host, replacing the local
    /// target.
    pub async fn download(
        &self,
        remote_path: &str,
        local_destination: &str,
    ) -> OperationResult<()> {
        let remote_path = validate_path(remote_path)?;
        let local_destination = validate_local_path(local_destination)?;
        debug!(from = %remote_path, to = %local_destination.display(), "Downloading");

        let content = self
            .cluster()
            .open_for_read(&remote_path)
            .await
            .map_err(classify)?;
        let written = self
            .infra
            .local_fs_service()
            .write_stream(&local_destination, content)
            .await
            .map_err(classify)?;
        debug!(to = %local_destination.display(), bytes = written, "Downloaded");
        Ok(())
    }

    /// Copies one file inside the cluster. A missing target parent is
    /// handled by the configured [`ParentPolicy`], an existing target by the
    /// configured [`WritePolicy`].
    pub async fn copy(&self, source_path: &str, target_path: &str) -> OperationResult<()> {
        let source = validate_path(source_path)?;
        let target = validate_path(target_path)?;
        if source == target {
            return Err(Error::invalid_argument(format!(
                "Source and target are the same path: {source}"
            )));
        }
        debug!(from = %source, to = %target, "Copying");

        match self.cluster().stat(&source).await.map_err(classify)? {
            None => return Err(Error::not_found(format!("Path not found: {source}"))),
            Some(status) if MetadataMapper::entry(&source, &status).is_dir() => {
                return Err(Error::not_a_file(format!("Not a file: {source}")));
            }
            Some(_) => {}
        }

        self.ensure_target_parent(&target).await?;

        let written = self
            .cluster()
            .copy(&source, &target, self.write_policy.overwrite())
            .await
            .map_err(classify)?;
        debug!(to = %target, bytes = written, "Copied");
        Ok(())
    }

    async fn ensure_target_parent(&self, target: &ClusterPath) -> OperationResult<()> {
        let Some(parent) = target.parent() else {
            return Err(Error::invalid_argument("Cannot copy onto the root directory"));
        };

        match self.cluster().stat(&parent).await.map_err(classify)? {
            Some(status) if MetadataMapper::entry(&parent, &status).is_dir() => Ok(()),
            Some(_) => Err(Error::not_a_directory(format!("Not a directory: {parent}"))),
            None => match self.parent_policy {
                ParentPolicy::Reject => Err(Error::invalid_argument(format!(
                    "Target directory does not exist: {parent}"
                ))),
                ParentPolicy::CreateMissing => {
                    debug!(path = %parent, "Creating missing target directory");
                    if self
                        .cluster()
                        .make_directory(&parent)
                        .await
                        .map_err(classify)?
                    {
                        Ok(())
                    } else {
                        Err(Error::not_a_directory(format!(
                            "Cannot create target directory: {parent}"
                        )))
                    }
                }
            },
        }
    }

    pub async fn exist_file(&self, path: &str) -> OperationResult<bool> {
        let path = validate_path(path)?;
        debug!(path = %path, "Checking existence");
        self.cluster().exists(&path).await.map_err(classify)
    }
}

#[cfg(test)]
mod tests {
    use dfs_domain::Environment;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::chunked;
    use crate::mock::MockInfrastructure;

    fn setup() -> (Arc<MockInfrastructure>, FileFacade<MockInfrastructure>) {
        setup_with(|environment| environment)
    }

    fn setup_with(
        configure: impl FnOnce(Environment) -> Environment,
    ) -> (Arc<MockInfrastructure>, FileFacade<MockInfrastructure>) {
        let environment = Environment::default()
            .cluster_endpoint("memory://".to_string())
            .chunk_size(MockInfrastructure::CHUNK_SIZE)
            .block_size(16u64);
        let infra = Arc::new(MockInfrastructure::with_environment(configure(environment)));
        let facade = FileFacade::new(infra.clone());
        (infra, facade)
    }

    fn content(bytes: &[u8]) -> ByteStream {
        chunked(Bytes::copy_from_slice(bytes), MockInfrastructure::CHUNK_SIZE)
    }

    fn path(raw: &str) -> ClusterPath {
        ClusterPath::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn test_blank_paths_never_reach_the_cluster() {
        let (infra, facade) = setup();
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("x").display().to_string();

        for blank in ["", "   ", "\t\n"] {
            let outcomes = vec![
                facade.create_directory(blank).await.err(),
                facade.read_directory_info(blank).await.err(),
                facade.get_block_locations(blank).await.err(),
                facade.create_file(blank, content(b"x")).await.err(),
                facade.read_file_as_text(blank).await.err(),
                facade.read_file_as_bytes(blank).await.err(),
                facade.open_file(blank).await.err(),
                facade.list_directory(blank).await.err(),
                facade.rename(blank, "/b").await.err(),
                facade.rename("/a", blank).await.err(),
                facade.delete_file(blank).await.err(),
                facade.upload(blank, "/b").await.err(),
                facade.upload(&local, blank).await.err(),
                facade.download(blank, &local).await.err(),
                facade.download("/a", blank).await.err(),
                facade.copy(blank, "/b").await.err(),
                facade.copy("/a", blank).await.err(),
                facade.exist_file(blank).await.err(),
            ];

            for outcome in outcomes {
                assert_eq!(outcome.map(|error| error.kind), Some(ErrorKind::InvalidArgument));
            }
        }

        assert_eq!(infra.cluster().calls(), 0);
    }

    #[tokio::test]
    async fn test_create_directory_is_listed_by_parent() {
        let (_infra, facade) = setup();

        assert!(facade.create_directory("/data/logs").await.unwrap());
        assert!(facade.exist_file("/data/logs").await.unwrap());

        let actual = facade.read_directory_info("/data").await.unwrap();
        assert_eq!(actual.len(), 1);
        assert_eq!(actual[0].name, "logs");
        assert_eq!(actual[0].path, path("/data/logs"));
        assert_eq!(actual[0].kind, EntryKind::Directory);
        assert_eq!(actual[0].owner, "hdfs");
    }

    #[tokio::test]
    async fn test_create_directory_blocked_by_file() {
        let (_infra, facade) = setup();
        facade.create_file("/f", content(b"x")).await.unwrap();

        assert!(!facade.create_directory("/f").await.unwrap());
    }

    #[tokio::test]
    async fn test_read_directory_info_errors() {
        let (_infra, facade) = setup();
        facade.create_file("/f", content(b"x")).await.unwrap();

        let missing = facade.read_directory_info("/missing").await.unwrap_err();
        assert_eq!(missing.kind, ErrorKind::NotFound);
        let file = facade.read_directory_info("/f").await.unwrap_err();
        assert_eq!(file.kind, ErrorKind::NotADirectory);
    }

    #[tokio::test]
    async fn test_round_trip_sizes() {
        let (_infra, facade) = setup();
        let multi_chunk = (0..=255u8).cycle().take(MockInfrastructure::CHUNK_SIZE * 5 + 3);
        let fixtures: Vec<Vec<u8>> = vec![vec![], vec![42], multi_chunk.collect()];

        for (index, fixture) in fixtures.into_iter().enumerate() {
            let target = format!("/round/trip-{index}");
            facade.create_file(&target, content(&fixture)).await.unwrap();

            let actual = facade.read_file_as_bytes(&target).await.unwrap();
            assert_eq!(actual.to_vec(), fixture);
        }
    }

    #[tokio::test]
    async fn test_created_file_metadata() {
        let (_infra, facade) = setup();
        facade.create_file("/d/a.txt", content(b"hello")).await.unwrap();

        let actual = facade.read_directory_info("/d").await.unwrap();
        assert_eq!(actual.len(), 1);
        assert_eq!(actual[0].kind, EntryKind::File);
        assert_eq!(actual[0].size, Some(5));
    }

    #[tokio::test]
    async fn test_create_file_rejects_existing_by_default() {
        let (_infra, facade) = setup();
        facade.create_file("/f", content(b"first")).await.unwrap();

        let actual = facade.create_file("/f", content(b"second")).await.unwrap_err();

        assert_eq!(actual.kind, ErrorKind::AlreadyExists);
        assert_eq!(facade.read_file_as_text("/f").await.unwrap(), "first");
    }

    #[tokio::test]
    async fn test_create_file_with_overwrite() {
        let (_infra, facade) = setup();
        facade.create_file("/f", content(b"first")).await.unwrap();

        facade
            .create_file_with("/f", content(b"second"), WritePolicy::Overwrite)
            .await
            .unwrap();

        assert_eq!(facade.read_file_as_text("/f").await.unwrap(), "second");
    }

    #[tokio::test]
    async fn test_configured_overwrite_policy() {
        let (_infra, facade) =
            setup_with(|environment| environment.write_policy(WritePolicy::Overwrite));
        facade.create_file("/f", content(b"first")).await.unwrap();
        facade.create_file("/f", content(b"second")).await.unwrap();

        assert_eq!(facade.read_file_as_text("/f").await.unwrap(), "second");
    }

    #[tokio::test]
    async fn test_create_file_onto_directory() {
        let (_infra, facade) = setup();
        facade.create_directory("/d").await.unwrap();

        let actual = facade
            .create_file_with("/d", content(b"x"), WritePolicy::Overwrite)
            .await
            .unwrap_err();
        assert_eq!(actual.kind, ErrorKind::NotAFile);
    }

    #[tokio::test]
    async fn test_create_file_failed_upload_leaves_nothing() {
        let (_infra, facade) = setup();
        let broken: ByteStream = Box::pin(futures::stream::iter(vec![
            Ok(Bytes::from_static(b"part")),
            Err(anyhow::anyhow!("client disconnected")),
        ]));

        let actual = facade.create_file("/f", broken).await.unwrap_err();

        assert_eq!(actual.kind, ErrorKind::IoFailure);
        assert!(!facade.exist_file("/f").await.unwrap());
    }

    #[tokio::test]
    async fn test_read_file_as_text_is_lossy() {
        let (_infra, facade) = setup();
        facade.create_file("/f", content(b"ok \xff")).await.unwrap();

        let actual = facade.read_file_as_text("/f").await.unwrap();
        assert_eq!(actual, "ok \u{fffd}");
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let (_infra, facade) = setup();

        let text = facade.read_file_as_text("/missing").await.unwrap_err();
        let bytes = facade.read_file_as_bytes("/missing").await.unwrap_err();

        assert_eq!(text.kind, ErrorKind::NotFound);
        assert_eq!(bytes.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_list_directory() {
        let (_infra, facade) = setup();
        facade.create_file("/d/b.txt", content(b"b")).await.unwrap();
        facade.create_directory("/d/a").await.unwrap();

        let actual = facade.list_directory("/d").await.unwrap();

        let expected = vec![
            ListItem { name: "a".to_string(), path: path("/d/a"), kind: EntryKind::Directory },
            ListItem { name: "b.txt".to_string(), path: path("/d/b.txt"), kind: EntryKind::File },
        ];
        assert_eq!(actual, expected);
    }

    #[tokio::test]
    async fn test_list_directory_of_file_and_absent_path() {
        let (_infra, facade) = setup();
        facade.create_file("/d/b.txt", content(b"b")).await.unwrap();

        let file = facade.list_directory("/d/b.txt").await.unwrap();
        assert_eq!(
            file,
            vec![ListItem {
                name: "b.txt".to_string(),
                path: path("/d/b.txt"),
                kind: EntryKind::File
            }]
        );
        assert!(facade.list_directory("/nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_block_locations() {
        let (_infra, facade) = setup();
        let fixture = vec![7u8; 40];
        facade.create_file("/f", content(&fixture)).await.unwrap();

        let actual = facade.get_block_locations("/f").await.unwrap();

        let ranges = actual
            .iter()
            .map(|block| (block.offset, block.length))
            .collect::<Vec<_>>();
        assert_eq!(ranges, vec![(0, 16), (16, 16), (32, 8)]);
        assert_eq!(actual[0].hosts, vec!["localhost".to_string()]);
    }

    #[tokio::test]
    async fn test_block_locations_errors() {
        let (_infra, facade) = setup();
        facade.create_directory("/d").await.unwrap();

        let missing = facade.get_block_locations("/missing").await.unwrap_err();
        assert_eq!(missing.kind, ErrorKind::NotFound);
        let directory = facade.get_block_locations("/d").await.unwrap_err();
        assert_eq!(directory.kind, ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (_infra, facade) = setup();
        facade.create_file("/f", content(b"x")).await.unwrap();

        assert!(facade.delete_file("/f").await.unwrap());
        assert!(!facade.exist_file("/f").await.unwrap());
        assert!(!facade.delete_file("/f").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_directory_tree() {
        let (_infra, facade) = setup();
        facade.create_file("/d/e/f", content(b"x")).await.unwrap();

        assert!(facade.delete_file("/d").await.unwrap());
        assert!(!facade.exist_file("/d/e/f").await.unwrap());
    }

    #[tokio::test]
    async fn test_rename_absent_leaves_namespace_unchanged() {
        let (infra, facade) = setup();
        facade.create_directory("/a").await.unwrap();
        let before = infra.cluster().paths();

        let actual = facade.rename("/a/missing", "/a/new").await.unwrap();

        assert!(!actual);
        assert_eq!(infra.cluster().paths(), before);
    }

    #[tokio::test]
    async fn test_rename_moves_file() {
        let (_infra, facade) = setup();
        facade.create_file("/a/old", content(b"payload")).await.unwrap();

        assert!(facade.rename("/a/old", "/a/new").await.unwrap());

        assert!(!facade.exist_file("/a/old").await.unwrap());
        assert_eq!(facade.read_file_as_text("/a/new").await.unwrap(), "payload");
    }

    #[tokio::test]
    async fn test_rename_into_missing_parent() {
        let (_infra, facade) = setup();
        facade.create_file("/a/old", content(b"payload")).await.unwrap();

        assert!(!facade.rename("/a/old", "/b/new").await.unwrap());
        assert!(facade.exist_file("/a/old").await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_creates_to_distinct_paths() {
        let (_infra, facade) = setup();

        let (first, second) = tokio::join!(
            facade.create_file("/c/one", content(b"first file")),
            facade.create_file("/c/two", content(b"second file")),
        );
        first.unwrap();
        second.unwrap();

        assert_eq!(facade.read_file_as_text("/c/one").await.unwrap(), "first file");
        assert_eq!(facade.read_file_as_text("/c/two").await.unwrap(), "second file");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_to_same_path() {
        let (_infra, facade) = setup();
        let first_payload = vec![1u8; MockInfrastructure::CHUNK_SIZE * 32];
        let second_payload = vec![2u8; MockInfrastructure::CHUNK_SIZE * 16];

        for round in 0..10 {
            let target = format!("/same/{round}");
            let first = {
                let (facade, target, payload) =
                    (facade.clone(), target.clone(), first_payload.clone());
                tokio::spawn(async move { facade.create_file(&target, content(&payload)).await })
            };
            let second = {
                let (facade, target, payload) =
                    (facade.clone(), target.clone(), second_payload.clone());
                tokio::spawn(async move { facade.create_file(&target, content(&payload)).await })
            };

            let outcomes = [first.await.unwrap(), second.await.unwrap()];
            let created = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
            let refused = outcomes
                .iter()
                .filter(|outcome| {
                    matches!(outcome, Err(error) if error.kind == ErrorKind::AlreadyExists)
                })
                .count();
            assert_eq!((created, refused), (1, 1));

            let actual = facade.read_file_as_bytes(&target).await.unwrap().to_vec();
            assert!(actual == first_payload || actual == second_payload);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_create_and_delete_same_path() {
        let (_infra, facade) = setup();
        let fixture = vec![9u8; MockInfrastructure::CHUNK_SIZE * 64];

        for _ in 0..20 {
            let writer = facade.clone();
            let deleter = facade.clone();
            let payload = fixture.clone();
            let create = tokio::spawn(async move {
                writer
                    .create_file_with("/race", content(&payload), WritePolicy::Overwrite)
                    .await
            });
            let delete = tokio::spawn(async move { deleter.delete_file("/race").await });

            create.await.unwrap().unwrap();
            delete.await.unwrap().unwrap();

            match facade.read_file_as_bytes("/race").await {
                Ok(actual) => assert_eq!(actual.to_vec(), fixture),
                Err(error) => assert_eq!(error.kind, ErrorKind::NotFound),
            }
        }
    }

    #[tokio::test]
    async fn test_copy_missing_source() {
        let (_infra, facade) = setup();
        facade.create_directory("/b").await.unwrap();

        let actual = facade.copy("/a/src.txt", "/b/dst.txt").await.unwrap_err();

        assert_eq!(actual.kind, ErrorKind::NotFound);
        assert!(!facade.exist_file("/b/dst.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_copy_rejects_missing_target_parent() {
        let (_infra, facade) = setup();
        facade.create_file("/a/src.txt", content(b"data")).await.unwrap();

        let actual = facade.copy("/a/src.txt", "/b/dst.txt").await.unwrap_err();

        assert_eq!(actual.kind, ErrorKind::InvalidArgument);
        assert!(!facade.exist_file("/b").await.unwrap());
    }

    #[tokio::test]
    async fn test_copy_creates_missing_target_parent() {
        let (_infra, facade) =
            setup_with(|environment| environment.parent_policy(ParentPolicy::CreateMissing));
        facade.create_file("/a/src.txt", content(b"data")).await.unwrap();

        facade.copy("/a/src.txt", "/b/dst.txt").await.unwrap();

        assert_eq!(facade.read_file_as_text("/b/dst.txt").await.unwrap(), "data");
        assert_eq!(facade.read_file_as_text("/a/src.txt").await.unwrap(), "data");
    }

    #[tokio::test]
    async fn test_copy_onto_existing_target() {
        let (_infra, facade) = setup();
        facade.create_file("/a/src.txt", content(b"new")).await.unwrap();
        facade.create_file("/a/dst.txt", content(b"old")).await.unwrap();

        let actual = facade.copy("/a/src.txt", "/a/dst.txt").await.unwrap_err();

        assert_eq!(actual.kind, ErrorKind::AlreadyExists);
        assert_eq!(facade.read_file_as_text("/a/dst.txt").await.unwrap(), "old");
    }

    #[tokio::test]
    async fn test_copy_directory_source() {
        let (_infra, facade) = setup();
        facade.create_directory("/a/dir").await.unwrap();

        let actual = facade.copy("/a/dir", "/a/other").await.unwrap_err();
        assert_eq!(actual.kind, ErrorKind::NotAFile);
    }

    #[tokio::test]
    async fn test_copy_cleans_up_after_read_failure() {
        let (infra, facade) = setup();
        facade
            .create_file("/a/src.txt", content(b"more than one chunk"))
            .await
            .unwrap();
        infra.cluster().fail_reads_of(&path("/a/src.txt"));

        let actual = facade.copy("/a/src.txt", "/a/dst.txt").await.unwrap_err();

        assert_eq!(actual.kind, ErrorKind::IoFailure);
        assert!(!facade.exist_file("/a/dst.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_upload_and_download() {
        let (_infra, facade) = setup();
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("in.bin");
        let destination = dir.path().join("out.bin");
        let fixture = (0..100u8).collect::<Vec<_>>();
        tokio::fs::write(&source, &fixture).await.unwrap();

        facade
            .upload(&source.display().to_string(), "/remote/in.bin")
            .await
            .unwrap();
        facade
            .download("/remote/in.bin", &destination.display().to_string())
            .await
            .unwrap();

        let actual = tokio::fs::read(&destination).await.unwrap();
        assert_eq!(actual, fixture);
    }

    #[tokio::test]
    async fn test_upload_replaces_remote_target() {
        let (_infra, facade) = setup();
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("in.txt");
        tokio::fs::write(&source, "fresh").await.unwrap();
        facade.create_file("/remote/in.txt", content(b"stale")).await.unwrap();

        facade
            .upload(&source.display().to_string(), "/remote/in.txt")
            .await
            .unwrap();

        assert_eq!(facade.read_file_as_text("/remote/in.txt").await.unwrap(), "fresh");
    }

    #[tokio::test]
    async fn test_upload_missing_local_source() {
        let (infra, facade) = setup();
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("missing.txt");

        let actual = facade
            .upload(&source.display().to_string(), "/remote/x")
            .await
            .unwrap_err();

        assert_eq!(actual.kind, ErrorKind::IoFailure);
        assert_eq!(infra.cluster().calls(), 0);
    }

    #[tokio::test]
    async fn test_download_missing_remote() {
        let (_infra, facade) = setup();
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("out.txt");

        let actual = facade
            .download("/missing", &destination.display().to_string())
            .await
            .unwrap_err();

        assert_eq!(actual.kind, ErrorKind::NotFound);
        assert!(!destination.exists());
    }

    #[tokio::test]
    async fn test_download_read_failure_leaves_no_local_file() {
        let (infra, facade) = setup();
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("out.txt");
        facade
            .create_file("/remote/f", content(b"several chunks long"))
            .await
            .unwrap();
        infra.cluster().fail_reads_of(&path("/remote/f"));

        let actual = facade
            .download("/remote/f", &destination.display().to_string())
            .await
            .unwrap_err();

        assert_eq!(actual.kind, ErrorKind::IoFailure);
        assert!(!destination.exists());
    }

    #[tokio::test]
    async fn test_cluster_unavailable() {
        let (infra, facade) = setup();
        infra.cluster().set_available(false);

        let actual = facade.exist_file("/any").await.unwrap_err();
        assert_eq!(actual.kind, ErrorKind::ClusterUnavailable);

        let actual = facade.create_file("/any", content(b"x")).await.unwrap_err();
        assert_eq!(actual.kind, ErrorKind::ClusterUnavailable);
    }
}
