use std::path::Path;

use anyhow::Result;
use dfs_domain::{ByteStream, Environment};
use dfs_fs::LocalFS;

use crate::{EnvironmentService, Infrastructure, LocalFsService, MemoryCluster};

pub struct MockLocalFs;

#[async_trait::async_trait]
impl LocalFsService for MockLocalFs {
    async fn read_chunks(&self, path: &Path, chunk_size: usize) -> Result<ByteStream> {
        Ok(Box::pin(LocalFS::read_chunks(path, chunk_size).await?))
    }

    async fn write_stream(&self, path: &Path, content: ByteStream) -> Result<u64> {
        LocalFS::write_stream(path, content).await
    }
}

pub struct MockEnvironmentService(Environment);

impl EnvironmentService for MockEnvironmentService {
    fn get_environment(&self) -> Environment {
        self.0.clone()
    }
}

pub struct MockInfrastructure {
    cluster: MemoryCluster,
    local_fs: MockLocalFs,
    environment: MockEnvironmentService,
}

impl MockInfrastructure {
    /// Small chunks so that short fixtures already span several of them.
    pub const CHUNK_SIZE: usize = 4;

    pub fn new() -> Self {
        Self::with_environment(
            Environment::default()
                .cluster_endpoint("memory://".to_string())
                .chunk_size(Self::CHUNK_SIZE)
                .block_size(16u64),
        )
    }

    pub fn with_environment(environment: Environment) -> Self {
        let cluster = MemoryCluster::new(environment.identity.clone())
            .with_chunk_size(environment.chunk_size)
            .with_block_size(environment.block_size);
        Self {
            cluster,
            local_fs: MockLocalFs,
            environment: MockEnvironmentService(environment),
        }
    }
}

impl Infrastructure for MockInfrastructure {
    type Cluster = MemoryCluster;
    type LocalFsService = MockLocalFs;
    type EnvironmentService = MockEnvironmentService;

    fn cluster(&self) -> &Self::Cluster {
        &self.cluster
    }

    fn local_fs_service(&self) -> &Self::LocalFsService {
        &self.local_fs
    }

    fn environment_service(&self) -> &Self::EnvironmentService {
        &self.environment
    }
}
