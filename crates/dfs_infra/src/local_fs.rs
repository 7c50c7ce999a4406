use std::path::Path;

use anyhow::Result;
use dfs_domain::ByteStream;
use dfs_fs::LocalFS;
use dfs_services::LocalFsService;

pub struct GatewayLocalFs;

impl Default for GatewayLocalFs {
    fn default() -> Self {
        Self
    }
}

impl GatewayLocalFs {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl LocalFsService for GatewayLocalFs {
    async fn read_chunks(&self, path: &Path, chunk_size: usize) -> Result<ByteStream> {
        Ok(Box::pin(LocalFS::read_chunks(path, chunk_size).await?))
    }

    async fn write_stream(&self, path: &Path, content: ByteStream) -> Result<u64> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            LocalFS::create_dir_all(parent).await?;
        }
        LocalFS::write_stream(path, content).await
    }
}
