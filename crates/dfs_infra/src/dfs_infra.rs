use std::sync::Arc;

use anyhow::Result;
use dfs_domain::Environment;
use dfs_services::Infrastructure;

use crate::env::GatewayEnvironmentService;
use crate::local_fs::GatewayLocalFs;
use crate::session::ClusterSession;

#[derive(Clone)]
pub struct GatewayInfra {
    session: Arc<ClusterSession>,
    local_fs: Arc<GatewayLocalFs>,
    environment_service: Arc<GatewayEnvironmentService>,
}

impl GatewayInfra {
    /// Opens the cluster session; call once at startup.
    pub async fn new(environment: Environment) -> Result<Self> {
        let session = Arc::new(ClusterSession::connect(&environment).await?);
        Ok(Self {
            session,
            local_fs: Arc::new(GatewayLocalFs::new()),
            environment_service: Arc::new(GatewayEnvironmentService::new(environment)),
        })
    }

    pub fn session(&self) -> &ClusterSession {
        &self.session
    }
}

impl Infrastructure for GatewayInfra {
    type Cluster = ClusterSession;
    type LocalFsService = GatewayLocalFs;
    type EnvironmentService = GatewayEnvironmentService;

    fn cluster(&self) -> &Self::Cluster {
        &self.session
    }

    fn local_fs_service(&self) -> &Self::LocalFsService {
        &self.local_fs
    }

    fn environment_service(&self) -> &Self::EnvironmentService {
        &self.environment_service
    }
}
