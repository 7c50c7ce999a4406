use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use dfs_infra::{GatewayEnvironmentService, GatewayInfra};
use dfs_main::{init_tracing, Cli};
use dfs_server::Server;
use dfs_services::FileFacade;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let environment = cli.apply(GatewayEnvironmentService::from_env()?);
    let _guard = init_tracing(environment.log_dir.as_deref(), cli.verbose)?;

    let infra = GatewayInfra::new(environment.clone()).await?;
    let facade = FileFacade::new(Arc::new(infra.clone()));

    let listener = TcpListener::bind(&environment.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", environment.bind_address))?;

    let served = Server::new(facade).launch(listener, shutdown_signal()).await;

    infra.session().close();
    served
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for ctrl-c: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(error) => {
                warn!("Failed to listen for SIGTERM: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown requested");
}
