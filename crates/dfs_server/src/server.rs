use std::future::Future;

use anyhow::{Context, Result};
use dfs_services::{FileFacade, Infrastructure};
use tokio::net::TcpListener;
use tracing::info;

use crate::router;

/// HTTP front of the gateway. Every request shares the one facade, and so
/// the one cluster session behind it.
pub struct Server<F> {
    facade: FileFacade<F>,
}

impl<F: Infrastructure> Server<F> {
    pub fn new(facade: FileFacade<F>) -> Self {
        Self { facade }
    }

    /// Serves until `shutdown` resolves, then lets in-flight requests finish.
    pub async fn launch(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let address = listener.local_addr().context("Listener has no local address")?;
        info!("Server running on http://{address}");

        axum::serve(listener, router(self.facade))
            .with_graceful_shutdown(shutdown)
            .await
            .context("HTTP server failed")?;

        info!("Server stopped");
        Ok(())
    }
}
