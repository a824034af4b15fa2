pub mod analytics;
pub mod api;
pub mod services;

use std::sync::Arc;
use common::config::Settings;
use common::storage::PgMovieStore;
use common::Result;
use services::DashboardService;
use std::future::Future;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Serves the dashboard API until Ctrl-C, then closes the database pool.
pub async fn run_dashboard(settings: &Settings) -> Result<()> {
    let store = PgMovieStore::connect(&settings.database).await?;
    let service = Arc::new(DashboardService::new(
        Arc::new(store.clone()),
        settings.dashboard.row_limit,
    ));

    // Create API router
    let api_router = api::routes(Arc::clone(&service));

    // Start the server
    let addr = format!("{}:{}", settings.dashboard.host, settings.dashboard.port);
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "Dashboard API server listening");

    let served = axum::serve(listener, api_router)
        .with_graceful_shutdown(shutdown_signal(tokio::signal::ctrl_c()))
        .await;

    store.close().await;
    served?;
    Ok(())
}

/// Resolves once `signal` fires. If the handler could not be installed the
/// server keeps running rather than stopping at once.
async fn shutdown_signal<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("shutdown requested"),
        Err(e) => {
            error!(error = %e, "failed to install Ctrl-C handler; graceful shutdown disabled");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn signal_triggers_shutdown() {
        let done = timeout(Duration::from_millis(200), shutdown_signal(async { Ok(()) })).await;
        assert!(done.is_ok());
    }

    #[tokio::test]
    async fn handler_failure_keeps_serving() {
        let failing = async { Err(std::io::Error::other("signal handler unavailable")) };
        let done = timeout(Duration::from_millis(50), shutdown_signal(failing)).await;
        assert!(done.is_err());
    }
}
