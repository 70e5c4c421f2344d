//! Environment loading and service wiring.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

use downpour_api::{ApiServer, DownloadHandles};
use downpour_aria2::{Aria2Adapter, Aria2Config, EVENT_BUFFER};
use downpour_config::{LogFormat, Settings};
use downpour_core::Repository;
use downpour_data::{MemoryRepository, PgRepository};

use crate::error::{AppError, AppResult};
use crate::reconciler::Reconciler;
use crate::service::LifecycleService;

/// Entry point for the application boot sequence.
///
/// # Errors
///
/// Returns an error if configuration, store, or adapter construction fails,
/// or when the API server terminates unexpectedly.
pub async fn run_app() -> AppResult<()> {
    let settings = Settings::from_env().map_err(|source| AppError::Config { source })?;
    init_logging(settings.log_format);
    info!("downpour bootstrap starting");

    let repository = build_repository(&settings).await?;
    let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
    let adapter = Arc::new(
        Aria2Adapter::new(
            Aria2Config {
                rpc_url: settings.rpc_url.clone(),
                rpc_secret: settings.rpc_secret.clone(),
                rpc_timeout: settings.rpc_timeout,
                poll_interval: settings.poll_interval,
            },
            events_tx,
        )
        .map_err(|source| AppError::Adapter { source })?,
    );

    let (notifications_stop, notifications_stop_rx) = oneshot::channel();
    let (poller_stop, poller_stop_rx) = oneshot::channel();
    let (reconciler_stop, reconciler_stop_rx) = oneshot::channel();

    let notifications = adapter.spawn_notifications(notifications_stop_rx);
    let poller = adapter.spawn_poller(poller_stop_rx);
    let reconciler = Reconciler::spawn(repository.clone(), events_rx, reconciler_stop_rx);

    let service = Arc::new(LifecycleService::new(repository.clone(), adapter.clone()));
    let handles = DownloadHandles::new(service.clone(), service, adapter);

    let api = ApiServer::new(handles, settings.api_token.clone());
    info!(addr = %settings.bind_addr, "launching api listener");
    let serve_result = api.serve(settings.bind_addr).await;

    let _ = notifications_stop.send(());
    let _ = poller_stop.send(());
    let _ = reconciler_stop.send(());
    for (name, handle) in [
        ("notifications", notifications),
        ("poller", poller),
        ("reconciler", reconciler),
    ] {
        if let Err(err) = handle.await {
            warn!(task = name, error = %err, "background task join failed");
        }
    }

    serve_result.map_err(|source| AppError::Serve { source })?;
    info!("api server shutdown complete");
    Ok(())
}

async fn build_repository(settings: &Settings) -> AppResult<Arc<dyn Repository>> {
    match &settings.store_dsn {
        Some(dsn) => {
            let pool = PgPoolOptions::new()
                .connect(dsn)
                .await
                .map_err(|err| AppError::Store {
                    operation: "pool.connect",
                    source: Box::new(err),
                })?;
            let repository = PgRepository::new(pool)
                .await
                .map_err(|err| AppError::Store {
                    operation: "migrate",
                    source: Box::new(err),
                })?;
            info!("postgres repository ready");
            Ok(Arc::new(repository))
        }
        None => {
            info!("using in-memory repository");
            Ok(Arc::new(MemoryRepository::new()))
        }
    }
}

fn init_logging(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
