use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_ledger_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use rent_ledger::config::{AppConfig, ConfigError};
use rent_ledger::error::AppError;
use rent_ledger::ledger::RentLedgerService;
use rent_ledger::storage::{InMemoryLedgerStore, LedgerStore, PgLedgerStore};
use rent_ledger::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    match config.database.url.as_deref() {
        Some(url) => {
            let store = PgLedgerStore::connect(url, config.database.max_connections).await?;
            serve(&config, store).await
        }
        None => {
            warn!("DATABASE_URL not set; ledger tables are kept in memory");
            serve(&config, InMemoryLedgerStore::default()).await
        }
    }
}

pub(crate) async fn migrate() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let url = config
        .database
        .url
        .as_deref()
        .ok_or(ConfigError::MissingDatabaseUrl)?;
    let store = PgLedgerStore::connect(url, config.database.max_connections).await?;
    store.migrate().await?;
    store.close().await;

    info!("ledger schema is up to date");
    Ok(())
}

async fn serve<S>(config: &AppConfig, store: S) -> Result<(), AppError>
where
    S: LedgerStore + 'static,
{
    let backend = store.backend();
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = Arc::new(RentLedgerService::new(Arc::new(store)));

    let app = with_ledger_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, backend, "rent ledger ready");

    axum::serve(listener, app).await?;
    Ok(())
}
