use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fii_core::domain::{CommunicationRecord, FundRecord, MonthlyDividend};
use fii_core::ingest::ExtractError;
use fii_core::reconcile::{FundTable, Pipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = fii_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let pipeline = Pipeline::from_settings(&settings)?;
    tracing::info!(data_dir = %settings.data_dir.display(), "serving extracts");

    let state = AppState {
        pipeline: Arc::new(pipeline),
    };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/funds", get(list_funds))
        .route("/funds/:ticker", get(get_fund))
        .route("/communications", get(list_communications))
        .route("/dividends/monthly", get(list_monthly_dividends))
        .route("/last-update", get(get_last_update))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Clone)]
struct AppState {
    pipeline: Arc<Pipeline>,
}

#[derive(Debug, Deserialize)]
struct TickerFilter {
    ticker: Option<String>,
}

#[derive(Debug, Serialize)]
struct ApiCommunication {
    #[serde(flatten)]
    record: CommunicationRecord,
    read_key: String,
    legacy_id: String,
    flagged: bool,
}

impl From<CommunicationRecord> for ApiCommunication {
    fn from(record: CommunicationRecord) -> Self {
        Self {
            read_key: record.read_key(),
            legacy_id: record.legacy_id(),
            flagged: record.status.is_flagged(),
            record,
        }
    }
}

#[derive(Debug, Serialize)]
struct ApiLastUpdate {
    last_update: String,
}

async fn run_blocking<T, F>(state: &AppState, stage: F) -> Result<T, StatusCode>
where
    T: Send + 'static,
    F: FnOnce(&Pipeline) -> anyhow::Result<T> + Send + 'static,
{
    let pipeline = Arc::clone(&state.pipeline);
    let result = tokio::task::spawn_blocking(move || stage(&pipeline))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "pipeline task panicked");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    result.map_err(|e| {
        if e.downcast_ref::<ExtractError>().is_some() {
            tracing::warn!(error = %format!("{e:#}"), "extract unavailable");
            StatusCode::SERVICE_UNAVAILABLE
        } else {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %format!("{e:#}"), "pipeline failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    })
}

async fn list_funds(State(state): State<AppState>) -> Result<Json<FundTable>, StatusCode> {
    let table = run_blocking(&state, |p| p.run_funds()).await?;
    Ok(Json(table))
}

async fn get_fund(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<FundRecord>, StatusCode> {
    let table = run_blocking(&state, |p| p.run_funds()).await?;
    let record = table.get(&ticker).cloned().ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(record))
}

async fn list_communications(
    State(state): State<AppState>,
    Query(filter): Query<TickerFilter>,
) -> Result<Json<Vec<ApiCommunication>>, StatusCode> {
    let table = run_blocking(&state, |p| p.run_communications()).await?;
    let items: Vec<ApiCommunication> = match filter.ticker.as_deref() {
        Some(t) => table.for_ticker(t).into_iter().cloned().map(Into::into).collect(),
        None => table.iter().cloned().map(Into::into).collect(),
    };
    Ok(Json(items))
}

async fn list_monthly_dividends(
    State(state): State<AppState>,
    Query(filter): Query<TickerFilter>,
) -> Result<Json<Vec<MonthlyDividend>>, StatusCode> {
    let rows = run_blocking(&state, |p| p.run_dividends()).await?;
    let rows = match filter.ticker.as_deref() {
        Some(t) => fii_core::dividends::for_ticker(&rows, t)
            .into_iter()
            .cloned()
            .collect(),
        None => rows,
    };
    Ok(Json(rows))
}

async fn get_last_update(
    State(state): State<AppState>,
) -> Result<Json<ApiLastUpdate>, StatusCode> {
    let last_update = run_blocking(&state, |p| Ok(p.last_update())).await?;
    Ok(Json(ApiLastUpdate { last_update }))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &fii_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
