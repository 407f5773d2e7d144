//! HTTP shim over the runner.
//!
//! - `POST /backtest?from_tz=US/Central` — CSV in the request body.
//!   `200` with the summary (`{}` when no trades), `400` with `{"detail": ...}`
//!   on any ingestion or engine error.
//! - `GET /health` — `ok`.
//!
//! Backtests run on the blocking pool; the core is synchronous.
//!
//! Uploads up to [`MAX_UPLOAD_BYTES`] are accepted, several years of minute
//! bars. axum's 2 MB default would stop at about a month.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, warn};

use dojiback_runner::{run_backtest_from_reader, BacktestConfig};

/// Largest accepted CSV upload.
pub const MAX_UPLOAD_BYTES: usize = 256 * 1024 * 1024;

/// Query params for the backtest endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct BacktestQuery {
    /// Zone of naive timestamps in the uploaded CSV. Defaults to the config's.
    pub from_tz: Option<String>,
}

pub fn router(config: BacktestConfig) -> Router {
    Router::new()
        .route("/backtest", post(backtest))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(Arc::new(config))
}

pub async fn serve(addr: SocketAddr, config: BacktestConfig) -> Result<()> {
    let app = router(config);
    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

/// POST /backtest - run one backtest over the uploaded CSV
pub async fn backtest(
    State(config): State<Arc<BacktestConfig>>,
    Query(params): Query<BacktestQuery>,
    body: Bytes,
) -> (StatusCode, Json<serde_json::Value>) {
    let mut config = (*config).clone();
    if let Some(from_tz) = params.from_tz {
        config.data.from_tz = from_tz;
    }

    let outcome = tokio::task::spawn_blocking(move || {
        run_backtest_from_reader(&body[..], &config, "request")
    })
    .await;

    match outcome {
        Ok(Ok(result)) => {
            let summary = match result.summary {
                Some(summary) => serde_json::json!(summary),
                None => serde_json::json!({}),
            };
            (StatusCode::OK, Json(summary))
        }
        Ok(Err(e)) => {
            warn!(error = %e, "backtest request rejected");
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"detail": e.to_string()})),
            )
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"detail": e.to_string()})),
        ),
    }
}
