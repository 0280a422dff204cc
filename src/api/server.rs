//! Axum router and handlers
//!
//! Handlers hand each request to the synchronous core on a blocking thread
//! and format the result into the response envelope.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::observability::Logger;
use crate::reports;
use crate::snapshot::ExportOutcome;

use super::errors::{ApiError, ApiResult};
use super::request::{ExportRequest, IngestRequest, ReportParams, RestoreRequest};
use super::response::Envelope;
use super::ServiceState;

/// Build the service router
pub fn router(state: Arc<ServiceState>) -> Router {
    Router::new()
        .route("/api/v1/batch-insert", post(batch_insert))
        .route("/api/v1/export", post(export))
        .route("/api/v1/restore", post(restore))
        .route("/api/v1/employees-by-quarter", get(employees_by_quarter))
        .route("/api/v1/employees-hired", get(employees_hired))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(state)
}

/// Bind and run the HTTP server until shutdown
pub async fn serve(state: Arc<ServiceState>, port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    Logger::info("SERVER_LISTENING", &[("addr", &addr.to_string())]);
    axum::serve(listener, router(state)).await
}

async fn batch_insert(
    State(state): State<Arc<ServiceState>>,
    Json(request): Json<IngestRequest>,
) -> ApiResult<Json<Envelope>> {
    let report = run_blocking(move || {
        state
            .ingestor
            .ingest(&request.table_name, &request.rows)
            .map_err(ApiError::from)
    })
    .await?;

    Ok(Json(Envelope::success(
        "batch processed",
        json!({
            "inserted": format!("{} rows", report.inserted),
            "rejected": format!("{} rows", report.rejected),
        }),
    )))
}

async fn export(
    State(state): State<Arc<ServiceState>>,
    Json(request): Json<ExportRequest>,
) -> ApiResult<Json<Envelope>> {
    let outcome = run_blocking(move || {
        state
            .exporter
            .export_table(&request.table_name)
            .map_err(ApiError::from)
    })
    .await?;

    let envelope = match outcome {
        ExportOutcome::Written { path, rows, .. } => Envelope::success(
            "table exported",
            json!({
                "path": path,
                "rows": format!("{} rows", rows),
            }),
        ),
        ExportOutcome::NothingToExport => {
            Envelope::success("nothing to export", serde_json::Value::Null)
        }
    };
    Ok(Json(envelope))
}

async fn restore(
    State(state): State<Arc<ServiceState>>,
    Json(request): Json<RestoreRequest>,
) -> ApiResult<Json<Envelope>> {
    let report = run_blocking(move || {
        state
            .restorer
            .restore_table(&request.table_name, &request.snapshot_path)
            .map_err(ApiError::from)
    })
    .await?;

    Ok(Json(Envelope::success(
        "table restored",
        json!({
            "inserted": format!("{} rows", report.inserted),
            "failed": format!("{} rows", report.failures.len()),
        }),
    )))
}

async fn employees_by_quarter(
    State(state): State<Arc<ServiceState>>,
    Query(params): Query<ReportParams>,
) -> ApiResult<Json<Envelope>> {
    let rows = run_blocking(move || {
        let mut conn = state
            .connector
            .connect()
            .map_err(reports::ReportError::from)?;
        reports::employees_by_quarter(conn.as_mut(), params.year).map_err(ApiError::from)
    })
    .await?;

    Ok(Json(Envelope::success(
        "report generated",
        serde_json::to_value(rows).unwrap_or_default(),
    )))
}

async fn employees_hired(
    State(state): State<Arc<ServiceState>>,
    Query(params): Query<ReportParams>,
) -> ApiResult<Json<Envelope>> {
    let rows = run_blocking(move || {
        let mut conn = state
            .connector
            .connect()
            .map_err(reports::ReportError::from)?;
        reports::departments_above_mean(conn.as_mut(), params.year).map_err(ApiError::from)
    })
    .await?;

    Ok(Json(Envelope::success(
        "report generated",
        serde_json::to_value(rows).unwrap_or_default(),
    )))
}

async fn run_blocking<T, F>(work: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> ApiResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
}
