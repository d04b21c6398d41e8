//! HTTP server for the tabloid API.
//!
//! Provides endpoints for:
//! - `POST /tabloids` - Submit a tabloid (multipart form with one image)
//! - `GET /health` - Health check

use axum::{
    extract::{Extension, Multipart},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use chrono::NaiveDate;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use ingestion::{IngestionCoordinator, IngestionReceipt};
use tabloid_common::{TabloidDraft, TabloidError, TabloidResult};

/// Shared state for the HTTP server.
pub struct ServerState {
    /// Write-path coordinator
    pub coordinator: IngestionCoordinator,
}

/// Response body for a committed submission, echoing the accepted draft.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub tabloid_id: i64,
    pub name: String,
    pub region_id: i64,
    pub start_validity_date: NaiveDate,
    pub end_validity_date: NaiveDate,
    pub image_url: String,
}

impl From<IngestionReceipt> for SubmitResponse {
    fn from(receipt: IngestionReceipt) -> Self {
        Self {
            tabloid_id: receipt.tabloid_id,
            name: receipt.name,
            region_id: receipt.region_id,
            start_validity_date: receipt.start_validity,
            end_validity_date: receipt.end_validity,
            image_url: receipt.image_url,
        }
    }
}

/// Structured error payload for any failure.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// POST /tabloids - Submit a tabloid
async fn submit_handler(
    Extension(state): Extension<Arc<ServerState>>,
    multipart: Multipart,
) -> Response {
    let draft = match parse_submission(multipart).await {
        Ok(draft) => draft,
        Err(e) => return error_response(e),
    };

    info!(name = %draft.name, region_id = draft.region_id, "Received tabloid submission");

    match state.coordinator.ingest(&draft).await {
        Ok(receipt) => {
            info!(tabloid_id = receipt.tabloid_id, "Submission accepted");
            (StatusCode::OK, Json(SubmitResponse::from(receipt))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Submission failed");
            error_response(e)
        }
    }
}

/// GET /health - Health check
async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "tabloid-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn error_response(e: TabloidError) -> Response {
    let status = StatusCode::from_u16(e.http_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

/// Decode the multipart form into a draft.
///
/// Expected fields: `name`, `region_id`, `start_validity_date`,
/// `end_validity_date` (`YYYY-MM-DD`), and one `file` part. The file's
/// content-type header is ignored; the payload is sniffed downstream.
async fn parse_submission(mut multipart: Multipart) -> TabloidResult<TabloidDraft> {
    let mut name: Option<String> = None;
    let mut region_id: Option<i64> = None;
    let mut start_validity: Option<NaiveDate> = None;
    let mut end_validity: Option<NaiveDate> = None;
    let mut image: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| TabloidError::InvalidRequest(format!("invalid multipart body: {}", e)))?
    {
        let Some(field_name) = field.name().map(|n| n.to_string()) else {
            continue;
        };

        match field_name.as_str() {
            "name" => name = Some(read_text(field).await?),
            "region_id" => {
                let raw = read_text(field).await?;
                let parsed = raw.parse::<i64>().map_err(|_| {
                    TabloidError::InvalidRequest(format!("failed to parse region_id: {}", raw))
                })?;
                region_id = Some(parsed);
            }
            "start_validity_date" => {
                start_validity = Some(parse_date(&read_text(field).await?)?);
            }
            "end_validity_date" => {
                end_validity = Some(parse_date(&read_text(field).await?)?);
            }
            "file" => {
                let data = field.bytes().await.map_err(|e| {
                    TabloidError::InvalidRequest(format!("failed to read file: {}", e))
                })?;
                image = Some(data);
            }
            _ => {}
        }
    }

    Ok(TabloidDraft {
        name: name.ok_or_else(|| missing("name"))?,
        region_id: region_id.ok_or_else(|| missing("region_id"))?,
        start_validity: start_validity.ok_or_else(|| missing("start_validity_date"))?,
        end_validity: end_validity.ok_or_else(|| missing("end_validity_date"))?,
        image: image.ok_or_else(|| missing("file"))?,
    })
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> TabloidResult<String> {
    field
        .text()
        .await
        .map_err(|e| TabloidError::InvalidRequest(format!("invalid form field: {}", e)))
}

fn missing(field: &str) -> TabloidError {
    TabloidError::InvalidRequest(format!("{} is required", field))
}

/// Parse a `YYYY-MM-DD` form field into a date.
fn parse_date(raw: &str) -> TabloidResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| TabloidError::InvalidRequest(format!("failed to parse date: {}", raw)))
}

/// Build the HTTP router.
pub fn build_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/tabloids", post(submit_handler))
        .route("/health", get(health_handler))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server.
pub async fn start_server(state: Arc<ServerState>, port: u16) -> anyhow::Result<()> {
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(port = port, "Starting tabloid API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
