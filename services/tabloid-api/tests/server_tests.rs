//! HTTP layer tests: the real router over in-memory fakes.
//!
//! The coordinator's consistency contract is covered in the ingestion
//! crate; these tests pin down the wire format — multipart field names,
//! response payload shapes, and the status each failure maps to.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use chrono::NaiveDate;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use ingestion::IngestionCoordinator;
use tabloid_api::server::{
    build_router, ErrorResponse, HealthResponse, ServerState, SubmitResponse,
};
use test_utils::{MemoryDb, MemoryRegions, MemoryUploader, MemoryWriter, PNG_BYTES, TEXT_BYTES};

const BOUNDARY: &str = "tabloid-test-boundary";

struct Harness {
    db: Arc<MemoryDb>,
    uploader: Arc<MemoryUploader>,
    state: Arc<ServerState>,
}

impl Harness {
    fn new() -> Self {
        let db = Arc::new(MemoryDb::default());
        let regions = Arc::new(MemoryRegions::default().with_region(144, "Sudeste"));
        let uploader = Arc::new(MemoryUploader::default());
        let writer = Arc::new(MemoryWriter::new(Arc::clone(&db)));
        let coordinator = IngestionCoordinator::new(
            regions,
            Arc::clone(&uploader) as Arc<dyn ingestion::ObjectUploader>,
            writer,
        );
        Self {
            db,
            uploader,
            state: Arc::new(ServerState { coordinator }),
        }
    }

    async fn submit(&self, body: Vec<u8>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/tabloids")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();

        let response = build_router(Arc::clone(&self.state))
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}

/// Hand-rolled multipart body so the tests control the exact fields sent.
struct FormBuilder {
    body: Vec<u8>,
}

impl FormBuilder {
    fn new() -> Self {
        Self { body: Vec::new() }
    }

    fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
        self
    }

    fn file(mut self, name: &str, filename: &str, payload: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, name, filename
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(payload);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn build(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        self.body
    }
}

fn submission_form(image: &[u8]) -> FormBuilder {
    FormBuilder::new()
        .text("name", "Tabloide Marcos")
        .text("region_id", "144")
        .text("start_validity_date", "2024-04-08")
        .text("end_validity_date", "2024-04-10")
        .file("file", "pagina-1.png", image)
}

#[tokio::test]
async fn test_submit_accepts_multipart_form() {
    let h = Harness::new();
    let (status, body) = h.submit(submission_form(PNG_BYTES).build()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Tabloide Marcos");
    assert_eq!(body["region_id"], 144);
    assert_eq!(body["start_validity_date"], "2024-04-08");
    assert_eq!(body["end_validity_date"], "2024-04-10");

    let tabloid_id = body["tabloid_id"].as_i64().unwrap();
    let image_url = body["image_url"].as_str().unwrap();
    assert!(image_url.contains(&format!("campanha-{}-", tabloid_id)));

    assert_eq!(h.db.tabloids().len(), 1);
    assert_eq!(h.db.image_refs_for(tabloid_id).len(), 1);
    assert_eq!(h.uploader.stored_keys().len(), 1);
}

#[tokio::test]
async fn test_submit_missing_file_field_is_rejected() {
    let h = Harness::new();
    let body = FormBuilder::new()
        .text("name", "Tabloide Marcos")
        .text("region_id", "144")
        .text("start_validity_date", "2024-04-08")
        .text("end_validity_date", "2024-04-10")
        .build();

    let (status, payload) = h.submit(body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(payload["error"]
        .as_str()
        .unwrap()
        .contains("file is required"));
    assert!(h.db.tabloids().is_empty());
    assert!(h.uploader.stored_keys().is_empty());
}

#[tokio::test]
async fn test_submit_missing_name_field_is_rejected() {
    let h = Harness::new();
    let body = FormBuilder::new()
        .text("region_id", "144")
        .text("start_validity_date", "2024-04-08")
        .text("end_validity_date", "2024-04-10")
        .file("file", "pagina-1.png", PNG_BYTES)
        .build();

    let (status, payload) = h.submit(body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(payload["error"]
        .as_str()
        .unwrap()
        .contains("name is required"));
}

#[tokio::test]
async fn test_submit_rejects_malformed_region_id() {
    let h = Harness::new();
    let body = FormBuilder::new()
        .text("name", "Tabloide Marcos")
        .text("region_id", "not-a-number")
        .text("start_validity_date", "2024-04-08")
        .text("end_validity_date", "2024-04-10")
        .file("file", "pagina-1.png", PNG_BYTES)
        .build();

    let (status, payload) = h.submit(body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(payload["error"].as_str().unwrap().contains("region_id"));
    assert!(h.db.tabloids().is_empty());
}

#[tokio::test]
async fn test_submit_unknown_region_maps_to_404() {
    let h = Harness::new();
    let body = submission_form(PNG_BYTES)
        .text("region_id", "999999")
        .build();

    // The later region_id field wins in the decode loop.
    let (status, payload) = h.submit(body).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(payload["error"].as_str().unwrap().contains("999999"));
}

#[tokio::test]
async fn test_submit_text_payload_maps_to_400() {
    let h = Harness::new();
    let (status, _payload) = h.submit(submission_form(TEXT_BYTES).build()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(h.uploader.stored_keys().is_empty());
    assert!(h.db.tabloids().is_empty());
}

#[tokio::test]
async fn test_health_endpoint() {
    let h = Harness::new();
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = build_router(h.state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "tabloid-api");
}

#[test]
fn test_submit_response_field_names() {
    let response = SubmitResponse {
        tabloid_id: 57,
        name: "Tabloide Marcos".to_string(),
        region_id: 144,
        start_validity_date: NaiveDate::from_ymd_opt(2024, 4, 8).unwrap(),
        end_validity_date: NaiveDate::from_ymd_opt(2024, 4, 10).unwrap(),
        image_url: "RPA/v3/57/campanha-57-x-pagina-1.jpeg".to_string(),
    };

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["tabloid_id"], 57);
    assert_eq!(json["region_id"], 144);
    assert_eq!(json["start_validity_date"], "2024-04-08");
    assert_eq!(json["end_validity_date"], "2024-04-10");
    assert_eq!(json["image_url"], "RPA/v3/57/campanha-57-x-pagina-1.jpeg");
}

#[test]
fn test_error_response_shape() {
    let response = ErrorResponse {
        error: "Invalid request: name is required".to_string(),
    };

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["error"], "Invalid request: name is required");
    assert_eq!(json.as_object().unwrap().len(), 1);
}

#[test]
fn test_health_response_shape() {
    let response = HealthResponse {
        status: "ok".to_string(),
        service: "tabloid-api".to_string(),
        version: "0.1.0".to_string(),
    };

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "tabloid-api");
    assert_eq!(json["version"], "0.1.0");
}
