use crate::app::ForwardUseCase;
use crate::config::Config;
use crate::constants::{UPLOAD_FIELD, UPLOAD_ROUTE};
use crate::error::{ForwarderError, Result};
use crate::types::UploadedFile;
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart,
    },
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Extension, Router,
};
use hyper::Server;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info, warn};

pub type SharedForwarder = Arc<ForwardUseCase>;

impl IntoResponse for ForwarderError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "inventory-forwarder",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Prometheus exposition
async fn metrics_handler() -> Response {
    match crate::metrics::render() {
        Some(body) => body.into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}

/// POST handler for CSV uploads; the sheet travels in the `file` multipart part
async fn upload_csv(
    Extension(forwarder): Extension<SharedForwarder>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Response {
    let upload = match multipart {
        Ok(multipart) => match read_upload(multipart).await {
            Ok(upload) => upload,
            Err(e) => return ForwardUseCase::reject(e).into_response(),
        },
        Err(rejection) => {
            debug!("Upload request is not multipart: {}", rejection);
            None
        }
    };

    match forwarder.process_upload(upload).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Pull the part named `file` that carries a filename; the last one wins
/// when several are attached.
///
/// Parts without a filename are plain form values, not attachments, and are
/// skipped the same way as parts with other names.
pub async fn read_upload(mut multipart: Multipart) -> Result<Option<UploadedFile>> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(invalid_upload)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };
        let content = field.bytes().await.map_err(invalid_upload)?;
        if upload.is_some() {
            debug!("Replacing earlier '{}' part with {}", UPLOAD_FIELD, filename);
        }
        upload = Some(UploadedFile::new(filename, content.to_vec()));
    }
    Ok(upload)
}

fn invalid_upload(e: MultipartError) -> ForwarderError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ForwarderError::UploadTooLarge
    } else {
        ForwarderError::InvalidUpload(e.body_text())
    }
}

/// Create the HTTP router with all routes
pub fn create_server(forwarder: SharedForwarder, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .route(UPLOAD_ROUTE, post(upload_csv))
        .route(UPLOAD_ROUTE.trim_end_matches('/'), post(upload_csv))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(Extension(forwarder))
        .layer(ServiceBuilder::new().layer(cors))
}

/// Start the HTTP server and run until Ctrl-C
pub async fn start_server(forwarder: SharedForwarder, config: &Config) -> anyhow::Result<()> {
    let addr = config.bind_addr()?;
    let app = create_server(forwarder.clone(), config.server.max_upload_bytes);

    info!("HTTP server listening on http://{}", addr);
    info!("Upload endpoint: POST {}", UPLOAD_ROUTE);
    info!("Forwarding rows to {}", forwarder.endpoint());

    Server::try_bind(&addr)?
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
