/// Stand-in for the product service: accepts forwarded rows on
/// `POST /api/add_product/` so the forwarder can be run end to end locally.
use axum::{http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use clap::Parser;
use hyper::Server;
use inventory_forwarder::logging;
use serde_json::{json, Value};
use std::net::SocketAddr;
use tracing::info;

#[derive(Parser)]
#[command(name = "mock-downstream")]
#[command(about = "Local product service that accepts forwarded inventory rows")]
struct Args {
    #[arg(long, default_value_t = 8000)]
    port: u16,
}

async fn add_product(Json(body): Json<Value>) -> impl IntoResponse {
    match body.get("product_id").and_then(Value::as_str) {
        Some(id) if !id.is_empty() => {
            info!("Accepted product {}", id);
            (
                StatusCode::OK,
                Json(json!({ "ok": true, "product_id": id })),
            )
                .into_response()
        }
        _ => (StatusCode::BAD_REQUEST, "product_id is required").into_response(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _log_guard = logging::init_logging("mock-downstream.log");
    let args = Args::parse();

    let app = Router::new().route("/api/add_product/", post(add_product));
    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    info!("Mock product service on http://{}/api/add_product/", addr);
    Server::try_bind(&addr)?.serve(app.into_make_service()).await?;
    Ok(())
}
