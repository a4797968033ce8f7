use axum::response::Json;
use serde_json::{Value, json};

use crate::logging::SERVICE_NAME;

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION")
    }))
}
