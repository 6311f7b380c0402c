use axum::response::Json;
use serde_json::{json, Value};

use crate::utils::time::{format_timestamp, now_utc};

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": format_timestamp(now_utc()),
    }))
}
