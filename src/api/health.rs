use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::AppState;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy; reports which backend would serve")
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let backend = if state.store.is_durable_enabled() {
        "durable"
    } else {
        "memory"
    };
    Json(json!({
        "status": "ok",
        "service": "quotarium",
        "version": env!("CARGO_PKG_VERSION"),
        "backend": backend
    }))
}
