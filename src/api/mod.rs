pub mod collections;
pub mod error;
pub mod health;

use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Collections, keyed by ?name=
        .route(
            "/collections",
            get(collections::get_collections)
                .post(collections::create_collection)
                .put(collections::rename_collection)
                .delete(collections::delete_collection),
        )
        // Quote membership, matched by content
        .route(
            "/collections/quotes",
            post(collections::add_quote).delete(collections::remove_quote),
        )
        .with_state(state)
}
