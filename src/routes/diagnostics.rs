//! Health and store diagnostics endpoints (/ and /test)

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;
use crate::constants::DIAG_COLLECTIONS_LIMIT;
use crate::error::truncate_detail;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(root))
        .route("/test", get(diagnostics))
}

#[derive(Serialize)]
struct RootResponse {
    message: &'static str,
}

async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Anime Clips API is running",
    })
}

#[derive(Serialize)]
struct DiagnosticsResponse {
    backend: &'static str,
    database: String,
    database_url: &'static str,
    database_name: &'static str,
    connection_status: &'static str,
    collections: Vec<String>,
}

/// GET /test - report store reachability and configuration presence.
///
/// This endpoint answers 200 in every store state; failures show up as
/// strings in the body, never as an error response.
async fn diagnostics(State(state): State<Arc<AppState>>) -> Json<DiagnosticsResponse> {
    let mut response = DiagnosticsResponse {
        backend: "running",
        database: "not available".to_string(),
        database_url: presence(state.config.database_url.is_some()),
        database_name: presence(state.config.database_name.is_some()),
        connection_status: "not connected",
        collections: Vec::new(),
    };

    if let Some(store) = &state.store {
        response.connection_status = "connected";
        match store.list_collections(DIAG_COLLECTIONS_LIMIT).await {
            Ok(collections) => {
                response.database = "connected and working".to_string();
                response.collections = collections;
            }
            Err(err) => {
                response.database =
                    format!("connected but degraded: {}", truncate_detail(&err.to_string()));
            }
        }
    }

    Json(response)
}

fn presence(set: bool) -> &'static str {
    if set { "set" } else { "not set" }
}
