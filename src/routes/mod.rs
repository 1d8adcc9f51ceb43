pub mod clips;
pub mod diagnostics;

use axum::Router;
use std::sync::Arc;

use crate::AppState;

/// Build all routes for the API
pub fn build_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(diagnostics::routes())
        .merge(clips::routes())
}
