mod constants;
mod error;
mod routes;
mod schema;
mod storage;

use std::sync::Arc;

use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::storage::{DocumentStore, StoreError};

/// Process configuration, read from the environment once at startup and
/// passed explicitly from there on.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub database_name: Option<String>,
    pub port: u16,
}

impl Config {
    fn from_env() -> Self {
        Self {
            database_url: read_env("DATABASE_URL"),
            database_name: read_env("DATABASE_NAME"),
            port: read_env("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
        }
    }
}

fn read_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Shared state handed to every handler
pub struct AppState {
    pub config: Config,
    pub store: Option<DocumentStore>,
}

impl AppState {
    /// The store handle, or `Unavailable` when the service started without
    /// one.
    pub fn store(&self) -> Result<&DocumentStore, StoreError> {
        self.store.as_ref().ok_or(StoreError::Unavailable)
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".parse().unwrap()),
        )
        .compact()
        .init();

    let config = Config::from_env();

    // A missing or unreachable store degrades the service, it never stops
    // it: `/` and `/test` keep answering either way.
    let store = match &config.database_url {
        Some(url) => match DocumentStore::connect(url, config.database_name.as_deref()).await {
            Ok(store) => {
                info!("document store connected");
                Some(store)
            }
            Err(err) => {
                warn!(error = %err, "document store unavailable, starting degraded");
                None
            }
        },
        None => {
            warn!("DATABASE_URL not set, starting without a document store");
            None
        }
    };

    let port = config.port;
    let state = Arc::new(AppState { config, store });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::build_routes()
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {}: {}", addr, e));

    info!("listening on http://{}", addr);
    axum::serve(listener, app).await.expect("Server failed");
}
