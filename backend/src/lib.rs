//! # Spend Categorizer Backend
//!
//! Ingests card transactions, assigns each a spending category through a
//! chat-completion model, stores them idempotently and serves
//! category-complete reports.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST handlers, CSV helper)
//!     ↓
//! Domain Layer (classifier, enricher, aggregator, services)
//!     ↓
//! Storage Layer (append-only SQLite store, collapsed view)
//! ```
//!
//! `integrations` holds the HTTP client behind the classifier's provider
//! trait. `config` is loaded once at startup and passed down by reference.

pub mod config;
pub mod domain;
pub mod integrations;
pub mod io;
pub mod storage;

use anyhow::Result;
use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::{AppConfig, CorsConfig};
use crate::integrations::OpenAiProvider;
use crate::storage::{DbConnection, TransactionRepository};

pub use io::AppState;

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Setting up transaction store");
    let db_conn = DbConnection::init(&config.store).await?;

    info!("Setting up classification provider ({})", config.classifier.model);
    if config.classifier.api_key.is_none() {
        warn!(
            "No classifier API key configured; \
             every transaction will be stored as uncategorized"
        );
    }
    let provider = OpenAiProvider::new(&config.classifier)?;

    info!("Setting up application state");
    Ok(AppState::new(
        Arc::new(provider),
        Arc::new(TransactionRepository::new(db_conn)),
    ))
}

fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin {:?}: {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, cors: &CorsConfig) -> Router {
    Router::new()
        .route("/", get(io::rest::welcome))
        .route("/transaction", post(io::rest::submit_transaction))
        .route("/transaction_list", post(io::rest::submit_transaction_list))
        .route(
            "/transaction_category_statistics",
            get(io::rest::get_transaction_category_statistics),
        )
        .route(
            "/transactions_by_category",
            get(io::rest::get_transactions_by_category),
        )
        .route(
            "/counterparts_by_category",
            get(io::rest::get_counterparts_by_category),
        )
        .layer(cors_layer(cors))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
