use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use shared::{ReportFilter, Transaction, TransactionList};
use std::sync::Arc;
use tracing::{error, info};

use crate::domain::{
    ClassificationProvider, Classifier, Enricher, IngestError, IngestionService, ReportService,
};
use crate::storage::TransactionStorage;

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub ingestion_service: IngestionService,
    pub report_service: ReportService,
}

impl AppState {
    /// Wire the services over one classification provider and one store
    pub fn new(
        provider: Arc<dyn ClassificationProvider>,
        storage: Arc<dyn TransactionStorage>,
    ) -> Self {
        let enricher = Enricher::new(Classifier::new(provider));
        Self {
            ingestion_service: IngestionService::new(enricher, storage.clone()),
            report_service: ReportService::new(storage),
        }
    }
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        match self {
            IngestError::Validation(e) => {
                (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()).into_response()
            }
            IngestError::Store(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to store transactions").into_response()
            }
        }
    }
}

/// Axum handler function for GET /
pub async fn welcome() -> impl IntoResponse {
    Json(json!({ "Welcome": "Spend categorizer API" }))
}

/// Axum handler function for POST /transaction
pub async fn submit_transaction(
    State(state): State<AppState>,
    Json(transaction): Json<Transaction>,
) -> impl IntoResponse {
    info!("POST /transaction - id: {}", transaction.transaction_id);

    match state.ingestion_service.submit_transaction(transaction).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => {
            error!("Error submitting transaction: {:?}", e);
            e.into_response()
        }
    }
}

/// Axum handler function for POST /transaction_list
pub async fn submit_transaction_list(
    State(state): State<AppState>,
    Json(list): Json<TransactionList>,
) -> impl IntoResponse {
    info!("POST /transaction_list - {} transactions", list.transactions.len());

    match state.ingestion_service.submit_transaction_list(list).await {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(e) => {
            error!("Error submitting transaction list: {:?}", e);
            e.into_response()
        }
    }
}

/// Axum handler function for GET /transaction_category_statistics
pub async fn get_transaction_category_statistics(
    State(state): State<AppState>,
    Query(filter): Query<ReportFilter>,
) -> impl IntoResponse {
    info!("GET /transaction_category_statistics - filter: {:?}", filter);

    match state.report_service.category_statistics(&filter).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => {
            error!("Error computing category statistics: {:?}", e);
            let body = "Error computing category statistics";
            (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
        }
    }
}

/// Axum handler function for GET /transactions_by_category
pub async fn get_transactions_by_category(
    State(state): State<AppState>,
    Query(filter): Query<ReportFilter>,
) -> impl IntoResponse {
    info!("GET /transactions_by_category - filter: {:?}", filter);

    match state.report_service.transactions_by_category(&filter).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => {
            error!("Error listing transactions by category: {:?}", e);
            let body = "Error listing transactions by category";
            (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
        }
    }
}

/// Axum handler function for GET /counterparts_by_category
pub async fn get_counterparts_by_category(
    State(state): State<AppState>,
    Query(filter): Query<ReportFilter>,
) -> impl IntoResponse {
    info!("GET /counterparts_by_category - filter: {:?}", filter);

    match state.report_service.counterparts_by_category(&filter).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => {
            error!("Error listing counterparts by category: {:?}", e);
            let body = "Error listing counterparts by category";
            (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
        }
    }
}
