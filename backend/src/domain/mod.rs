//! # Domain Module
//!
//! Business logic for categorizing and reporting transactions. Services here
//! depend only on the storage traits and the classification provider trait,
//! never on a concrete store or HTTP client.
//!
//! - **classifier**: counterpart name to category, with fallback
//! - **enricher**: validation, batch bound, record construction
//! - **aggregator**: category-complete report shaping
//! - **ingestion_service** / **report_service**: request orchestration

pub mod aggregator;
pub mod classifier;
pub mod enricher;
pub mod ingestion_service;
pub mod report_service;

#[cfg(test)]
pub mod test_utils;

pub use classifier::{ClassificationProvider, Classifier, ProviderError};
pub use enricher::{Enricher, ValidationError, MAX_BATCH_SIZE};
pub use ingestion_service::{IngestError, IngestionService};
pub use report_service::ReportService;
