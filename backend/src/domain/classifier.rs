//! Counterpart-name classification.
//!
//! Categorization is best-effort enrichment: [`Classifier::classify`] never
//! fails. Provider errors and answers outside the closed category set are
//! logged and mapped to [`Category::FALLBACK`].

use async_trait::async_trait;
use shared::Category;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("no API key configured for the classification provider")]
    MissingApiKey,
    #[error("classification provider rate limited the request: {0}")]
    RateLimited(String),
    #[error("classification provider returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("classification request timed out")]
    Timeout,
    #[error("classification request failed: {0}")]
    Transport(String),
    #[error("classification provider returned no content")]
    EmptyResponse,
}

/// A text-completion backend that answers a single instruction
#[async_trait]
pub trait ClassificationProvider: Send + Sync {
    async fn complete(&self, instruction: &str) -> Result<String, ProviderError>;
}

/// The instruction sent for one counterpart name
pub fn build_prompt(counterpart_name: &str) -> String {
    format!(
        "Respond with the name of the category only. \
         Categorise the payment called {} into one of the following categories : {:?}",
        counterpart_name,
        Category::labels()
    )
}

/// Match a provider answer against the closed category set
pub fn parse_category(response: &str) -> Option<Category> {
    Category::from_str(response).ok()
}

#[derive(Clone)]
pub struct Classifier {
    provider: Arc<dyn ClassificationProvider>,
}

impl Classifier {
    pub fn new(provider: Arc<dyn ClassificationProvider>) -> Self {
        Self { provider }
    }

    pub async fn classify(&self, counterpart_name: &str) -> Category {
        let prompt = build_prompt(counterpart_name);

        // TODO: retry with backoff on ProviderError::RateLimited once the
        // provider account limits are known
        match self.provider.complete(&prompt).await {
            Ok(response) => match parse_category(&response) {
                Some(category) => {
                    debug!("Classified {:?} as {}", counterpart_name, category);
                    category
                }
                None => {
                    warn!(
                        "Classifier answered {:?} for {:?}, not a known category; using {}",
                        response,
                        counterpart_name,
                        Category::FALLBACK
                    );
                    Category::FALLBACK
                }
            },
            Err(e) => {
                warn!(
                    "Classification failed for {:?}: {}; using {}",
                    counterpart_name,
                    e,
                    Category::FALLBACK
                );
                Category::FALLBACK
            }
        }
    }
}
