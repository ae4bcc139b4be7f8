//! Category-complete report queries.
use shared::{
    CounterpartsByCategory, CounterpartsByCategoryList, ReportFilter,
    TransactionCategoryStatsList, TransactionsByCategory, TransactionsByCategoryList,
};
use std::sync::Arc;
use tracing::info;

use super::aggregator;
use crate::storage::{StoreError, TransactionStorage};

#[derive(Clone)]
pub struct ReportService {
    storage: Arc<dyn TransactionStorage>,
}

impl ReportService {
    pub fn new(storage: Arc<dyn TransactionStorage>) -> Self {
        Self { storage }
    }

    pub async fn category_statistics(
        &self,
        filter: &ReportFilter,
    ) -> Result<TransactionCategoryStatsList, StoreError> {
        info!("Computing category statistics for {:?}", filter);
        let rows = self.storage.query_category_statistics(filter).await?;

        Ok(TransactionCategoryStatsList {
            transaction_stats: aggregator::category_statistics(&rows, filter.category),
        })
    }

    pub async fn transactions_by_category(
        &self,
        filter: &ReportFilter,
    ) -> Result<TransactionsByCategoryList, StoreError> {
        info!("Listing transactions by category for {:?}", filter);
        let records = self.storage.query_transactions_by_category(filter).await?;

        Ok(TransactionsByCategoryList {
            transactions_by_category: aggregator::group_transactions(records, filter.category)
                .into_iter()
                .map(TransactionsByCategory::from)
                .collect(),
        })
    }

    pub async fn counterparts_by_category(
        &self,
        filter: &ReportFilter,
    ) -> Result<CounterpartsByCategoryList, StoreError> {
        info!("Listing counterparts by category for {:?}", filter);
        let rows = self.storage.query_counterparts_by_category(filter).await?;

        Ok(CounterpartsByCategoryList {
            counterpart_names_by_category: aggregator::group_counterparts(&rows, filter.category)
                .into_iter()
                .map(CounterpartsByCategory::from)
                .collect(),
        })
    }
}
