//! Category-complete reports.
//!
//! Every function here emits one entry per reported category, in
//! declaration order, whether or not the store returned rows for it.
//! Consumers can iterate the fixed category set without checking for
//! missing keys.

use shared::{Category, CategoryGroup, CategoryStatistics, TransactionRecord};
use std::collections::HashSet;

use crate::storage::{CounterpartRow, StatisticsRow};

/// The categories a report must cover: just the filtered one if a category
/// filter was applied, otherwise all of them.
pub fn report_categories(filter: Option<Category>) -> Vec<Category> {
    match filter {
        Some(category) => vec![category],
        None => Category::ALL.to_vec(),
    }
}

pub fn category_statistics(
    rows: &[StatisticsRow],
    filter: Option<Category>,
) -> Vec<CategoryStatistics> {
    report_categories(filter)
        .into_iter()
        .map(|category| {
            rows.iter()
                .find(|row| row.category == category.as_str())
                .map(|row| CategoryStatistics {
                    category,
                    transaction_count: row.transaction_count,
                    total_amount: row.total_amount,
                })
                .unwrap_or_else(|| CategoryStatistics::empty(category))
        })
        .collect()
}

/// Group records by category, keeping the store's order inside each group
pub fn group_transactions(
    records: Vec<TransactionRecord>,
    filter: Option<Category>,
) -> Vec<CategoryGroup<TransactionRecord>> {
    report_categories(filter)
        .into_iter()
        .map(|category| {
            let items = records
                .iter()
                .filter(|record| record.category == category)
                .cloned()
                .collect();
            CategoryGroup::new(category, items)
        })
        .collect()
}

/// Group counterpart names by category, each name at most once per group
pub fn group_counterparts(
    rows: &[CounterpartRow],
    filter: Option<Category>,
) -> Vec<CategoryGroup<String>> {
    report_categories(filter)
        .into_iter()
        .map(|category| {
            let mut seen = HashSet::new();
            let names = rows
                .iter()
                .filter(|row| row.category == category.as_str())
                .flat_map(|row| row.counterpart_names.iter())
                .filter(|name| seen.insert(name.as_str()))
                .cloned()
                .collect();
            CategoryGroup::new(category, names)
        })
        .collect()
}
