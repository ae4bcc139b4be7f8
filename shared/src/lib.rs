use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Spending category assigned to every stored transaction.
///
/// The set is closed on purpose: the classifier may only answer with one of
/// these labels, and every category-keyed report lists each of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Entertainment,
    Transport,
    Retail,
    Utilities,
    Uncategorized,
}

impl Category {
    /// Every declared category, in report order
    pub const ALL: [Category; 6] = [
        Category::Food,
        Category::Entertainment,
        Category::Transport,
        Category::Retail,
        Category::Utilities,
        Category::Uncategorized,
    ];

    /// Label used whenever classification does not produce a known category
    pub const FALLBACK: Category = Category::Uncategorized;

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Entertainment => "entertainment",
            Category::Transport => "transport",
            Category::Retail => "retail",
            Category::Utilities => "utilities",
            Category::Uncategorized => "uncategorized",
        }
    }

    /// All labels, in declaration order
    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(Category::as_str).collect()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCategoryError(pub String);

impl fmt::Display for ParseCategoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid category: {}", self.0)
    }
}

impl std::error::Error for ParseCategoryError {}

impl FromStr for Category {
    type Err = ParseCategoryError;

    /// Case-insensitive, surrounding whitespace ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

/// A raw transaction as submitted by a caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Caller-supplied identifier, also the idempotency key
    pub transaction_id: String,
    /// Transaction time in UTC (microsecond precision)
    pub transaction_time_utc: DateTime<Utc>,
    /// Free-text transaction type, e.g. "CARD_TRANSACTION"
    pub transaction_type: String,
    /// Merchant or counterpart name, the input to classification
    pub counterpart_name: String,
    /// Amount in AUD with at most two fractional digits
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub amount: Decimal,
}

/// A transaction together with the category assigned at ingestion time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub category: Category,
}

impl TransactionRecord {
    pub fn new(transaction: Transaction, category: Category) -> Self {
        Self {
            transaction,
            category,
        }
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction.transaction_id
    }
}

/// Batch submission body (at most 10 transactions)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionList {
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecordList {
    pub transactions: Vec<TransactionRecord>,
}

/// Count and total amount of the transactions in one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStatistics {
    pub category: Category,
    pub transaction_count: u64,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub total_amount: Decimal,
}

impl CategoryStatistics {
    pub fn empty(category: Category) -> Self {
        Self {
            category,
            transaction_count: 0,
            total_amount: Decimal::ZERO,
        }
    }
}

/// A category paired with the items that fell into it
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup<T> {
    pub category: Category,
    pub items: Vec<T>,
}

impl<T> CategoryGroup<T> {
    pub fn new(category: Category, items: Vec<T>) -> Self {
        Self { category, items }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionsByCategory {
    pub category: Category,
    pub transactions: Vec<TransactionRecord>,
}

impl From<CategoryGroup<TransactionRecord>> for TransactionsByCategory {
    fn from(group: CategoryGroup<TransactionRecord>) -> Self {
        Self {
            category: group.category,
            transactions: group.items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterpartsByCategory {
    pub category: Category,
    /// Unique counterpart names seen in this category
    pub counterpart_names: Vec<String>,
}

impl From<CategoryGroup<String>> for CounterpartsByCategory {
    fn from(group: CategoryGroup<String>) -> Self {
        Self {
            category: group.category,
            counterpart_names: group.items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionCategoryStatsList {
    pub transaction_stats: Vec<CategoryStatistics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionsByCategoryList {
    pub transactions_by_category: Vec<TransactionsByCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterpartsByCategoryList {
    pub counterpart_names_by_category: Vec<CounterpartsByCategory>,
}

/// Optional, inclusive filters shared by every report.
/// A missing filter leaves that dimension unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportFilter {
    pub from_timestamp: Option<DateTime<Utc>>,
    pub to_timestamp: Option<DateTime<Utc>>,
    pub category: Option<Category>,
}

impl ReportFilter {
    pub fn for_category(category: Category) -> Self {
        Self {
            category: Some(category),
            ..Self::default()
        }
    }

    pub fn between(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            from_timestamp: Some(from),
            to_timestamp: Some(to),
            category: None,
        }
    }
}
