//! WHERE clause construction shared by every report query.

use shared::ReportFilter;

use super::row::{encode_timestamp, ColumnValue};

/// AND-combined filter clauses with their positional parameters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    clauses: Vec<&'static str>,
    params: Vec<ColumnValue>,
}

impl Predicate {
    /// Build the predicate for a report filter. Bounds are inclusive; an
    /// absent filter adds no clause.
    pub fn from_filter(filter: &ReportFilter) -> Self {
        let mut predicate = Self::default();

        if let Some(from) = &filter.from_timestamp {
            predicate.push("transactionTimeUtc >= ?", encode_timestamp(from).into());
        }
        if let Some(to) = &filter.to_timestamp {
            predicate.push("transactionTimeUtc <= ?", encode_timestamp(to).into());
        }
        if let Some(category) = filter.category {
            predicate.push("category = ?", category.as_str().into());
        }

        predicate
    }

    fn push(&mut self, clause: &'static str, param: ColumnValue) {
        self.clauses.push(clause);
        self.params.push(param);
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// `WHERE a AND b ...`, or an empty string when nothing is filtered
    pub fn where_clause(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.clauses.join(" AND "))
        }
    }

    pub fn params(&self) -> &[ColumnValue] {
        &self.params
    }
}
