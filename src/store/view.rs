//! Derived views over a transaction collection. Pure functions; the store
//! decides when to recompute them.

use chrono::NaiveDate;
use std::cmp::Reverse;

use crate::models::Transaction;

/// The one query that is not a substring search.
const CASH_QUERY: &str = "cash";

/// Newest first. Records without a usable date go last; ties keep input order.
#[must_use]
pub fn sort_by_date_desc(items: &[Transaction]) -> Vec<Transaction> {
    let mut sorted = items.to_vec();
    sorted.sort_by_cached_key(|t| Reverse(t.sort_date()));
    sorted
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub query: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl TransactionFilter {
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_range(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }
}

/// Date range first (only when both bounds are set), then the text query.
#[must_use]
pub fn filter_transactions(sorted: &[Transaction], filter: &TransactionFilter) -> Vec<Transaction> {
    let query = filter.query.to_lowercase();

    sorted
        .iter()
        .filter(|t| match (filter.start_date, filter.end_date) {
            (Some(start), Some(end)) => in_date_range(t, start, end),
            _ => true,
        })
        .filter(|t| query.is_empty() || matches_query(t, &query))
        .cloned()
        .collect()
}

/// Both bounds inclusive. Records carry no time of day, so treating `end` as
/// 23:59:59 is the same as including the whole end date.
#[must_use]
pub fn in_date_range(t: &Transaction, start: NaiveDate, end: NaiveDate) -> bool {
    let date = t.sort_date();
    start <= date && date <= end
}

/// `query` must already be lowercase. "cash" matches the payment method
/// exactly so that Gcash records stay out; anything else is a substring
/// match over every field.
#[must_use]
pub fn matches_query(t: &Transaction, query: &str) -> bool {
    if query == CASH_QUERY {
        return t.payment_method.to_lowercase() == CASH_QUERY;
    }

    t.field_values()
        .iter()
        .any(|value| value.to_lowercase().contains(query))
}
