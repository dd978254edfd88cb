//! Built-in demo data, used when no persisted collection exists yet.

use tracing::error;

use crate::models::Transaction;

const FIXTURE_JSON: &str = include_str!("fixture.json");

#[must_use]
pub fn transactions() -> Vec<Transaction> {
    serde_json::from_str(FIXTURE_JSON).unwrap_or_else(|e| {
        error!("Built-in transaction fixture is malformed: {e}");
        Vec::new()
    })
}
