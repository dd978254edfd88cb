use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::models::Transaction;

#[derive(Debug, Serialize)]
struct StatusPatch<'a> {
    status: &'a str,
}

/// A list response: a bare array, or the `{ success, data }` envelope that
/// this service's own `/api/transactions` answers with.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListBody {
    Bare(Vec<Transaction>),
    Enveloped { data: Vec<Transaction> },
}

impl From<ListBody> for Vec<Transaction> {
    fn from(body: ListBody) -> Self {
        match body {
            ListBody::Bare(items) | ListBody::Enveloped { data: items } => items,
        }
    }
}

/// Client for a REST transaction resource:
/// `GET {base}` lists, `PATCH {base}/{reference}/status` changes one status.
#[derive(Clone)]
pub struct TransactionsClient {
    client: Client,
    base_url: Url,
}

impl TransactionsClient {
    pub fn new(client: Client, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid transactions base URL: {base_url}"))?;

        if base_url.cannot_be_a_base() {
            anyhow::bail!("Transactions base URL cannot carry a path: {base_url}");
        }

        Ok(Self { client, base_url })
    }

    pub async fn list(&self) -> Result<Vec<Transaction>> {
        debug!("Fetching transactions from {}", self.base_url);

        let body = self
            .client
            .get(self.base_url.clone())
            .send()
            .await
            .context("Transactions request failed")?
            .error_for_status()
            .context("Transactions endpoint returned an error")?
            .json::<ListBody>()
            .await
            .context("Transactions response was not a list of transactions")?;

        Ok(body.into())
    }

    pub async fn update_status(&self, reference_code: &str, status: &str) -> Result<()> {
        let url = self.status_url(reference_code)?;

        debug!("Patching status of {} to {}", reference_code, status);

        self.client
            .patch(url)
            .json(&StatusPatch { status })
            .send()
            .await
            .context("Status update request failed")?
            .error_for_status()
            .context("Status update was rejected")?;

        Ok(())
    }

    fn status_url(&self, reference_code: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow::anyhow!("Transactions base URL cannot carry a path"))?
            .pop_if_empty()
            .push(reference_code)
            .push("status");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_url() {
        let client =
            TransactionsClient::new(Client::new(), "http://api.example.com/v1/transactions")
                .unwrap();
        assert_eq!(
            client.status_url("REF-001234").unwrap().as_str(),
            "http://api.example.com/v1/transactions/REF-001234/status"
        );
    }

    #[test]
    fn test_status_url_trailing_slash_and_escaping() {
        let client =
            TransactionsClient::new(Client::new(), "http://api.example.com/v1/transactions/")
                .unwrap();
        assert_eq!(
            client.status_url("REF 1/2").unwrap().as_str(),
            "http://api.example.com/v1/transactions/REF%201%2F2/status"
        );
    }

    #[test]
    fn test_list_body_accepts_bare_and_enveloped() {
        let record = serde_json::to_value(crate::store::fixture::transactions().remove(0)).unwrap();

        let bare: ListBody = serde_json::from_value(serde_json::json!([record])).unwrap();
        assert_eq!(Vec::<Transaction>::from(bare).len(), 1);

        let enveloped: ListBody =
            serde_json::from_value(serde_json::json!({ "success": true, "data": [record] }))
                .unwrap();
        assert_eq!(Vec::<Transaction>::from(enveloped).len(), 1);

        assert!(serde_json::from_value::<ListBody>(serde_json::json!({ "success": false })).is_err());
    }

    #[test]
    fn test_rejects_non_base_url() {
        assert!(TransactionsClient::new(Client::new(), "mailto:ops@example.com").is_err());
        assert!(TransactionsClient::new(Client::new(), "not a url").is_err());
    }
}
