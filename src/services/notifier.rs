//! Outbound "user created" notifications.
//!
//! Delivery is best effort: callers dispatch on a spawned task and only log
//! failures.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

use crate::config::NotificationConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserCreatedNotice {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub user_id: i32,
    pub name: String,
}

impl UserCreatedNotice {
    #[must_use]
    pub fn new(user_id: i32, name: &str, to: &str, from: &str) -> Self {
        Self {
            to: to.to_string(),
            from: from.to_string(),
            subject: "Your account has been created".to_string(),
            user_id,
            name: name.to_string(),
        }
    }
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn user_created(&self, notice: &UserCreatedNotice) -> Result<()>;
}

/// Writes the notice to the log and nothing else.
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn user_created(&self, notice: &UserCreatedNotice) -> Result<()> {
        info!(
            event = "user_created_notice",
            to = %notice.to,
            user_id = notice.user_id,
            "{}",
            notice.subject
        );
        Ok(())
    }
}

/// POSTs the notice as JSON to a relay that owns actual mail delivery.
pub struct WebhookNotifier {
    client: Client,
    url: Url,
}

impl WebhookNotifier {
    #[must_use]
    pub const fn new(client: Client, url: Url) -> Self {
        Self { client, url }
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    async fn user_created(&self, notice: &UserCreatedNotice) -> Result<()> {
        self.client
            .post(self.url.clone())
            .json(notice)
            .send()
            .await
            .context("Failed to reach notification webhook")?
            .error_for_status()
            .context("Notification webhook rejected the notice")?;

        Ok(())
    }
}

/// `None` when notifications are disabled.
pub fn build_notifier(
    config: &NotificationConfig,
    client: Client,
) -> Result<Option<Arc<dyn Notifier>>> {
    if !config.enabled {
        return Ok(None);
    }

    let notifier: Arc<dyn Notifier> = match &config.webhook_url {
        Some(raw) => {
            let url = Url::parse(raw).context("Invalid notification webhook URL")?;
            Arc::new(WebhookNotifier::new(client, url))
        }
        None => Arc::new(LogNotifier),
    };

    Ok(Some(notifier))
}

/// Sends on a detached task. Failures are logged, never returned.
pub fn dispatch_user_created(notifier: Arc<dyn Notifier>, notice: UserCreatedNotice) {
    tokio::spawn(async move {
        if let Err(e) = notifier.user_created(&notice).await {
            warn!(to = %notice.to, user_id = notice.user_id, "User created notification failed: {e:#}");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_builds_nothing() {
        let config = NotificationConfig {
            enabled: false,
            ..NotificationConfig::default()
        };
        assert!(build_notifier(&config, Client::new()).unwrap().is_none());
    }

    #[test]
    fn test_bad_webhook_url_is_an_error() {
        let config = NotificationConfig {
            webhook_url: Some("::not a url::".to_string()),
            ..NotificationConfig::default()
        };
        assert!(build_notifier(&config, Client::new()).is_err());
    }

    #[tokio::test]
    async fn test_log_notifier_succeeds() {
        let notice = UserCreatedNotice::new(1, "Alice", "alice@example.com", "no-reply@x.io");
        assert!(LogNotifier.user_created(&notice).await.is_ok());
    }

    #[tokio::test]
    async fn test_webhook_failure_is_reported() {
        // Nothing listens on the discard port
        let url = Url::parse("http://127.0.0.1:9/notify").unwrap();
        let notifier = WebhookNotifier::new(Client::new(), url);
        let notice = UserCreatedNotice::new(1, "Alice", "alice@example.com", "no-reply@x.io");
        assert!(notifier.user_created(&notice).await.is_err());
    }
}
