//! Reorder report delivery
//!
//! The report is rendered as an HTML table and posted to a mail API that
//! accepts JSON messages. Delivery is attempted once; failures are returned
//! to the caller.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::{render_reorder_report, FlaggedItem};

use crate::config::MailConfig;
use crate::error::{AppError, AppResult};

/// Receives the batch of items flagged by a run
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, items: &[FlaggedItem]) -> AppResult<()>;
}

/// Mail API message
#[derive(Debug, Serialize)]
struct MailRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    html: String,
}

/// Mail API error response
#[derive(Debug, Deserialize)]
struct MailApiResponse {
    #[serde(default)]
    message: Option<String>,
}

/// Sends the reorder report to one fixed recipient
#[derive(Clone)]
pub struct MailNotificationSink {
    api_endpoint: String,
    api_key: String,
    sender: String,
    recipient: String,
    subject: String,
    item_link_base: String,
    timeout: Duration,
    http_client: reqwest::Client,
}

impl MailNotificationSink {
    /// Create a new mail sink from configuration.
    ///
    /// Requests are bounded by `mail.timeout_seconds` so a stalled mail API
    /// cannot hold a run indefinitely.
    pub fn new(config: &MailConfig) -> AppResult<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds);
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_endpoint: config.api_endpoint.clone(),
            api_key: config.api_key.clone(),
            sender: config.sender.clone(),
            recipient: config.recipient.clone(),
            subject: config.subject.clone(),
            item_link_base: config.item_link_base.clone(),
            timeout,
            http_client,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn build_request(&self, items: &[FlaggedItem]) -> MailRequest<'_> {
        MailRequest {
            from: &self.sender,
            to: vec![self.recipient.as_str()],
            subject: &self.subject,
            html: render_reorder_report(items, &self.item_link_base),
        }
    }
}

#[async_trait]
impl NotificationSink for MailNotificationSink {
    async fn notify(&self, items: &[FlaggedItem]) -> AppResult<()> {
        if items.is_empty() {
            return Ok(());
        }

        tracing::info!(
            "Sending reorder report for {} item(s) to {}",
            items.len(),
            self.recipient
        );

        let request = self.build_request(items);

        let response = self
            .http_client
            .post(&self.api_endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::MailDelivery(format!("Failed to reach mail API: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let error: MailApiResponse = response
                .json()
                .await
                .unwrap_or(MailApiResponse { message: None });
            Err(AppError::MailDelivery(format!(
                "{}: {}",
                status,
                error.message.unwrap_or_else(|| "Unknown error".to_string())
            )))
        }
    }
}
