//! Phone push notifications through an ntfy server.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use salewatch_core::{NtfyConfig, SaleEvent};
use serde::Serialize;

use crate::error::NotifyError;
use crate::Notifier;

const MAX_LISTED_STORES: usize = 5;
const ALERT_PRIORITY: u8 = 4;
const TEST_PRIORITY: u8 = 3;

/// JSON body accepted by ntfy's publish endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NtfyMessage {
    pub topic: String,
    pub title: String,
    pub message: String,
    pub priority: u8,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click: Option<String>,
}

/// Push message for a batch of new sales. `None` for an empty batch.
///
/// One sale is titled with the store and carries its description; several
/// are summarised by name, at most five, with a "+N till" tail.
#[must_use]
pub fn alert_message(topic: &str, events: &[SaleEvent]) -> Option<NtfyMessage> {
    let (title, message) = match events {
        [] => return None,
        [single] => (format!("REA: {}", single.store_name), single.description.clone()),
        many => {
            let mut names: Vec<String> = many
                .iter()
                .take(MAX_LISTED_STORES)
                .map(|e| e.store_name.clone())
                .collect();
            if many.len() > MAX_LISTED_STORES {
                names.push(format!("+{} till", many.len() - MAX_LISTED_STORES));
            }
            (format!("{} nya reor!", many.len()), names.join(", "))
        }
    };

    Some(NtfyMessage {
        topic: topic.to_string(),
        title,
        message,
        priority: ALERT_PRIORITY,
        tags: vec!["shopping_bags".to_string()],
        click: Some(events[0].url.clone()),
    })
}

#[must_use]
pub fn test_message(topic: &str) -> NtfyMessage {
    NtfyMessage {
        topic: topic.to_string(),
        title: "Test".to_string(),
        message: "Salewatch fungerar!".to_string(),
        priority: TEST_PRIORITY,
        tags: vec!["white_check_mark".to_string()],
        click: None,
    }
}

pub struct NtfyNotifier {
    client: Client,
    base_url: String,
    topic: String,
}

impl NtfyNotifier {
    /// # Errors
    ///
    /// Returns [`NotifyError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &NtfyConfig, timeout_secs: u64) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            topic: config.topic.clone(),
        })
    }

    async fn publish(&self, message: &NtfyMessage) -> Result<(), NotifyError> {
        let response = self.client.post(&self.base_url).json(message).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::NtfyStatus {
                status: status.as_u16(),
            });
        }
        tracing::info!(title = %message.title, "push notification sent");
        Ok(())
    }
}

#[async_trait]
impl Notifier for NtfyNotifier {
    fn name(&self) -> &'static str {
        "ntfy"
    }

    async fn send(&self, events: &[SaleEvent]) -> Result<(), NotifyError> {
        match alert_message(&self.topic, events) {
            Some(message) => self.publish(&message).await,
            None => Ok(()),
        }
    }

    async fn send_test(&self) -> Result<(), NotifyError> {
        self.publish(&test_message(&self.topic)).await
    }
}
