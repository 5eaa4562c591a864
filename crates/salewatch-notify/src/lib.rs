//! Notification channels for newly detected sales.
//!
//! Each channel is attempted on its own: a failing SMTP login never keeps the
//! push notification from going out, and neither aborts the run.

pub mod email;
pub mod error;
pub mod ntfy;

use async_trait::async_trait;
use salewatch_core::{AppConfig, SaleEvent};

pub use email::EmailNotifier;
pub use error::NotifyError;
pub use ntfy::NtfyNotifier;

#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &'static str;

    /// Delivers one alert covering every event. An empty slice sends nothing.
    ///
    /// # Errors
    ///
    /// Any [`NotifyError`] from the underlying transport.
    async fn send(&self, events: &[SaleEvent]) -> Result<(), NotifyError>;

    /// Sends a synthetic alert to verify the channel is set up.
    ///
    /// # Errors
    ///
    /// Same as [`Notifier::send`].
    async fn send_test(&self) -> Result<(), NotifyError> {
        self.send(&[SaleEvent::test_event()]).await
    }
}

/// A notification channel slot; `notifier` is `None` when the channel is not
/// configured.
pub struct Channel {
    pub name: &'static str,
    pub notifier: Option<Box<dyn Notifier>>,
}

impl Channel {
    #[must_use]
    pub fn configured(notifier: Box<dyn Notifier>) -> Self {
        Self {
            name: notifier.name(),
            notifier: Some(notifier),
        }
    }

    #[must_use]
    pub fn unconfigured(name: &'static str) -> Self {
        Self {
            name,
            notifier: None,
        }
    }
}

/// Builds the email and ntfy channels from config, in that order.
///
/// # Errors
///
/// Returns [`NotifyError`] when a configured channel cannot be constructed
/// (invalid address, unusable SMTP host).
pub fn channels_from_config(config: &AppConfig) -> Result<Vec<Channel>, NotifyError> {
    let email = match &config.email {
        Some(email) => Channel::configured(Box::new(EmailNotifier::new(
            email,
            config.request_timeout_secs,
        )?)),
        None => Channel::unconfigured("email"),
    };
    let ntfy = match &config.ntfy {
        Some(ntfy) => Channel::configured(Box::new(NtfyNotifier::new(
            ntfy,
            config.request_timeout_secs,
        )?)),
        None => Channel::unconfigured("ntfy"),
    };
    Ok(vec![email, ntfy])
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelOutcome {
    Sent,
    Failed(String),
    Skipped,
}

/// Result of one channel attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelReport {
    pub channel: &'static str,
    pub outcome: ChannelOutcome,
}

/// Sends `events` through every channel. Returns no reports (and sends
/// nothing) for an empty batch.
pub async fn dispatch(channels: &[Channel], events: &[SaleEvent]) -> Vec<ChannelReport> {
    if events.is_empty() {
        return Vec::new();
    }
    let mut reports = Vec::with_capacity(channels.len());
    for channel in channels {
        let outcome = match &channel.notifier {
            Some(notifier) => outcome_of(channel.name, notifier.send(events).await),
            None => ChannelOutcome::Skipped,
        };
        reports.push(ChannelReport {
            channel: channel.name,
            outcome,
        });
    }
    reports
}

/// Sends a test alert through every configured channel.
pub async fn dispatch_test(channels: &[Channel]) -> Vec<ChannelReport> {
    let mut reports = Vec::with_capacity(channels.len());
    for channel in channels {
        let outcome = match &channel.notifier {
            Some(notifier) => outcome_of(channel.name, notifier.send_test().await),
            None => ChannelOutcome::Skipped,
        };
        reports.push(ChannelReport {
            channel: channel.name,
            outcome,
        });
    }
    reports
}

fn outcome_of(channel: &str, result: Result<(), NotifyError>) -> ChannelOutcome {
    match result {
        Ok(()) => ChannelOutcome::Sent,
        Err(e) => {
            tracing::warn!(channel, error = %e, "notification failed");
            ChannelOutcome::Failed(e.to_string())
        }
    }
}
