//! Email alerts over SMTP with STARTTLS.
//!
//! Mail is sent from the configured address to itself, as a
//! plain-text/HTML alternative.

use std::fmt::Write as _;
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use salewatch_core::{EmailConfig, SaleEvent};

use crate::error::NotifyError;
use crate::Notifier;

#[must_use]
pub fn subject(events: &[SaleEvent]) -> String {
    let n = events.len();
    let plural = if n == 1 { "" } else { "s" };
    format!("🛍️ {n} New Sale{plural} Detected!")
}

#[must_use]
pub fn plain_body(events: &[SaleEvent]) -> String {
    let mut body = String::from("NEW SALES DETECTED\n\n");
    body.push_str(&"=".repeat(40));
    body.push_str("\n\n");
    for event in events {
        let _ = writeln!(body, "📍 {}", event.store_name);
        let _ = writeln!(body, "   {}", event.description);
        let _ = writeln!(body, "   Link: {}", event.url);
        body.push('\n');
    }
    body.push_str("\nHappy shopping! 🎉");
    body
}

#[must_use]
pub fn html_body(events: &[SaleEvent]) -> String {
    let mut items = String::new();
    for event in events {
        let _ = write!(
            items,
            r#"
    <div style="margin-bottom: 20px; padding: 15px; background: #f8f9fa; border-radius: 8px; border-left: 4px solid #007bff;">
      <h3 style="margin: 0 0 8px 0; color: #333;">{name}</h3>
      <p style="margin: 0 0 8px 0; color: #666;">{description}</p>
      <a href="{url}" style="color: #007bff; text-decoration: none;">Shop Now →</a>
    </div>"#,
            name = escape_html(&event.store_name),
            description = escape_html(&event.description),
            url = escape_html(&event.url),
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
</head>
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
  <h1 style="color: #333;">🛍️ New Sales Detected!</h1>
  <p style="color: #666;">The following stores have started new sales:</p>{items}
  <p style="color: #999; font-size: 12px; margin-top: 30px;">Sent by Salewatch</p>
</body>
</html>
"#
    )
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

pub struct EmailNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    mailbox: Mailbox,
}

impl EmailNotifier {
    /// Builds an SMTP transport for `config`. No connection is made until
    /// the first send.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::InvalidAddress`] for an unparseable address or
    /// [`NotifyError::Smtp`] if the relay cannot be configured.
    pub fn new(config: &EmailConfig, timeout_secs: u64) -> Result<Self, NotifyError> {
        let mailbox: Mailbox =
            config
                .address
                .parse()
                .map_err(|e: lettre::address::AddressError| NotifyError::InvalidAddress {
                    address: config.address.clone(),
                    reason: e.to_string(),
                })?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.address.clone(),
                config.app_password.clone(),
            ))
            .timeout(Some(Duration::from_secs(timeout_secs)))
            .build();

        Ok(Self { transport, mailbox })
    }

    fn build_message(&self, events: &[SaleEvent]) -> Result<Message, NotifyError> {
        Ok(Message::builder()
            .from(self.mailbox.clone())
            .to(self.mailbox.clone())
            .subject(subject(events))
            .multipart(MultiPart::alternative_plain_html(
                plain_body(events),
                html_body(events),
            ))?)
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn send(&self, events: &[SaleEvent]) -> Result<(), NotifyError> {
        if events.is_empty() {
            return Ok(());
        }
        let message = self.build_message(events)?;
        self.transport.send(message).await?;
        tracing::info!(to = %self.mailbox, sales = events.len(), "email sent");
        Ok(())
    }
}
