use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;

use crate::models::{Booking, DeliveryReceipt, DeliveryStatus};

#[derive(Debug, Serialize)]
struct EmailAddress {
    email: String,
}

#[derive(Debug, Serialize)]
struct Personalization {
    to: Vec<EmailAddress>,
}

#[derive(Debug, Serialize)]
struct EmailContent {
    #[serde(rename = "type")]
    content_type: &'static str,
    value: String,
}

/// Request body for the SendGrid v3 `mail/send` endpoint.
#[derive(Debug, Serialize)]
pub struct ConfirmationEmail {
    personalizations: Vec<Personalization>,
    from: EmailAddress,
    subject: String,
    content: Vec<EmailContent>,
}

impl ConfirmationEmail {
    pub fn for_booking(sender: &str, booking: &Booking) -> Self {
        let subject = format!(
            "Your appointment for {} on {} at {} is confirmed",
            booking.treatment, booking.booking_date, booking.slot
        );
        let html = format!(
            "<p>Hello {},</p><p>{}.</p>",
            escape_html(&booking.patient_name),
            escape_html(&subject)
        );

        Self {
            personalizations: vec![Personalization {
                to: vec![EmailAddress { email: booking.patient_email.clone() }],
            }],
            from: EmailAddress { email: sender.to_string() },
            content: vec![
                EmailContent { content_type: "text/plain", value: subject.clone() },
                EmailContent { content_type: "text/html", value: html },
            ],
            subject,
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }
}

/// Escapes caller-supplied text for the HTML part of the email.
fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Sends booking confirmations through SendGrid.
pub struct BookingNotifier {
    client: Client,
    api_key: String,
    sender: String,
    base_url: String,
}

impl BookingNotifier {
    /// `None` when the email provider is not configured.
    pub fn new(config: &AppConfig) -> Option<Self> {
        if !config.is_email_configured() {
            return None;
        }

        Some(Self {
            client: config.http_client.clone(),
            api_key: config.email_api_key.clone(),
            sender: config.email_sender.clone(),
            base_url: config.email_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn send_confirmation(&self, booking: &Booking) -> Result<()> {
        let url = format!("{}/v3/mail/send", self.base_url);
        let email = ConfirmationEmail::for_booking(&self.sender, booking);

        debug!("Sending confirmation to {}: {}", booking.patient_email, email.subject());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&email)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Email provider returned {}: {}", status, body));
        }

        Ok(())
    }
}

/// Spawns a detached task that emails the patient. The booking response
/// never waits on it; the handle only exists so callers can observe the
/// receipt (tests do, handlers drop it).
pub fn dispatch_confirmation(config: &AppConfig, booking: Booking) -> JoinHandle<DeliveryReceipt> {
    let notifier = BookingNotifier::new(config);
    let id = Uuid::new_v4();

    tokio::spawn(async move {
        let recipient = booking.patient_email.clone();

        let status = match notifier {
            None => {
                warn!(notification_id = %id, "Email not configured, skipping confirmation to {}", recipient);
                DeliveryStatus::Skipped("email not configured".to_string())
            }
            Some(_) if recipient.trim().is_empty() => {
                warn!(notification_id = %id, "Booking has no patient email, skipping confirmation");
                DeliveryStatus::Skipped("no recipient".to_string())
            }
            Some(notifier) => match notifier.send_confirmation(&booking).await {
                Ok(()) => {
                    info!(notification_id = %id, "Confirmation sent to {}", recipient);
                    DeliveryStatus::Sent
                }
                Err(e) => {
                    error!(notification_id = %id, "Failed to send confirmation to {}: {}", recipient, e);
                    DeliveryStatus::Failed(e.to_string())
                }
            },
        };

        DeliveryReceipt { id, recipient, status }
    })
}
