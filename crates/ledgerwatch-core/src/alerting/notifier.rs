//! Notification delivery for alerts

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::models::{AlertChannel, Key};

/// Environment variable holding the SendGrid API key
pub const SENDGRID_API_KEY_VAR: &str = "SENDGRID_API_KEY";

const SENDGRID_BASE_URL: &str = "https://api.sendgrid.com";
const SENDER_NAME: &str = "Balance Monitor";

/// Delivers an alert for one flagged key
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send the alert, reporting only success or failure
    async fn notify(&self, channel: &AlertChannel, key: &Key) -> Result<(), NotificationError>;
}

/// Subject and body of a low-balance alert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    /// Email subject
    pub subject: String,
    /// Plain-text body
    pub body: String,
}

impl AlertMessage {
    /// Build the alert text for a key
    pub fn for_key(key: &Key) -> Self {
        Self {
            subject: format!("Zero Balance Key {}", key.name),
            body: format!(
                "{} key {} balance is {}",
                key.name,
                key.address,
                key.value()
            ),
        }
    }
}

/// Sends alert emails through the SendGrid v3 mail API
pub struct SendGridNotifier {
    client: Client,
    api_key: String,
    base_url: String,
}

impl SendGridNotifier {
    /// Create a notifier with an explicit API key
    pub fn new(api_key: impl Into<String>) -> Result<Self, NotificationError> {
        let client = Client::builder()
            .build()
            .map_err(|e| NotificationError::ConfigError(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: SENDGRID_BASE_URL.to_string(),
        })
    }

    /// Create a notifier from `SENDGRID_API_KEY`
    pub fn from_env() -> Result<Self, NotificationError> {
        match std::env::var(SENDGRID_API_KEY_VAR) {
            Ok(key) if !key.trim().is_empty() => Self::new(key),
            _ => Err(NotificationError::ConfigError(format!(
                "{SENDGRID_API_KEY_VAR} is not set"
            ))),
        }
    }

    /// Point the notifier at a different API host
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn payload(channel: &AlertChannel, message: &AlertMessage) -> SendGridPayload {
        SendGridPayload {
            personalizations: vec![Personalization {
                to: vec![EmailAddress {
                    email: channel.to.clone(),
                    name: Some(channel.to.clone()),
                }],
            }],
            from: EmailAddress {
                email: channel.from.clone(),
                name: Some(SENDER_NAME.to_string()),
            },
            subject: message.subject.clone(),
            content: vec![
                Content {
                    kind: "text/plain".to_string(),
                    value: message.body.clone(),
                },
                Content {
                    kind: "text/html".to_string(),
                    value: message.body.clone(),
                },
            ],
        }
    }
}

#[async_trait]
impl Notifier for SendGridNotifier {
    async fn notify(&self, channel: &AlertChannel, key: &Key) -> Result<(), NotificationError> {
        let message = AlertMessage::for_key(key);
        let url = format!("{}/v3/mail/send", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&Self::payload(channel, &message))
            .send()
            .await
            .map_err(|e| NotificationError::HttpError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::HttpError(format!(
                "SendGrid returned {}: {}",
                status, body
            )));
        }

        debug!(status = %status, "SendGrid accepted message");
        info!(name = %key.name, to = %channel.to, "Alert email sent");
        Ok(())
    }
}

/// Logs alerts instead of sending them
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, channel: &AlertChannel, key: &Key) -> Result<(), NotificationError> {
        let message = AlertMessage::for_key(key);
        warn!(
            to = %channel.to,
            subject = %message.subject,
            "{}",
            message.body
        );
        Ok(())
    }
}

/// Notification errors
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// Request failed or the provider rejected it
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Notifier cannot be constructed
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

#[derive(Debug, Serialize)]
struct SendGridPayload {
    personalizations: Vec<Personalization>,
    from: EmailAddress,
    subject: String,
    content: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Personalization {
    to: Vec<EmailAddress>,
}

#[derive(Debug, Serialize)]
struct EmailAddress {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(rename = "type")]
    kind: String,
    value: String,
}
