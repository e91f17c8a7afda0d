use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, Result};

#[derive(Debug, Serialize)]
struct SlackPayload<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct DiscordPayload<'a> {
    username: &'a str,
    content: &'a str,
}

/// A chat webhook and the payload shape it expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Slack { url: String },
    Discord { url: String, username: String },
}

impl Destination {
    pub fn name(&self) -> &'static str {
        match self {
            Destination::Slack { .. } => "slack",
            Destination::Discord { .. } => "discord",
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Destination::Slack { url } | Destination::Discord { url, .. } => url,
        }
    }

    pub fn payload(&self, text: &str) -> Result<Value> {
        let value = match self {
            Destination::Slack { .. } => serde_json::to_value(SlackPayload { text })?,
            Destination::Discord { username, .. } => serde_json::to_value(DiscordPayload {
                username,
                content: text,
            })?,
        };
        Ok(value)
    }
}

#[allow(async_fn_in_trait)]
pub trait WebhookTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<()>;
}

impl WebhookTransport for Client {
    async fn post_json(&self, url: &str, body: &Value) -> Result<()> {
        let response = self.post(url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::warn!("Webhook returned HTTP {}: {}", status, error_text);
            return Err(AppError::HttpStatus {
                url: url.to_string(),
                status,
            });
        }

        Ok(())
    }
}

#[derive(Debug)]
pub struct Delivery {
    pub destination: &'static str,
    pub outcome: Result<()>,
}

#[derive(Debug, Default)]
pub struct PublishReport {
    pub deliveries: Vec<Delivery>,
}

impl PublishReport {
    pub fn failures(&self) -> impl Iterator<Item = &Delivery> {
        self.deliveries.iter().filter(|d| d.outcome.is_err())
    }

    /// Collapse the report into a single result once every destination was tried.
    pub fn into_result(self) -> Result<()> {
        let attempted = self.deliveries.len();
        let details: Vec<String> = self
            .deliveries
            .into_iter()
            .filter_map(|d| d.outcome.err().map(|e| format!("{}: {}", d.destination, e)))
            .collect();

        if details.is_empty() {
            Ok(())
        } else {
            Err(AppError::Delivery {
                failed: details.len(),
                attempted,
                details: details.join("; "),
            })
        }
    }
}

pub struct Publisher<T = Client> {
    transport: T,
    destinations: Vec<Destination>,
}

impl Publisher<Client> {
    pub fn new(destinations: Vec<Destination>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_transport(builder.build()?, destinations))
    }
}

impl<T: WebhookTransport> Publisher<T> {
    pub fn with_transport(transport: T, destinations: Vec<Destination>) -> Self {
        Self {
            transport,
            destinations,
        }
    }

    /// Post `text` to every destination in order. A failure never stops the
    /// remaining destinations from being tried.
    pub async fn publish(&self, text: &str) -> PublishReport {
        let mut report = PublishReport::default();

        for destination in &self.destinations {
            let outcome = match destination.payload(text) {
                Ok(body) => self.transport.post_json(destination.url(), &body).await,
                Err(e) => Err(e),
            };

            match &outcome {
                Ok(()) => tracing::info!("Posted announcement to {}", destination.name()),
                Err(e) => tracing::warn!("Failed to post to {}: {}", destination.name(), e),
            }

            report.deliveries.push(Delivery {
                destination: destination.name(),
                outcome,
            });
        }

        report
    }
}
