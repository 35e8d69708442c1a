use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// A fully addressed outbound message. Templating happens at the call site;
/// this layer only carries the dispatch contract.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundMessage {
    pub sender: String,
    pub recipients: Vec<String>,
    pub subject: String,
    pub text_body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_body: Option<String>,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("message dispatch failed")]
    Transport(#[from] anyhow::Error),
    #[error("mail service rejected the message: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<(), MailError>;
}

/// Client for an HTTP mail API. Success and failure are synchronous; retry
/// policy belongs to the caller's caller.
pub struct HttpMailer {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpMailer {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &OutboundMessage) -> Result<(), MailError> {
        let url = format!("{}/messages", self.base_url);
        let mut request = self.client.post(&url).json(message);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }

        let response = request.send().await.map_err(anyhow::Error::from)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(%status, "mail dispatch failed: {}", body);
            return Err(MailError::Rejected(format!("{status}: {body}")));
        }
        Ok(())
    }
}
