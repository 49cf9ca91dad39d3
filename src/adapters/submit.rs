use crate::domain::model::FormRecord;
use crate::domain::ports::SubmissionSink;
use crate::utils::error::{Result, SiteError};
use async_trait::async_trait;
use reqwest::Client;

/// Stand-in used when no endpoint is configured: the record is only logged.
#[derive(Debug, Clone, Default)]
pub struct LogSink;

#[async_trait]
impl SubmissionSink for LogSink {
    async fn submit(&self, record: &FormRecord) -> Result<()> {
        tracing::info!(
            "📨 Sending application to server: {}",
            serde_json::to_string(record)?
        );
        Ok(())
    }
}

/// POSTs each record as JSON to a fixed endpoint. Single attempt.
#[derive(Debug, Clone)]
pub struct HttpSink {
    client: Client,
    endpoint: String,
}

impl HttpSink {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl SubmissionSink for HttpSink {
    async fn submit(&self, record: &FormRecord) -> Result<()> {
        tracing::debug!("POST application to: {}", self.endpoint);
        let response = self.client.post(&self.endpoint).json(record).send().await?;

        if !response.status().is_success() {
            return Err(SiteError::ContentStatusError {
                url: self.endpoint.clone(),
                status: response.status().as_u16(),
            });
        }

        tracing::info!("✅ Application sent successfully");
        Ok(())
    }
}
