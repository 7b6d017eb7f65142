//! HTTP lead backend: talks to a remote lead server with reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{LeadBackend, LeadSnapshot, SaveReceipt, UploadReceipt};
use crate::error::BackendError;
use crate::server::types::{ErrorBody, SaveBody, SummaryBody, UploadBody};
use crate::uploads::CvFile;

/// [`LeadBackend`] over the JSON endpoints served by [`crate::server`].
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Read a `{ok, ...}` body: `ok: false` becomes [`BackendError::Rejected`]
    /// with the server's message, whatever the status code.
    async fn read<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        let value: serde_json::Value = serde_json::from_slice(&bytes).map_err(|e| {
            BackendError::InvalidResponse(format!("status {status}: {e}"))
        })?;

        if value.get("ok").and_then(|v| v.as_bool()) != Some(true) {
            let message = serde_json::from_value::<ErrorBody>(value)
                .map(|b| b.error)
                .unwrap_or_else(|_| format!("server returned status {status}"));
            return Err(BackendError::Rejected(message));
        }
        serde_json::from_value(value).map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

fn transport(e: reqwest::Error) -> BackendError {
    BackendError::Transport(e.to_string())
}

#[async_trait]
impl LeadBackend for HttpBackend {
    async fn upload(
        &self,
        file: CvFile,
        snapshot: &LeadSnapshot,
    ) -> Result<UploadReceipt, BackendError> {
        let state_json = serde_json::to_string(snapshot)
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;
        let part = Part::bytes(file.content)
            .file_name(file.filename)
            .mime_str("application/pdf")
            .map_err(transport)?;
        let form = Form::new().part("file", part).text("state_json", state_json);

        debug!(url = %self.url("upload_cv"), "Uploading CV");
        let response = self
            .client
            .post(self.url("upload_cv"))
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;
        let body: UploadBody = Self::read(response).await?;
        Ok(UploadReceipt {
            filename: body.filename,
            email_sent: body.email_sent,
            email_error: non_empty(body.email_error),
        })
    }

    async fn summarize(&self, snapshot: &LeadSnapshot) -> Result<String, BackendError> {
        let response = self
            .client
            .post(self.url("summarize"))
            .json(snapshot)
            .send()
            .await
            .map_err(transport)?;
        let body: SummaryBody = Self::read(response).await?;
        Ok(body.summary)
    }

    async fn save(&self, snapshot: &LeadSnapshot) -> Result<SaveReceipt, BackendError> {
        let response = self
            .client
            .post(self.url("save_user_data"))
            .json(snapshot)
            .send()
            .await
            .map_err(transport)?;
        let body: SaveBody = Self::read(response).await?;
        Ok(SaveReceipt {
            email_sent: body.email_sent,
            email_error: non_empty(body.email_error),
        })
    }
}
