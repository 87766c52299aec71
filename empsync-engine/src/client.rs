//! Directory service client
//!
//! Trait seams for the three external contracts the engine depends on
//! (section persistence, asset storage, record read), plus the HTTP
//! implementation used in production. The engine only ever talks to the
//! traits, so tests swap in scripted mocks.

use async_trait::async_trait;
use empsync_common::config::EngineConfig;
use empsync_common::model::{EmployeeRecord, UploadTicket};
use empsync_common::{Error, Result};
use std::time::Duration;
use uuid::Uuid;

const USER_AGENT: &str = concat!("empsync/", env!("CARGO_PKG_VERSION"));

/// One section persistence endpoint per section; each accepts a partial
/// body in that section's own naming convention and succeeds or fails
/// independently of the others.
#[async_trait]
pub trait SectionStore: Send + Sync {
    async fn persist_section(
        &self,
        record_id: Uuid,
        section: &'static str,
        body: serde_json::Value,
    ) -> Result<()>;
}

/// Two-step upload contract: request a ticket, then transfer the bytes to
/// the ticket's target. The committed path becomes valid once the transfer
/// succeeds; there is no separate commit call.
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn request_ticket(&self, field: &str, file_name: &str) -> Result<UploadTicket>;
    async fn transfer(&self, ticket: &UploadTicket, bytes: Vec<u8>) -> Result<()>;
}

/// Full-record read endpoint
#[async_trait]
pub trait RecordReader: Send + Sync {
    async fn fetch_record(&self, id: Uuid) -> Result<EmployeeRecord>;
}

/// Everything the engine needs from the directory service
pub trait DirectoryClient: SectionStore + AssetStore + RecordReader {}

impl<T: SectionStore + AssetStore + RecordReader> DirectoryClient for T {}

/// Ticket request body for `POST /assets/tickets`
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct TicketRequest<'a> {
    field: &'a str,
    file_name: &'a str,
}

/// HTTP client against the employee directory service
pub struct HttpDirectoryClient {
    http: reqwest::Client,
    base_url: String,
    transfer_timeout: Duration,
}

impl HttpDirectoryClient {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            transfer_timeout: config.transfer_timeout,
        })
    }

    /// Map a non-success response to an error carrying status and body
    async fn triage(response: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::NotFound(context.to_string()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Http(status.as_u16(), body));
        }

        Ok(response)
    }
}

#[async_trait]
impl SectionStore for HttpDirectoryClient {
    async fn persist_section(
        &self,
        record_id: Uuid,
        section: &'static str,
        body: serde_json::Value,
    ) -> Result<()> {
        let url = format!("{}/employees/{}/sections/{}", self.base_url, record_id, section);
        tracing::debug!(record_id = %record_id, section, "Persisting section");

        let response = self
            .http
            .put(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        Self::triage(response, section).await?;

        tracing::info!(record_id = %record_id, section, "Section persisted");
        Ok(())
    }
}

#[async_trait]
impl AssetStore for HttpDirectoryClient {
    async fn request_ticket(&self, field: &str, file_name: &str) -> Result<UploadTicket> {
        let url = format!("{}/assets/tickets", self.base_url);
        tracing::debug!(field, file_name, "Requesting upload ticket");

        let response = self
            .http
            .post(&url)
            .json(&TicketRequest { field, file_name })
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let ticket: UploadTicket = Self::triage(response, field)
            .await?
            .json()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(ticket)
    }

    async fn transfer(&self, ticket: &UploadTicket, bytes: Vec<u8>) -> Result<()> {
        tracing::debug!(
            target = %ticket.transfer_target,
            size = bytes.len(),
            "Transferring file bytes"
        );

        let response = self
            .http
            .put(&ticket.transfer_target)
            .timeout(self.transfer_timeout)
            .body(bytes)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        Self::triage(response, &ticket.committed_path).await?;

        tracing::info!(path = %ticket.committed_path, "Transfer complete");
        Ok(())
    }
}

#[async_trait]
impl RecordReader for HttpDirectoryClient {
    async fn fetch_record(&self, id: Uuid) -> Result<EmployeeRecord> {
        let url = format!("{}/employees/{}", self.base_url, id);
        tracing::debug!(record_id = %id, "Fetching full record");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let record: EmployeeRecord = Self::triage(response, &id.to_string())
            .await?
            .json()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(record)
    }
}

// ============================================================================
// Mock client for testing
// ============================================================================
