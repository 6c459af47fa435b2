//! Document store capability
//!
//! The engine only needs three operations from the backing service: fetch the
//! document, fetch the label definitions, and submit the mutated document.
//! URLs, verbs, and authentication belong to the implementation; the engine
//! sees the [`DocumentStore`] trait.

use async_trait::async_trait;
use thiserror::Error;

use crate::schema::{DefinitionsPayload, DocumentPayload};

/// Transport failure during fetch or submit. Reported once to the user via
/// the notifier, never retried automatically.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Connection, timeout, or body decoding failure.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("Service returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// Abstract fetch/submit capability of the backing document service.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch the persisted document.
    async fn fetch_document(&self) -> Result<DocumentPayload, NetworkError>;

    /// Fetch the project's label definitions.
    async fn fetch_definitions(&self) -> Result<DefinitionsPayload, NetworkError>;

    /// Submit the full mutated document. No partial-update semantics.
    async fn submit(&self, document: &DocumentPayload) -> Result<(), NetworkError>;
}

/// HTTP implementation of [`DocumentStore`].
pub struct HttpStore {
    client: reqwest::Client,
    document_url: String,
    definitions_url: String,
}

impl HttpStore {
    /// Create a store for explicit endpoint URLs. The document URL doubles
    /// as the submit target.
    pub fn new(document_url: impl Into<String>, definitions_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            document_url: document_url.into(),
            definitions_url: definitions_url.into(),
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, NetworkError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            Err(NetworkError::Status { status, body })
        }
    }
}

#[async_trait]
impl DocumentStore for HttpStore {
    async fn fetch_document(&self) -> Result<DocumentPayload, NetworkError> {
        let response = self.client.get(&self.document_url).send().await?;
        Ok(Self::check_status(response).await?.json().await?)
    }

    async fn fetch_definitions(&self) -> Result<DefinitionsPayload, NetworkError> {
        let response = self.client.get(&self.definitions_url).send().await?;
        Ok(Self::check_status(response).await?.json().await?)
    }

    async fn submit(&self, document: &DocumentPayload) -> Result<(), NetworkError> {
        let response = self
            .client
            .put(&self.document_url)
            .json(document)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }
}
