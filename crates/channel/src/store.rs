//! Remote record store abstraction.

use async_trait::async_trait;
use learnpulse_core::Statement;
use reqwest::{Client, ClientBuilder};
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::Mutex;
use tracing::debug;

/// Error type for record-store delivery.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint rejected the batch
    #[error("record store returned status {0}")]
    Status(u16),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// The external sink that durably stores statements.
///
/// Delivery is per batch: the store accepts or rejects a whole request, so a
/// failure means every statement in the batch needs retry.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Deliver one batch of statements.
    async fn store(&self, batch: &[Statement]) -> Result<(), StoreError>;
}

/// HTTP(S) record store client.
pub struct HttpRecordStore {
    /// HTTP client
    client: Client,

    /// Statements endpoint URL
    endpoint: String,

    /// Bearer token, if the endpoint requires one
    auth_token: Option<String>,
}

impl HttpRecordStore {
    /// Create a client for the given statements endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: ClientBuilder::new()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into(),
            auth_token: None,
        }
    }

    /// Attach a bearer token to every request.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn store(&self, batch: &[Statement]) -> Result<(), StoreError> {
        debug!("Delivering {} statement(s) to {}", batch.len(), self.endpoint);

        let mut request = self.client.post(&self.endpoint).json(batch);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(StoreError::Status(response.status().as_u16()));
        }
        Ok(())
    }
}

/// In-memory record store for tests.
///
/// Can be scripted to fail a fixed number of deliveries before accepting, to
/// exercise the retry path.
#[derive(Default)]
pub struct MemoryRecordStore {
    delivered: Mutex<Vec<Statement>>,
    fail_remaining: AtomicU32,
}

impl MemoryRecordStore {
    /// Store that accepts every batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that rejects the next `count` delivery attempts.
    pub fn failing(count: u32) -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            fail_remaining: AtomicU32::new(count),
        }
    }

    /// Statements accepted so far, in delivery order.
    pub async fn delivered(&self) -> Vec<Statement> {
        self.delivered.lock().await.clone()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn store(&self, batch: &[Statement]) -> Result<(), StoreError> {
        let remaining = self.fail_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_remaining.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::Other("scripted failure".to_string()));
        }
        self.delivered.lock().await.extend_from_slice(batch);
        Ok(())
    }
}
