//! Persistence collaborator seen from the editor.
//!
//! Saving, generating and attribute lookups happen on the server. The
//! editor only needs the contract, expressed as [`FeedBackend`]; the
//! admin-ajax implementation lives in [`crate::ajax`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use wppfm_core::feed::{FeedPayload, FeedStatus};
use wppfm_core::types::{ChannelId, FeedId};

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server returned a non-2xx status code.
    #[error("Server returned HTTP {0}")]
    HttpStatus(u16),

    /// admin-ajax answered but refused the call (bad nonce, unknown action,
    /// or an error message in the body).
    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Result of a successful save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResponse {
    pub feed_id: FeedId,
}

/// One output attribute a channel accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputAttribute {
    pub field_name: String,
    #[serde(default)]
    pub label: Option<String>,
    /// `required`, `highly_recommended`, `recommended` or `optional`.
    #[serde(default)]
    pub category: String,
}

#[async_trait]
pub trait FeedBackend: Send + Sync {
    /// Persist the feed, returning its (possibly newly assigned) id.
    async fn save_feed(&self, payload: &FeedPayload) -> Result<SaveResponse, BackendError>;

    /// Start generating the feed file, returning the resulting status.
    async fn generate_feed(&self, feed_id: FeedId) -> Result<FeedStatus, BackendError>;

    /// Output attributes the channel accepts for the feed.
    async fn fetch_attributes(
        &self,
        feed_id: FeedId,
        channel: ChannelId,
    ) -> Result<Vec<OutputAttribute>, BackendError>;
}
