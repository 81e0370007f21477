//! [`FeedBackend`] over WordPress `admin-ajax.php`.
//!
//! Every call is a form POST carrying an `action` and the page `nonce`.
//! admin-ajax answers `0` for unknown actions and `-1` for a failed nonce
//! check; handlers answer JSON, optionally wrapped in the
//! `{"success": bool, "data": ...}` envelope. Calls are not retried.

use std::time::Duration;

use async_trait::async_trait;
use wppfm_core::feed::{FeedPayload, FeedStatus};
use wppfm_core::types::{ChannelId, FeedId};

use crate::backend::{BackendError, FeedBackend, OutputAttribute, SaveResponse};

pub const ACTION_SAVE_FEED: &str = "wppfm-ajax-update-feed-data";
pub const ACTION_GENERATE_FEED: &str = "wppfm-ajax-update-feed-file";
pub const ACTION_FETCH_ATTRIBUTES: &str = "wppfm-ajax-get-output-attributes";

pub struct AjaxClient {
    client: reqwest::Client,
    url: String,
    nonce: String,
}

impl AjaxClient {
    pub fn new(
        url: impl Into<String>,
        nonce: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            nonce: nonce.into(),
        })
    }

    /// POST one admin-ajax action and unwrap its response body.
    async fn call(
        &self,
        action: &str,
        fields: &[(&str, String)],
    ) -> Result<serde_json::Value, BackendError> {
        let mut form: Vec<(&str, &str)> = vec![("action", action), ("nonce", self.nonce.as_str())];
        form.extend(fields.iter().map(|(k, v)| (*k, v.as_str())));

        let response = self.client.post(&self.url).form(&form).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(action, status = status.as_u16(), "admin-ajax call failed");
            return Err(BackendError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await?;
        parse_ajax_body(&body)
    }
}

/// Interpret an admin-ajax response body.
pub fn parse_ajax_body(body: &str) -> Result<serde_json::Value, BackendError> {
    match body.trim() {
        "0" => {
            return Err(BackendError::Rejected(
                "admin-ajax does not know this action".to_string(),
            ))
        }
        "-1" => return Err(BackendError::Rejected("nonce check failed".to_string())),
        _ => {}
    }

    let value: serde_json::Value = serde_json::from_str(body.trim())?;

    let Some(success) = value.get("success").and_then(|s| s.as_bool()) else {
        return Ok(value);
    };
    let data = value.get("data").cloned().unwrap_or(serde_json::Value::Null);
    if success {
        Ok(data)
    } else {
        let message = data
            .as_str()
            .map(str::to_string)
            .or_else(|| data.get("message").and_then(|m| m.as_str()).map(str::to_string))
            .unwrap_or_else(|| "request failed".to_string());
        Err(BackendError::Rejected(message))
    }
}

/// Pick `key` out of an object response, or use a bare scalar response as is.
fn field_or_self(value: serde_json::Value, key: &str) -> serde_json::Value {
    match value {
        serde_json::Value::Object(mut map) => map.remove(key).unwrap_or(serde_json::Value::Null),
        other => other,
    }
}

#[async_trait]
impl FeedBackend for AjaxClient {
    async fn save_feed(&self, payload: &FeedPayload) -> Result<SaveResponse, BackendError> {
        let feed = serde_json::to_string(payload)?;
        let value = self.call(ACTION_SAVE_FEED, &[("feed", feed)]).await?;
        let feed_id: FeedId = serde_json::from_value(field_or_self(value, "feed_id"))?;
        tracing::info!(feed_id, "Feed saved");
        Ok(SaveResponse { feed_id })
    }

    async fn generate_feed(&self, feed_id: FeedId) -> Result<FeedStatus, BackendError> {
        let value = self
            .call(ACTION_GENERATE_FEED, &[("feed_id", feed_id.to_string())])
            .await?;
        let status: FeedStatus = serde_json::from_value(field_or_self(value, "status"))?;
        tracing::info!(feed_id, ?status, "Feed generation requested");
        Ok(status)
    }

    async fn fetch_attributes(
        &self,
        feed_id: FeedId,
        channel: ChannelId,
    ) -> Result<Vec<OutputAttribute>, BackendError> {
        let value = self
            .call(
                ACTION_FETCH_ATTRIBUTES,
                &[
                    ("feed_id", feed_id.to_string()),
                    ("channel_id", channel.to_string()),
                ],
            )
            .await?;
        Ok(serde_json::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn zero_and_minus_one_are_rejections() {
        assert_matches!(parse_ajax_body("0"), Err(BackendError::Rejected(_)));
        assert_matches!(parse_ajax_body(" -1\n"), Err(BackendError::Rejected(m)) if m.contains("nonce"));
    }

    #[test]
    fn bare_json_passes_through() {
        assert_eq!(parse_ajax_body("42").unwrap(), json!(42));
        assert_eq!(parse_ajax_body(r#"{"feed_id": 3}"#).unwrap(), json!({"feed_id": 3}));
    }

    #[test]
    fn success_envelope_is_unwrapped() {
        let body = r#"{"success": true, "data": {"feed_id": 9}}"#;
        assert_eq!(parse_ajax_body(body).unwrap(), json!({"feed_id": 9}));
    }

    #[test]
    fn failure_envelope_carries_message() {
        let body = r#"{"success": false, "data": {"message": "Feed name already in use"}}"#;
        assert_matches!(
            parse_ajax_body(body),
            Err(BackendError::Rejected(m)) if m == "Feed name already in use"
        );
        assert_matches!(
            parse_ajax_body(r#"{"success": false}"#),
            Err(BackendError::Rejected(m)) if m == "request failed"
        );
    }

    #[test]
    fn html_error_page_is_malformed() {
        assert_matches!(parse_ajax_body("<html>oops</html>"), Err(BackendError::Malformed(_)));
    }

    #[test]
    fn field_or_self_handles_both_shapes() {
        assert_eq!(field_or_self(json!({"status": 3}), "status"), json!(3));
        assert_eq!(field_or_self(json!(3), "status"), json!(3));
        assert_eq!(field_or_self(json!({}), "status"), serde_json::Value::Null);
    }
}
