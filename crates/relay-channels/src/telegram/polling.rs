//! Long-poll fetch, update decoding, and the Channel trait implementation.

use super::types::{TgResponse, TgUpdate};
use super::TelegramChannel;
use async_trait::async_trait;
use relay_core::{error::RelayError, message::IncomingMessage, traits::Channel};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Slack on top of the server-side long-poll timeout.
const POLL_HTTP_SLACK: Duration = Duration::from_secs(10);

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout: Duration,
    ) -> Result<Vec<IncomingMessage>, RelayError> {
        let mut url = format!("{}/getUpdates?timeout={}", self.base_url, timeout.as_secs());
        if let Some(off) = offset {
            url.push_str(&format!("&offset={off}"));
        }

        let body: TgResponse<Vec<serde_json::Value>> = self
            .client
            .get(&url)
            .timeout(timeout + POLL_HTTP_SLACK)
            .send()
            .await
            .map_err(|e| RelayError::Channel(format!("telegram poll failed: {e}")))?
            .json()
            .await
            .map_err(|e| RelayError::Channel(format!("telegram poll parse failed: {e}")))?;

        if !body.ok {
            return Err(RelayError::Channel(format!(
                "telegram API error: {}",
                body.description.unwrap_or_else(|| "unknown error".into())
            )));
        }

        let updates: Vec<IncomingMessage> = body
            .result
            .unwrap_or_default()
            .into_iter()
            .filter_map(decode_update)
            .collect();
        debug!("telegram poll returned {} updates", updates.len());
        Ok(updates)
    }

    async fn send_text(&self, text: &str) -> Result<(), RelayError> {
        self.send_text_chunks(text).await
    }

    async fn send_file(&self, path: &Path, caption: &str) -> Result<(), RelayError> {
        self.upload(path, caption, "sendDocument", "document").await
    }

    async fn send_photo(&self, path: &Path, caption: &str) -> Result<(), RelayError> {
        self.upload(path, caption, "sendPhoto", "photo").await
    }

    async fn register_commands(&self) {
        self.set_my_commands().await;
    }
}

/// Decode one raw update.
///
/// An update that fails to decode still yields an empty message so its
/// offset gets acknowledged; only a missing `update_id` drops it.
pub(crate) fn decode_update(raw: serde_json::Value) -> Option<IncomingMessage> {
    let Some(update_id) = raw.get("update_id").and_then(|v| v.as_i64()) else {
        warn!("telegram update without update_id, skipping");
        return None;
    };

    let update: TgUpdate = match serde_json::from_value(raw) {
        Ok(u) => u,
        Err(e) => {
            warn!("telegram update {update_id} failed to decode: {e}");
            return Some(IncomingMessage::text(update_id, None, ""));
        }
    };

    let Some(msg) = update.message else {
        return Some(IncomingMessage::text(update.update_id, None, ""));
    };

    let sender_id = msg.sender_id();
    let mut incoming = IncomingMessage::text(
        update.update_id,
        sender_id.as_deref(),
        msg.text.as_deref().unwrap_or_default(),
    );
    incoming.sender_name = msg.sender_name();
    Some(incoming)
}
