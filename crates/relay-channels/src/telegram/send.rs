//! Message sending: text, uploads, and command registration.

use super::TelegramChannel;
use crate::utils::{split_message, truncate_chars};
use relay_core::error::RelayError;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Telegram's caption limit.
const MAX_CAPTION_CHARS: usize = 1024;
const SEND_TIMEOUT: Duration = Duration::from_secs(30);
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

impl TelegramChannel {
    /// Send a text message, one request per chunk.
    ///
    /// Keeps going after a failed chunk; the first error is returned.
    pub(crate) async fn send_text_chunks(&self, text: &str) -> Result<(), RelayError> {
        if text.is_empty() {
            return Ok(());
        }

        let url = format!("{}/sendMessage", self.base_url);
        let mut first_err = None;

        for chunk in split_message(text, self.max_message_len) {
            let body = serde_json::json!({
                "chat_id": self.chat_id,
                "text": chunk,
            });

            let result = match self
                .client
                .post(&url)
                .timeout(SEND_TIMEOUT)
                .json(&body)
                .send()
                .await
            {
                Ok(resp) if resp.status().is_success() => {
                    info!("message sent ({} bytes)", chunk.len());
                    Ok(())
                }
                Ok(resp) => {
                    let status = resp.status();
                    let error_text = resp.text().await.unwrap_or_default();
                    Err(RelayError::Channel(format!(
                        "telegram send failed ({status}): {error_text}"
                    )))
                }
                Err(e) => Err(RelayError::Channel(format!("telegram send failed: {e}"))),
            };

            if let Err(e) = result {
                warn!("{e}");
                first_err.get_or_insert(e);
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Upload a local file with multipart under `field` to `method`.
    pub(crate) async fn upload(
        &self,
        path: &Path,
        caption: &str,
        method: &str,
        field: &'static str,
    ) -> Result<(), RelayError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new()
            .text("chat_id", self.chat_id.clone())
            .text("caption", truncate_chars(caption, MAX_CAPTION_CHARS).to_string())
            .part(field, part);

        let url = format!("{}/{method}", self.base_url);
        let resp = self
            .client
            .post(&url)
            .timeout(UPLOAD_TIMEOUT)
            .multipart(form)
            .send()
            .await
            .map_err(|e| RelayError::Channel(format!("telegram {method} failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();
            return Err(RelayError::Channel(format!(
                "telegram {method} failed ({status}): {error_text}"
            )));
        }

        info!("uploaded {} via {method}", path.display());
        Ok(())
    }

    /// Register bot commands with Telegram so users see an autocomplete menu.
    /// Best-effort: logs failures but does not propagate errors.
    pub(crate) async fn set_my_commands(&self) {
        let commands = serde_json::json!({
            "commands": [
                { "command": "status", "description": "Bridge status and project directory" },
                { "command": "pr", "description": "Commit changes and open a pull request" },
                { "command": "shot", "description": "Screenshot the project page or a URL" },
                { "command": "help", "description": "Show available commands" },
            ]
        });

        let url = format!("{}/setMyCommands", self.base_url);
        match self.client.post(&url).json(&commands).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!("registered Telegram bot commands");
            }
            Ok(resp) => {
                let body = resp.text().await.unwrap_or_default();
                warn!("failed to register Telegram bot commands: {body}");
            }
            Err(e) => {
                warn!("failed to register Telegram bot commands: {e}");
            }
        }
    }
}
