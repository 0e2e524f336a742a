//! Telegram Bot API channel.
//!
//! Uses long polling via `getUpdates` and `sendMessage` for responses.
//! Every reply goes to the single configured chat.
//! Docs: <https://core.telegram.org/bots/api>

mod polling;
mod send;
pub(crate) mod types;

#[cfg(test)]
mod tests;

use relay_core::config::TelegramConfig;

/// Telegram channel using the Bot API with long polling.
pub struct TelegramChannel {
    client: reqwest::Client,
    base_url: String,
    /// Destination chat for all outgoing messages.
    chat_id: String,
    max_message_len: usize,
}

impl TelegramChannel {
    /// Create a new Telegram channel from config.
    pub fn new(config: &TelegramConfig) -> Self {
        let base_url = format!("https://api.telegram.org/bot{}", config.bot_token);
        Self {
            client: reqwest::Client::new(),
            base_url,
            chat_id: config.chat_id.clone(),
            max_message_len: config.max_message_len.max(1),
        }
    }
}
