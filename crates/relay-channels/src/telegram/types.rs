//! Telegram Bot API deserialization types.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct TgResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgUpdate {
    pub update_id: i64,
    pub message: Option<TgMessage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgMessage {
    /// Kept loose: a malformed sender must not sink the whole update.
    #[serde(default)]
    pub from: Option<serde_json::Value>,
    pub text: Option<String>,
}

impl TgMessage {
    /// Sender id as a string, accepting numeric or string ids.
    pub fn sender_id(&self) -> Option<String> {
        match self.from.as_ref()?.get("id")? {
            serde_json::Value::Number(n) => n.as_i64().map(|id| id.to_string()),
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        }
    }

    /// `@username`, else first (and last) name.
    pub fn sender_name(&self) -> Option<String> {
        let from = self.from.as_ref()?;
        if let Some(un) = from.get("username").and_then(|v| v.as_str()) {
            return Some(format!("@{un}"));
        }
        let first = from.get("first_name").and_then(|v| v.as_str())?;
        match from.get("last_name").and_then(|v| v.as_str()) {
            Some(last) => Some(format!("{first} {last}")),
            None => Some(first.to_string()),
        }
    }
}
