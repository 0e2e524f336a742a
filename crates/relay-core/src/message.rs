use serde::{Deserialize, Serialize};
use std::time::Duration;

/// An incoming message from a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    /// Transport-level update id; the next poll offset is derived from it.
    pub update_id: i64,
    /// Platform-specific user ID. `None` when the update carried no usable sender.
    pub sender_id: Option<String>,
    /// Human-readable sender name.
    pub sender_name: Option<String>,
    /// Message text content (empty for non-text updates).
    pub text: String,
}

impl IncomingMessage {
    /// Build a text message for the given update.
    pub fn text(update_id: i64, sender_id: Option<&str>, text: &str) -> Self {
        Self {
            update_id,
            sender_id: sender_id.map(str::to_string),
            sender_name: None,
            text: text.to_string(),
        }
    }

    /// Name for logs: display name, else sender id, else `unknown`.
    pub fn sender_label(&self) -> &str {
        self.sender_name
            .as_deref()
            .or(self.sender_id.as_deref())
            .unwrap_or("unknown")
    }
}

/// Outcome of one coding-agent invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentReply {
    /// The agent ran; carries its combined output.
    Output(String),
    /// The wall-clock limit elapsed and the run was abandoned.
    TimedOut(Duration),
    /// The agent executable could not be found.
    NotFound(String),
    /// Any other failure to run the agent.
    Failed(String),
}

impl AgentReply {
    /// Render the outcome as a chat reply.
    pub fn to_reply_text(&self) -> String {
        match self {
            Self::Output(text) => text.clone(),
            Self::TimedOut(limit) => format!(
                "[TIMEOUT] Agent timed out after {}. The task might be too complex.",
                format_duration(*limit)
            ),
            Self::NotFound(program) => {
                format!("[ERROR] Agent CLI not found. Make sure '{program}' is in your PATH.")
            }
            Self::Failed(reason) => format!("[ERROR] Error running agent: {reason}"),
        }
    }
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs >= 60 && secs % 60 == 0 {
        let mins = secs / 60;
        if mins == 1 {
            "1 minute".to_string()
        } else {
            format!("{mins} minutes")
        }
    } else {
        format!("{secs}s")
    }
}
