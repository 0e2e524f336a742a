use crate::{
    error::RelayError,
    message::{AgentReply, IncomingMessage},
};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// Messaging transport to the operator.
///
/// Replies always go to the single configured chat, so send methods take
/// no target.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// Long-poll for updates newer than `offset`, blocking up to `timeout`.
    async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout: Duration,
    ) -> Result<Vec<IncomingMessage>, RelayError>;

    /// Send a text message, split into several sends when it is too long.
    async fn send_text(&self, text: &str) -> Result<(), RelayError>;

    /// Send a local file as a document.
    async fn send_file(&self, path: &Path, caption: &str) -> Result<(), RelayError>;

    /// Send a local image as a photo.
    async fn send_photo(&self, path: &Path, caption: &str) -> Result<(), RelayError>;

    /// Advertise the command menu. Best-effort.
    async fn register_commands(&self) {}
}

/// Coding-agent collaborator: a black-box request/response subprocess.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Human-readable agent name.
    fn name(&self) -> &str;

    /// Whether a run is currently in flight.
    fn is_running(&self) -> bool;

    /// Run one prompt to completion or timeout.
    async fn run(&self, prompt: &str) -> AgentReply;
}

/// Pull-request collaborator.
#[async_trait]
pub trait PullRequests: Send + Sync {
    /// Commit the working tree on a fresh branch and open a PR.
    /// Always returns a reply text; failures are described, not raised.
    async fn create_pr(&self, description: &str) -> String;
}
