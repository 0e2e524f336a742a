//! Gateway: the long-poll dispatch loop.
//!
//! One update at a time: poll, acknowledge, route, reply, then poll again.
//! All loop state (offset, uptime) lives on the struct.

mod routing;

#[cfg(test)]
mod tests;

use crate::commands;
use futures::FutureExt;
use relay_capture::Screenshotter;
use relay_core::{
    config::Config,
    message::IncomingMessage,
    traits::{Agent, Channel, PullRequests},
};
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Static settings the gateway needs from config.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub name: String,
    pub allowed_user: String,
    pub deny_message: String,
    pub project_dir: PathBuf,
    pub poll_timeout: Duration,
    pub error_backoff: Duration,
    pub batch_pause: Duration,
}

impl GatewaySettings {
    pub fn from_config(cfg: &Config, project_dir: PathBuf) -> Self {
        Self {
            name: cfg.relay.name.clone(),
            allowed_user: cfg.telegram.allowed_user().to_string(),
            deny_message: cfg.telegram.deny_message.clone(),
            project_dir,
            poll_timeout: cfg.telegram.poll_timeout(),
            error_backoff: Duration::from_secs(cfg.gateway.error_backoff_secs),
            batch_pause: Duration::from_millis(cfg.gateway.batch_pause_ms),
        }
    }
}

/// Connects the transport to the agent, PR, and screenshot collaborators.
pub struct Gateway {
    pub(super) channel: Arc<dyn Channel>,
    pub(super) agent: Arc<dyn Agent>,
    pub(super) prs: Arc<dyn PullRequests>,
    pub(super) shots: Arc<Screenshotter>,
    pub(super) settings: GatewaySettings,
    /// Next update id to request. Only ever increases.
    pub(super) offset: Option<i64>,
    pub(super) uptime: Instant,
}

impl Gateway {
    pub fn new(
        channel: Arc<dyn Channel>,
        agent: Arc<dyn Agent>,
        prs: Arc<dyn PullRequests>,
        shots: Arc<Screenshotter>,
        settings: GatewaySettings,
    ) -> Self {
        Self {
            channel,
            agent,
            prs,
            shots,
            settings,
            offset: None,
            uptime: Instant::now(),
        }
    }

    /// Run the dispatch loop. Never returns; cancel the future to stop.
    pub async fn run(&mut self) {
        info!(
            "{} gateway running | channel: {} | agent: {} | project: {}",
            self.settings.name,
            self.channel.name(),
            self.agent.name(),
            self.settings.project_dir.display()
        );

        self.channel.register_commands().await;
        self.send(&commands::online_banner(&self.settings.name)).await;

        loop {
            match self.poll_once().await {
                Ok(count) => {
                    if count > 0 {
                        debug!("processed {count} updates, next offset {:?}", self.offset());
                    }
                    tokio::time::sleep(self.settings.batch_pause).await;
                }
                Err(e) => {
                    error!("error in main loop: {e}");
                    tokio::time::sleep(self.settings.error_backoff).await;
                }
            }
        }
    }

    /// Fetch one batch and route every update in it.
    pub(super) async fn poll_once(&mut self) -> anyhow::Result<usize> {
        let updates = self
            .channel
            .get_updates(self.offset, self.settings.poll_timeout)
            .await?;
        let count = updates.len();
        let panicked = self.process_batch(updates).await;
        if panicked > 0 {
            anyhow::bail!("{panicked} update(s) panicked while being handled");
        }
        Ok(count)
    }

    /// Route a batch in order. Returns how many handlers panicked.
    pub(super) async fn process_batch(&mut self, updates: Vec<IncomingMessage>) -> usize {
        let mut panicked = 0;
        for msg in updates {
            self.advance_offset(msg.update_id);
            let outcome = AssertUnwindSafe(self.handle_message(&msg))
                .catch_unwind()
                .await;
            if outcome.is_err() {
                error!("handler panicked on update {}", msg.update_id);
                panicked += 1;
            }
        }
        panicked
    }

    fn advance_offset(&mut self, update_id: i64) {
        let next = update_id.saturating_add(1);
        self.offset = Some(self.offset.map_or(next, |cur| cur.max(next)));
    }

    pub fn offset(&self) -> Option<i64> {
        self.offset
    }

    /// Best-effort farewell before exit.
    pub async fn say_goodbye(&self) {
        self.send(&commands::farewell(&self.settings.name)).await;
    }

    /// Send text to the operator chat, logging failures.
    pub(super) async fn send(&self, text: &str) {
        if let Err(e) = self.channel.send_text(text).await {
            error!("failed to send message: {e}");
        }
    }
}
