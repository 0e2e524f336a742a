//! Per-message routing: auth gate, slash commands, screenshot intent, agent.

use super::Gateway;
use crate::commands::{self, Command, ShotTarget};
use crate::intent::{self, with_scheme};
use relay_channels::utils::truncate_chars;
use relay_core::message::IncomingMessage;
use tracing::{debug, info, warn};

impl Gateway {
    /// Handle one update. Never fails: every outcome becomes a reply.
    pub(super) async fn handle_message(&self, msg: &IncomingMessage) {
        let text = msg.text.trim();
        if text.is_empty() {
            debug!("update {} has no text, skipping", msg.update_id);
            return;
        }

        if !self.is_authorized(msg.sender_id.as_deref()) {
            warn!(
                "rejected update {} from unauthorized sender {}",
                msg.update_id,
                msg.sender_label()
            );
            self.send(&self.settings.deny_message).await;
            return;
        }

        info!("received from {}: {}", msg.sender_label(), truncate_chars(text, 50));

        match Command::parse(text) {
            Some(Command::Status) => {
                let reply = commands::handle_status(
                    self.agent.is_running(),
                    &self.uptime,
                    &self.settings.project_dir,
                );
                self.send(&reply).await;
            }
            Some(Command::Pr(description)) => self.handle_pr(&description).await,
            Some(Command::Shot(target)) => self.handle_shot(&target).await,
            Some(Command::Help) => self.send(&commands::handle_help()).await,
            Some(Command::Unknown) => self.send(&commands::unknown_command()).await,
            None => self.handle_free_text(text).await,
        }
    }

    /// A missing sender id is never authorized.
    fn is_authorized(&self, sender_id: Option<&str>) -> bool {
        sender_id.is_some_and(|id| id == self.settings.allowed_user)
    }

    async fn handle_pr(&self, description: &str) {
        if description.is_empty() {
            self.send("Usage: /pr <description of changes>").await;
            return;
        }
        self.send("[WAIT] Creating PR...").await;
        let reply = self.prs.create_pr(description).await;
        self.send(&reply).await;
    }

    async fn handle_free_text(&self, text: &str) {
        let intent = intent::classify(text);
        if intent.is_screenshot {
            // A URL wins over any keyword.
            let target = match intent.url {
                Some(url) => ShotTarget::External(with_scheme(&url)),
                None => ShotTarget::Local(intent.keyword.unwrap_or("default").to_string()),
            };
            self.handle_shot(&target).await;
            return;
        }

        self.send("[WAIT] Claude is thinking...").await;
        let reply = self.agent.run(text).await.to_reply_text();
        self.send(&reply).await;
        info!("responded ({} chars)", reply.len());
    }

    pub(super) async fn handle_shot(&self, target: &ShotTarget) {
        let label = target.label();
        self.send(&format!("[WAIT] Taking screenshot of {label}...")).await;

        let shot = match target {
            ShotTarget::Local(keyword) => self.shots.capture_project(keyword).await,
            ShotTarget::External(url) => self.shots.capture_url(url).await,
        };

        match shot {
            Some(path) => {
                let caption = format!("Screenshot: {label}");
                if let Err(e) = self.channel.send_photo(&path, &caption).await {
                    warn!("failed to send screenshot {}: {e}", path.display());
                }
            }
            None => self.send("[ERROR] Screenshot failed. Check logs.").await,
        }
    }
}
