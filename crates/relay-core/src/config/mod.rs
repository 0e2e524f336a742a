mod defaults;
mod env;


pub use env::load_env_file;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::RelayError;
use defaults::*;

/// Top-level Relay configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub pr: PrConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// General process settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Telegram bot config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    /// Chat that receives every reply.
    #[serde(default)]
    pub chat_id: String,
    /// The single user allowed to issue commands. Defaults to `chat_id`.
    #[serde(default)]
    pub allowed_user_id: Option<String>,
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
    #[serde(default = "default_max_message_len")]
    pub max_message_len: usize,
    /// Reply sent to unauthorized senders.
    #[serde(default = "default_deny_message")]
    pub deny_message: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            chat_id: String::new(),
            allowed_user_id: None,
            poll_timeout_secs: default_poll_timeout(),
            max_message_len: default_max_message_len(),
            deny_message: default_deny_message(),
        }
    }
}

impl TelegramConfig {
    /// The authorized sender id.
    pub fn allowed_user(&self) -> &str {
        self.allowed_user_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .unwrap_or(&self.chat_id)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }
}

/// Coding-agent subprocess config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_agent_program")]
    pub program: String,
    #[serde(default = "default_agent_timeout")]
    pub timeout_secs: u64,
    /// Pass `--dangerously-skip-permissions`; `-p` mode cannot prompt.
    #[serde(default = "default_true")]
    pub skip_permissions: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            program: default_agent_program(),
            timeout_secs: default_agent_timeout(),
            skip_permissions: true,
        }
    }
}

/// Target project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project root. Defaults to the process working directory.
    #[serde(default)]
    pub dir: Option<String>,
}

impl ProjectConfig {
    pub fn resolved_dir(&self) -> PathBuf {
        match self.dir.as_deref().filter(|d| !d.is_empty()) {
            Some(dir) => PathBuf::from(shellexpand(dir)),
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }
}

/// Screenshot pipeline config: ephemeral server and headless browser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Where screenshots are written. Defaults to `{data_dir}/screenshots`.
    #[serde(default)]
    pub output_dir: Option<String>,
    /// Interpreter used for `-m http.server`.
    #[serde(default = "default_server_program")]
    pub server_program: String,
    #[serde(default = "default_base_port")]
    pub base_port: u16,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u16,
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
    #[serde(default = "default_stop_grace")]
    pub stop_grace_secs: u64,
    #[serde(default = "default_navigation_timeout")]
    pub navigation_timeout_secs: u64,
    /// Explicit Chrome/Chromium executable. Auto-detected when empty.
    #[serde(default)]
    pub chrome_path: Option<String>,
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    #[serde(default = "default_window_height")]
    pub window_height: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            server_program: default_server_program(),
            base_port: default_base_port(),
            max_attempts: default_max_attempts(),
            settle_ms: default_settle_ms(),
            probe_timeout_secs: default_probe_timeout(),
            stop_grace_secs: default_stop_grace(),
            navigation_timeout_secs: default_navigation_timeout(),
            chrome_path: None,
            window_width: default_window_width(),
            window_height: default_window_height(),
        }
    }
}

impl CaptureConfig {
    pub fn resolved_output_dir(&self, data_dir: &str) -> PathBuf {
        match self.output_dir.as_deref().filter(|d| !d.is_empty()) {
            Some(dir) => PathBuf::from(shellexpand(dir)),
            None => PathBuf::from(shellexpand(data_dir)).join("screenshots"),
        }
    }
}

/// Pull-request creation config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrConfig {
    #[serde(default = "default_git_program")]
    pub git_program: String,
    #[serde(default = "default_gh_program")]
    pub gh_program: String,
    #[serde(default = "default_branch_prefix")]
    pub branch_prefix: String,
    #[serde(default = "default_title_prefix")]
    pub title_prefix: String,
}

impl Default for PrConfig {
    fn default() -> Self {
        Self {
            git_program: default_git_program(),
            gh_program: default_gh_program(),
            branch_prefix: default_branch_prefix(),
            title_prefix: default_title_prefix(),
        }
    }
}

/// Dispatch loop pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Delay after a failed batch before polling again.
    #[serde(default = "default_error_backoff")]
    pub error_backoff_secs: u64,
    /// Pause between successful batches.
    #[serde(default = "default_batch_pause_ms")]
    pub batch_pause_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            error_backoff_secs: default_error_backoff(),
            batch_pause_ms: default_batch_pause_ms(),
        }
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

impl Config {
    /// Fail fast on missing credentials.
    pub fn validate(&self) -> Result<(), RelayError> {
        let mut missing = Vec::new();
        if self.telegram.bot_token.trim().is_empty() {
            missing.push("TG_BOT_TOKEN");
        }
        if self.telegram.chat_id.trim().is_empty() {
            missing.push("TG_CHAT_ID");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(RelayError::Config(format!(
                "missing required config: {}",
                missing.join(", ")
            )))
        }
    }

    /// Absolute data directory.
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand(&self.relay.data_dir))
    }
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, RelayError> {
    let path = Path::new(path);
    if !path.exists() {
        tracing::debug!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| RelayError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| RelayError::Config(format!("failed to parse config: {}", e)))?;

    Ok(config)
}

/// Load the TOML config, then overlay `config.env` (next to it) and the
/// process environment.
pub fn load_with_env(path: &str) -> Result<Config, RelayError> {
    let mut config = load(path)?;
    let env_path = Path::new(path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .join("config.env");
    let file_vars = load_env_file(&env_path);
    config.apply_env(&file_vars);
    Ok(config)
}
