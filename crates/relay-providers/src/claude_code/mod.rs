//! Claude Code CLI agent.
//!
//! Uses the locally installed `claude` CLI as a subprocess.
//! No API keys: relies on the user's existing `claude` authentication.

mod command;


use async_trait::async_trait;
use relay_core::{config::AgentConfig, message::AgentReply, traits::Agent};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::process::Command;

/// Default timeout for one agent run (10 minutes).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Claude Code CLI agent bound to one project directory.
pub struct ClaudeCodeAgent {
    /// Executable name or path.
    program: String,
    /// Wall-clock limit per run.
    timeout: Duration,
    /// Working directory for the CLI subprocess.
    working_dir: PathBuf,
    /// Pass `--dangerously-skip-permissions`.
    skip_permissions: bool,
    running: AtomicBool,
}

impl ClaudeCodeAgent {
    /// Create an agent with default settings.
    pub fn new(working_dir: PathBuf) -> Self {
        Self {
            program: "claude".to_string(),
            timeout: DEFAULT_TIMEOUT,
            working_dir,
            skip_permissions: true,
            running: AtomicBool::new(false),
        }
    }

    /// Create an agent from config values.
    pub fn from_config(config: &AgentConfig, working_dir: PathBuf) -> Self {
        Self {
            program: config.program.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            working_dir,
            skip_permissions: config.skip_permissions,
            running: AtomicBool::new(false),
        }
    }

    /// Check if the agent CLI is installed and accessible.
    pub async fn check_cli(program: &str) -> bool {
        Command::new(program)
            .arg("--version")
            .output()
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

/// Clears the running flag on every exit path.
struct RunningGuard<'a>(&'a AtomicBool);

impl<'a> RunningGuard<'a> {
    fn set(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl Agent for ClaudeCodeAgent {
    fn name(&self) -> &str {
        "claude-code"
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    async fn run(&self, prompt: &str) -> AgentReply {
        let _guard = RunningGuard::set(&self.running);
        self.run_cli(prompt).await
    }
}
