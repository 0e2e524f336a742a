//! CLI command building and subprocess execution.

use super::ClaudeCodeAgent;
use relay_core::message::AgentReply;
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, info, warn};

impl ClaudeCodeAgent {
    /// Build the `claude -p <prompt>` command.
    pub(super) fn build_command(&self, prompt: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        if self.skip_permissions {
            cmd.arg("--dangerously-skip-permissions");
        }
        cmd.arg("-p")
            .arg(prompt)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        // Remove CLAUDECODE env var so the CLI doesn't think it's nested.
        cmd.env_remove("CLAUDECODE");
        cmd
    }

    /// Run the CLI with the configured timeout and fold the result into a reply.
    pub(super) async fn run_cli(&self, prompt: &str) -> AgentReply {
        if !self.working_dir.is_dir() {
            return AgentReply::Failed(format!(
                "working directory {} does not exist",
                self.working_dir.display()
            ));
        }

        let mut cmd = self.build_command(prompt);
        debug!("executing: {} -p <prompt>", self.program);
        let start = Instant::now();

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Err(_) => {
                warn!("{} timed out after {}s", self.program, self.timeout.as_secs());
                return AgentReply::TimedOut(self.timeout);
            }
            Ok(Err(e)) if e.kind() == ErrorKind::NotFound => {
                warn!("{} not found: {e}", self.program);
                return AgentReply::NotFound(self.program.clone());
            }
            Ok(Err(e)) => return AgentReply::Failed(e.to_string()),
            Ok(Ok(output)) => output,
        };

        info!(
            "{} finished in {}ms ({})",
            self.program,
            start.elapsed().as_millis(),
            output.status
        );
        AgentReply::Output(combine_output(&output.stdout, &output.stderr))
    }
}

/// stdout, plus a `[stderr]` section when stderr is non-empty.
pub(super) fn combine_output(stdout: &[u8], stderr: &[u8]) -> String {
    let mut text = String::from_utf8_lossy(stdout).into_owned();
    let stderr = String::from_utf8_lossy(stderr);
    if !stderr.is_empty() {
        text.push_str(&format!("\n\n[stderr]: {stderr}"));
    }
    let trimmed = text.trim();
    if trimmed.is_empty() {
        "Claude completed (no output)".to_string()
    } else {
        trimmed.to_string()
    }
}
