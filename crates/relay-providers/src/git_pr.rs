//! Pull-request creation through `git` and the GitHub CLI.
//!
//! A fixed sequence of subprocess steps; the first failing step ends the
//! sequence and its stderr becomes the reply.

use async_trait::async_trait;
use relay_core::{config::PrConfig, traits::PullRequests};
use std::path::PathBuf;
use std::process::Output;
use tokio::process::Command;
use tracing::{info, warn};

/// Maximum description characters used in the commit/PR title.
const TITLE_DESCRIPTION_CHARS: usize = 50;

/// Creates PRs for one repository.
pub struct GitPrCreator {
    repo_dir: PathBuf,
    git: String,
    gh: String,
    branch_prefix: String,
    title_prefix: String,
}

impl GitPrCreator {
    pub fn from_config(config: &PrConfig, repo_dir: PathBuf) -> Self {
        Self {
            repo_dir,
            git: config.git_program.clone(),
            gh: config.gh_program.clone(),
            branch_prefix: config.branch_prefix.clone(),
            title_prefix: config.title_prefix.clone(),
        }
    }

    async fn run_step(&self, program: &str, args: &[&str]) -> std::io::Result<Output> {
        Command::new(program)
            .args(args)
            .current_dir(&self.repo_dir)
            .output()
            .await
    }

    async fn try_create(&self, description: &str) -> std::io::Result<String> {
        let status = self.run_step(&self.git, &["status", "--porcelain"]).await?;
        if !status.status.success() {
            return Ok(step_failure(&self.git, &["status", "--porcelain"], &status));
        }
        if String::from_utf8_lossy(&status.stdout).trim().is_empty() {
            return Ok("No changes to commit. Make some changes first!".to_string());
        }

        let branch = branch_name(&self.branch_prefix, chrono::Local::now());
        let title = pr_title(&self.title_prefix, description);

        let steps: [Vec<&str>; 4] = [
            vec!["checkout", "-b", &branch],
            vec!["add", "-A"],
            vec!["commit", "-m", &title],
            vec!["push", "-u", "origin", &branch],
        ];
        for args in &steps {
            let output = self.run_step(&self.git, args).await?;
            if !output.status.success() {
                warn!("PR step failed: {} {}", self.git, args.join(" "));
                return Ok(step_failure(&self.git, args, &output));
            }
        }

        let body = pr_body(description);
        let pr = self
            .run_step(
                &self.gh,
                &["pr", "create", "--title", &title, "--body", &body],
            )
            .await?;
        if pr.status.success() {
            info!("PR created on branch {branch}");
            Ok(format!(
                "[SUCCESS] PR created!\n{}",
                String::from_utf8_lossy(&pr.stdout).trim()
            ))
        } else {
            Ok(format!(
                "[ERROR] PR creation failed:\n{}",
                String::from_utf8_lossy(&pr.stderr).trim()
            ))
        }
    }
}

#[async_trait]
impl PullRequests for GitPrCreator {
    async fn create_pr(&self, description: &str) -> String {
        match self.try_create(description).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("PR creation could not run: {e}");
                format!("[ERROR] Error creating PR: {e}")
            }
        }
    }
}

fn step_failure(program: &str, args: &[&str], output: &Output) -> String {
    format!(
        "[ERROR] Failed at: {program} {}\n{}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr).trim()
    )
}

/// `<prefix>YYYYmmdd-HHMMSS`.
pub(crate) fn branch_name<Tz: chrono::TimeZone>(prefix: &str, now: chrono::DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{prefix}{}", now.format("%Y%m%d-%H%M%S"))
}

/// Title prefix plus the first characters of the description.
pub(crate) fn pr_title(prefix: &str, description: &str) -> String {
    let short: String = description.chars().take(TITLE_DESCRIPTION_CHARS).collect();
    format!("{prefix}{short}")
}

fn pr_body(description: &str) -> String {
    format!("## Changes\n\n{description}\n\n---\n*Created by Claude via Telegram*")
}
