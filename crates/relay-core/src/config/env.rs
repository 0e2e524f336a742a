//! `config.env` loading and environment overrides.

use super::Config;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Read a dotenv-style `config.env` file if present.
///
/// A missing file yields no variables. Read errors are logged and parsing
/// stops at the first malformed line, keeping what was read before it.
pub fn load_env_file(path: &Path) -> HashMap<String, String> {
    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(dotenvy::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!("no env file at {}", path.display());
            return HashMap::new();
        }
        Err(err) => {
            warn!("failed to load env file {}: {err}", path.display());
            return HashMap::new();
        }
    };

    let mut vars = HashMap::new();
    for item in iter {
        match item {
            Ok((key, value)) => {
                vars.insert(key, value);
            }
            Err(err) => {
                warn!("malformed env file {}: {err}", path.display());
                break;
            }
        }
    }
    vars
}

impl Config {
    /// Overlay credentials and paths from the environment.
    ///
    /// `lookup` returns the value for a variable name; process env should
    /// take precedence over file values when both are merged into it.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(token) = get("TG_BOT_TOKEN") {
            self.telegram.bot_token = token;
        }
        if let Some(chat) = get("TG_CHAT_ID") {
            self.telegram.chat_id = chat;
        }
        if let Some(user) = get("TG_ALLOWED_USER_ID") {
            self.telegram.allowed_user_id = Some(user);
        }
        if let Some(dir) = get("REPO_DIR") {
            self.project.dir = Some(dir);
        }
    }

    /// Overlay from the process environment, falling back to `file_vars`.
    pub fn apply_env(&mut self, file_vars: &HashMap<String, String>) {
        self.apply_env_with(|key| std::env::var(key).ok().or_else(|| file_vars.get(key).cloned()));
    }
}
