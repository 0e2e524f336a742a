//! Default value functions used by serde for config deserialization.

pub fn default_name() -> String {
    "Relay".to_string()
}

pub fn default_data_dir() -> String {
    "~/.relay".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_true() -> bool {
    true
}

pub fn default_poll_timeout() -> u64 {
    30
}

pub fn default_max_message_len() -> usize {
    4000
}

pub fn default_deny_message() -> String {
    "\u{26d4} Unauthorized user".to_string()
}

pub fn default_agent_program() -> String {
    "claude".to_string()
}

pub fn default_agent_timeout() -> u64 {
    600
}

pub fn default_server_program() -> String {
    "python3".to_string()
}

pub fn default_base_port() -> u16 {
    8000
}

pub fn default_max_attempts() -> u16 {
    5
}

pub fn default_settle_ms() -> u64 {
    2000
}

pub fn default_probe_timeout() -> u64 {
    3
}

pub fn default_stop_grace() -> u64 {
    5
}

pub fn default_navigation_timeout() -> u64 {
    30
}

pub fn default_window_width() -> u32 {
    1280
}

pub fn default_window_height() -> u32 {
    800
}

pub fn default_git_program() -> String {
    "git".to_string()
}

pub fn default_gh_program() -> String {
    "gh".to_string()
}

pub fn default_branch_prefix() -> String {
    "claude/".to_string()
}

pub fn default_title_prefix() -> String {
    "Claude: ".to_string()
}

pub fn default_error_backoff() -> u64 {
    5
}

pub fn default_batch_pause_ms() -> u64 {
    1000
}
