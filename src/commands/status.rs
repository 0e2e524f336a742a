//! Canned replies: /status, /help, banner, farewell.

use std::path::Path;
use std::time::Instant;

pub fn handle_status(busy: bool, uptime: &Instant, project_dir: &Path) -> String {
    let elapsed = uptime.elapsed();
    let hours = elapsed.as_secs() / 3600;
    let minutes = (elapsed.as_secs() % 3600) / 60;
    let secs = elapsed.as_secs() % 60;
    let state = if busy { "[PROCESSING]" } else { "[ONLINE]" };

    format!(
        "Status: {state}\n\
         Uptime: {hours}h {minutes}m {secs}s\n\
         Repo: {}",
        project_dir.display()
    )
}

pub fn handle_help() -> String {
    "Commands:\n\
     - Send any message → the agent responds\n\
     - /pr <description> → Create PR\n\
     - /shot → Screenshot default page\n\
     - /shot project|build|app|page → Screenshot specific page\n\
     - /shot <url> → Screenshot external URL\n\
     - Natural language: 'screenshot the page', 'shot the build'\n\
     - /status → Check status\n\
     - /help → This list"
        .to_string()
}

pub fn unknown_command() -> String {
    "Unknown command. Available:\n/status\n/pr <description>\n/shot [project|build|app|page|<url>]\n/help"
        .to_string()
}

pub fn online_banner(name: &str) -> String {
    format!("[ONLINE] {name} is ONLINE!\n\n{}", handle_help())
}

pub fn farewell(name: &str) -> String {
    format!("[OFFLINE] {name} is going OFFLINE")
}
