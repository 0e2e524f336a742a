//! Slash commands: parsing and canned replies.

mod status;


pub use status::{farewell, handle_help, handle_status, online_banner, unknown_command};

use crate::intent::with_scheme;

/// Keywords `/shot` accepts as local targets.
pub const LOCAL_TARGETS: &[&str] = &["project", "build", "app", "page"];

/// What a screenshot request points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShotTarget {
    /// A keyword resolved against the project's HTML files.
    Local(String),
    /// An absolute URL.
    External(String),
}

impl ShotTarget {
    /// Interpret `/shot` arguments: empty ⇒ default page, a known keyword ⇒
    /// that page, anything else ⇒ a URL.
    pub fn parse(args: &str) -> Self {
        let args = args.trim();
        if args.is_empty() {
            return Self::Local("default".to_string());
        }
        let lower = args.to_lowercase();
        if LOCAL_TARGETS.contains(&lower.as_str()) {
            Self::Local(lower)
        } else {
            Self::External(with_scheme(args))
        }
    }

    /// Progress and caption label.
    pub fn label(&self) -> String {
        match self {
            Self::Local(keyword) => format!("{} page", capitalize(keyword)),
            Self::External(url) => url.clone(),
        }
    }
}

/// Known bot commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Status,
    /// Description, unquoted and trimmed. May be empty.
    Pr(String),
    Shot(ShotTarget),
    Help,
    /// A `/` prefix that matches nothing above.
    Unknown,
}

impl Command {
    /// Parse a command from message text. Returns `None` when the text is
    /// not a slash command at all.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if !text.starts_with('/') {
            return None;
        }
        let first = text.split_whitespace().next()?;
        let rest = text[first.len()..].trim();
        // Strip @botname suffix (e.g. "/shot@relay_bot" → "/shot").
        let cmd = first.split('@').next().unwrap_or(first);
        Some(match cmd {
            "/status" => Self::Status,
            "/pr" => Self::Pr(strip_quotes(rest).trim().to_string()),
            "/shot" => Self::Shot(ShotTarget::parse(rest)),
            "/help" | "/start" => Self::Help,
            _ => Self::Unknown,
        })
    }
}

/// Remove one pair of matching surrounding quotes.
fn strip_quotes(s: &str) -> &str {
    for q in ['"', '\''] {
        if let Some(inner) = s.strip_prefix(q).and_then(|r| r.strip_suffix(q)) {
            return inner;
        }
    }
    s
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
