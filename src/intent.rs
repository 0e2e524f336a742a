//! Natural-language screenshot intent detection.
//!
//! Rule order matters and is deliberately permissive: a trigger word alone
//! counts as a request unless no action verb is present *and* one of the
//! conversational disqualifiers appears.

use regex::Regex;
use std::sync::OnceLock;

/// Classification of one free-text message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Intent {
    pub is_screenshot: bool,
    /// `page`, `project`, `build`, `app`, or `default`.
    pub keyword: Option<&'static str>,
    /// URL as written in the message, without a scheme added.
    pub url: Option<String>,
}

impl Intent {
    fn none() -> Self {
        Self::default()
    }
}

const DISQUALIFIERS: &[&str] = &["about", "feature", "tool", "tutorial"];

struct Patterns {
    triggers: Vec<Regex>,
    actions: Vec<Regex>,
    keywords: Vec<(&'static str, Regex)>,
    urls: Vec<Regex>,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let re = |p: &str| Regex::new(p).unwrap_or_else(|e| panic!("bad pattern {p}: {e}"));
        Patterns {
            triggers: [
                r"\bscreenshot\b",
                r"\bshot\b",
                r"\btake\s+a\s+screenshot\b",
                r"\bcapture\b",
                r"\bsnap\b",
            ]
            .into_iter()
            .map(re)
            .collect(),
            actions: [
                r"(?:take|make|capture|create|shoot|snap)",
                r"^screenshot\b",
                r"^shot\b",
            ]
            .into_iter()
            .map(re)
            .collect(),
            keywords: [
                ("page", r"\b(?:the\s+)?page\b"),
                ("project", r"\b(?:the\s+)?project\b"),
                ("build", r"\b(?:the\s+)?build\b"),
                ("app", r"\b(?:the\s+)?app(?:lication)?\b"),
                ("default", r"\b(?:the\s+)?(?:webpage|website|site)\b"),
            ]
            .into_iter()
            .map(|(k, p)| (k, re(p)))
            .collect(),
            urls: [
                r"(?i)https?://[^\s]+",
                r"(?i)www\.[^\s]+",
                r"(?i)[a-z0-9-]+\.(?:com|org|net|io|co|dev|app|site|web)",
            ]
            .into_iter()
            .map(re)
            .collect(),
        }
    })
}

/// Classify free text. Pure: no I/O.
pub fn classify(text: &str) -> Intent {
    let p = patterns();
    let original = text.trim();
    let lower = original.to_lowercase();

    if !p.triggers.iter().any(|r| r.is_match(&lower)) {
        return Intent::none();
    }

    let has_action = p.actions.iter().any(|r| r.is_match(&lower));
    if !has_action && DISQUALIFIERS.iter().any(|w| lower.contains(w)) {
        return Intent::none();
    }

    let keyword = p
        .keywords
        .iter()
        .find(|(_, r)| r.is_match(&lower))
        .map(|(k, _)| *k);

    // Behaviour change: URLs come from the original text, not the lowercased
    // copy, so case-sensitive paths survive.
    let url = p
        .urls
        .iter()
        .find_map(|r| r.find(original))
        .map(|m| m.as_str().to_string());

    Intent {
        is_screenshot: true,
        keyword,
        url,
    }
}

/// Add `https://` unless the URL already has an http(s) scheme.
pub fn with_scheme(url: &str) -> String {
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}
