use super::*;
use async_trait::async_trait;
use relay_capture::{Capturer, ServerConfig};
use relay_core::{error::RelayError, message::AgentReply};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const OWNER: &str = "42";
const DENY: &str = "⛔ Unauthorized user";

// --- doubles ---------------------------------------------------------------

#[derive(Default)]
struct FakeChannel {
    batches: Mutex<VecDeque<Result<Vec<IncomingMessage>, String>>>,
    offsets: Mutex<Vec<Option<i64>>>,
    texts: Mutex<Vec<String>>,
    photos: Mutex<Vec<(PathBuf, String)>>,
}

impl FakeChannel {
    fn push_batch(&self, batch: Vec<IncomingMessage>) {
        self.batches.lock().unwrap().push_back(Ok(batch));
    }

    fn push_error(&self, err: &str) {
        self.batches.lock().unwrap().push_back(Err(err.to_string()));
    }

    fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }

    fn photos(&self) -> Vec<(PathBuf, String)> {
        self.photos.lock().unwrap().clone()
    }
}

#[async_trait]
impl Channel for FakeChannel {
    fn name(&self) -> &str {
        "fake"
    }

    async fn get_updates(
        &self,
        offset: Option<i64>,
        _timeout: Duration,
    ) -> Result<Vec<IncomingMessage>, RelayError> {
        self.offsets.lock().unwrap().push(offset);
        match self.batches.lock().unwrap().pop_front() {
            Some(Ok(batch)) => Ok(batch),
            Some(Err(e)) => Err(RelayError::Channel(e)),
            None => Ok(Vec::new()),
        }
    }

    async fn send_text(&self, text: &str) -> Result<(), RelayError> {
        self.texts.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn send_file(&self, path: &Path, caption: &str) -> Result<(), RelayError> {
        self.send_photo(path, caption).await
    }

    async fn send_photo(&self, path: &Path, caption: &str) -> Result<(), RelayError> {
        self.photos
            .lock()
            .unwrap()
            .push((path.to_path_buf(), caption.to_string()));
        Ok(())
    }
}

#[derive(Default)]
struct FakeAgent {
    prompts: Mutex<Vec<String>>,
    panic_on_run: bool,
}

#[async_trait]
impl Agent for FakeAgent {
    fn name(&self) -> &str {
        "fake-agent"
    }

    fn is_running(&self) -> bool {
        false
    }

    async fn run(&self, prompt: &str) -> AgentReply {
        if self.panic_on_run {
            panic!("agent blew up");
        }
        self.prompts.lock().unwrap().push(prompt.to_string());
        AgentReply::Output(format!("done: {prompt}"))
    }
}

#[derive(Default)]
struct FakePrs {
    calls: Mutex<Vec<String>>,
}

#[async_trait]
impl PullRequests for FakePrs {
    async fn create_pr(&self, description: &str) -> String {
        self.calls.lock().unwrap().push(description.to_string());
        "[SUCCESS] PR created!\nhttps://example.test/pr/1".to_string()
    }
}

#[derive(Default)]
struct FakeCapturer {
    urls: Mutex<Vec<String>>,
}

#[async_trait]
impl Capturer for FakeCapturer {
    async fn capture(&self, url: &str) -> Option<PathBuf> {
        self.urls.lock().unwrap().push(url.to_string());
        Some(PathBuf::from("/tmp/shot_fake.png"))
    }
}

struct Harness {
    gateway: Gateway,
    channel: Arc<FakeChannel>,
    agent: Arc<FakeAgent>,
    prs: Arc<FakePrs>,
    capturer: Arc<FakeCapturer>,
    _project: tempfile::TempDir,
}

fn harness_with(agent: FakeAgent, html: &[&str]) -> Harness {
    let project = tempfile::tempdir().unwrap();
    for rel in html {
        let path = project.path().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "<html><body>hi</body></html>").unwrap();
    }

    let channel = Arc::new(FakeChannel::default());
    let agent = Arc::new(agent);
    let prs = Arc::new(FakePrs::default());
    let capturer = Arc::new(FakeCapturer::default());

    let server = ServerConfig {
        program: "python3".to_string(),
        base_port: 40000 + (std::process::id() % 20000) as u16,
        max_attempts: 3,
        settle: Duration::from_millis(800),
        probe_timeout: Duration::from_secs(1),
        stop_grace: Duration::from_secs(2),
    };
    let shots = Arc::new(Screenshotter::new(
        project.path().to_path_buf(),
        server,
        capturer.clone(),
    ));
    let settings = GatewaySettings {
        name: "Relay".to_string(),
        allowed_user: OWNER.to_string(),
        deny_message: DENY.to_string(),
        project_dir: project.path().to_path_buf(),
        poll_timeout: Duration::ZERO,
        error_backoff: Duration::ZERO,
        batch_pause: Duration::ZERO,
    };

    let gateway = Gateway::new(
        channel.clone(),
        agent.clone(),
        prs.clone(),
        shots,
        settings,
    );
    Harness {
        gateway,
        channel,
        agent,
        prs,
        capturer,
        _project: project,
    }
}

fn harness(html: &[&str]) -> Harness {
    harness_with(FakeAgent::default(), html)
}

fn from_owner(update_id: i64, text: &str) -> IncomingMessage {
    IncomingMessage::text(update_id, Some(OWNER), text)
}

fn python_available() -> bool {
    std::process::Command::new("python3")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

// --- authorization ---------------------------------------------------------

#[tokio::test]
async fn test_unauthorized_sender_only_gets_rejection() {
    let mut h = harness(&["index.html"]);
    h.channel.push_batch(vec![
        IncomingMessage::text(1, Some("999"), "/pr sneaky change"),
        IncomingMessage::text(2, Some("999"), "take a screenshot"),
        IncomingMessage::text(3, Some("999"), "delete everything"),
        IncomingMessage::text(4, Some("999"), "/shot"),
    ]);

    h.gateway.poll_once().await.unwrap();

    assert_eq!(h.channel.texts(), vec![DENY; 4]);
    assert!(h.agent.prompts.lock().unwrap().is_empty());
    assert!(h.prs.calls.lock().unwrap().is_empty());
    assert!(h.capturer.urls.lock().unwrap().is_empty());
    assert!(h.channel.photos().is_empty());
}

#[tokio::test]
async fn test_missing_sender_is_unauthorized() {
    let mut h = harness(&[]);
    h.channel
        .push_batch(vec![IncomingMessage::text(1, None, "hello")]);
    h.gateway.poll_once().await.unwrap();
    assert_eq!(h.channel.texts(), vec![DENY]);
    assert!(h.agent.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_text_is_skipped_but_acknowledged() {
    let mut h = harness(&[]);
    h.channel.push_batch(vec![
        IncomingMessage::text(7, None, ""),
        from_owner(8, "   "),
    ]);
    h.gateway.poll_once().await.unwrap();
    assert!(h.channel.texts().is_empty());
    assert_eq!(h.gateway.offset(), Some(9));
}

// --- commands --------------------------------------------------------------

#[tokio::test]
async fn test_pr_with_empty_description_is_usage_error() {
    let mut h = harness(&[]);
    h.channel.push_batch(vec![from_owner(1, "/pr \"\"")]);
    h.gateway.poll_once().await.unwrap();
    assert_eq!(h.channel.texts(), vec!["Usage: /pr <description of changes>"]);
    assert!(h.prs.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_pr_delegates_description() {
    let mut h = harness(&[]);
    h.channel.push_batch(vec![from_owner(1, "/pr Add dark mode")]);
    h.gateway.poll_once().await.unwrap();
    assert_eq!(*h.prs.calls.lock().unwrap(), vec!["Add dark mode"]);
    let texts = h.channel.texts();
    assert_eq!(texts[0], "[WAIT] Creating PR...");
    assert!(texts[1].starts_with("[SUCCESS] PR created!"));
}

#[tokio::test]
async fn test_status_and_unknown_and_help() {
    let mut h = harness(&[]);
    h.channel.push_batch(vec![
        from_owner(1, "/status"),
        from_owner(2, "/frobnicate"),
        from_owner(3, "/help@relay_bot"),
    ]);
    h.gateway.poll_once().await.unwrap();
    let texts = h.channel.texts();
    assert_eq!(texts.len(), 3);
    assert!(texts[0].starts_with("Status: [ONLINE]"));
    assert!(texts[0].contains(&h.gateway.settings.project_dir.display().to_string()));
    assert!(texts[1].starts_with("Unknown command."));
    assert!(texts[2].starts_with("Commands:"));
    assert!(h.agent.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_free_text_goes_to_agent() {
    let mut h = harness(&[]);
    h.channel
        .push_batch(vec![from_owner(1, "make the header blue")]);
    h.gateway.poll_once().await.unwrap();
    assert_eq!(*h.agent.prompts.lock().unwrap(), vec!["make the header blue"]);
    assert_eq!(
        h.channel.texts(),
        vec!["[WAIT] Claude is thinking...", "done: make the header blue"]
    );
}

// --- screenshots -----------------------------------------------------------

#[tokio::test]
async fn test_natural_language_url_is_external_and_skips_resolver() {
    let mut h = harness(&["index.html"]);
    h.channel
        .push_batch(vec![from_owner(1, "screenshot example.com")]);
    h.gateway.poll_once().await.unwrap();

    assert_eq!(*h.capturer.urls.lock().unwrap(), vec!["https://example.com"]);
    assert!(h.gateway.shots.resolver().cached().is_none(), "resolver untouched");
    assert!(h.agent.prompts.lock().unwrap().is_empty(), "not forwarded to agent");
    assert_eq!(
        h.channel.photos(),
        vec![(
            PathBuf::from("/tmp/shot_fake.png"),
            "Screenshot: https://example.com".to_string()
        )]
    );
}

#[tokio::test]
async fn test_shot_with_url_argument() {
    let mut h = harness(&[]);
    h.channel
        .push_batch(vec![from_owner(1, "/shot docs.rs/tokio")]);
    h.gateway.poll_once().await.unwrap();
    assert_eq!(*h.capturer.urls.lock().unwrap(), vec!["https://docs.rs/tokio"]);
}

#[tokio::test]
async fn test_local_shot_without_html_fails_softly() {
    let mut h = harness(&[]);
    h.channel.push_batch(vec![from_owner(1, "/shot")]);
    h.gateway.poll_once().await.unwrap();
    assert!(h.capturer.urls.lock().unwrap().is_empty());
    assert_eq!(
        h.channel.texts(),
        vec![
            "[WAIT] Taking screenshot of Default page...",
            "[ERROR] Screenshot failed. Check logs."
        ]
    );
}

#[tokio::test]
async fn test_shot_serves_index_html() {
    if !python_available() {
        eprintln!("python3 not found, skipping");
        return;
    }
    let mut h = harness(&["index.html", "other/page.html"]);
    h.channel.push_batch(vec![from_owner(1, "/shot")]);
    h.gateway.poll_once().await.unwrap();

    let urls = h.capturer.urls.lock().unwrap().clone();
    assert_eq!(urls.len(), 1);
    let base = urls[0]
        .strip_suffix("/index.html")
        .expect("served URL ends with /index.html");
    let port: u16 = base
        .strip_prefix("http://localhost:")
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(urls[0], format!("http://localhost:{port}/index.html"));
    assert_eq!(h.channel.photos()[0].1, "Screenshot: Default page");
}

// --- loop mechanics --------------------------------------------------------

#[tokio::test]
async fn test_offset_only_increases() {
    let mut h = harness(&[]);
    h.channel
        .push_batch(vec![from_owner(5, "/help"), from_owner(6, "/help")]);
    // A stale redelivery must not move the offset backwards.
    h.channel.push_batch(vec![from_owner(3, "/help")]);
    h.channel.push_batch(vec![from_owner(10, "/help")]);

    h.gateway.poll_once().await.unwrap();
    assert_eq!(h.gateway.offset(), Some(7));
    h.gateway.poll_once().await.unwrap();
    assert_eq!(h.gateway.offset(), Some(7));
    h.gateway.poll_once().await.unwrap();
    assert_eq!(h.gateway.offset(), Some(11));

    assert_eq!(
        *h.channel.offsets.lock().unwrap(),
        vec![None, Some(7), Some(7)]
    );
}

#[tokio::test]
async fn test_poll_error_keeps_offset() {
    let mut h = harness(&[]);
    h.channel.push_batch(vec![from_owner(1, "/help")]);
    h.channel.push_error("network down");

    h.gateway.poll_once().await.unwrap();
    let err = h.gateway.poll_once().await.unwrap_err();
    assert!(err.to_string().contains("network down"));
    assert_eq!(h.gateway.offset(), Some(2));
}

#[tokio::test]
async fn test_panicking_handler_is_contained() {
    let agent = FakeAgent {
        panic_on_run: true,
        ..Default::default()
    };
    let mut h = harness_with(agent, &[]);
    h.channel
        .push_batch(vec![from_owner(1, "hello"), from_owner(2, "/status")]);

    let err = h.gateway.poll_once().await.unwrap_err();
    assert!(err.to_string().contains("panicked"));
    assert_eq!(h.gateway.offset(), Some(3), "both updates acknowledged");
    let texts = h.channel.texts();
    assert!(texts.last().unwrap().starts_with("Status: [ONLINE]"));
}

#[test]
fn test_settings_from_config() {
    let mut cfg = Config::default();
    cfg.telegram.chat_id = "100".into();
    cfg.gateway.error_backoff_secs = 9;
    let settings = GatewaySettings::from_config(&cfg, PathBuf::from("/srv/site"));
    assert_eq!(settings.allowed_user, "100");
    assert_eq!(settings.error_backoff, Duration::from_secs(9));
    assert_eq!(settings.poll_timeout, Duration::from_secs(30));
    assert_eq!(settings.batch_pause, Duration::from_millis(1000));
}
