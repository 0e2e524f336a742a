//! Headless Chrome capture via the DevTools protocol.

use async_trait::async_trait;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use relay_core::{config::CaptureConfig, error::RelayError};
use std::fmt::Display;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Renders a URL to an image file.
#[async_trait]
pub trait Capturer: Send + Sync {
    /// Capture `url` and return the saved image path. `None` on any failure.
    async fn capture(&self, url: &str) -> Option<PathBuf>;
}

/// Launches a fresh headless Chrome per capture.
pub struct ChromeCapturer {
    output_dir: PathBuf,
    chrome_path: Option<PathBuf>,
    navigation_timeout: Duration,
    /// Bound on each teardown step (close, then wait for exit).
    close_grace: Duration,
    window: (u32, u32),
}

impl ChromeCapturer {
    pub fn from_config(config: &CaptureConfig, output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            chrome_path: config
                .chrome_path
                .as_deref()
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            navigation_timeout: Duration::from_secs(config.navigation_timeout_secs),
            close_grace: Duration::from_secs(config.stop_grace_secs),
            window: (config.window_width, config.window_height),
        }
    }

    fn browser_config(&self) -> Result<BrowserConfig, RelayError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--hide-scrollbars")
            .window_size(self.window.0, self.window.1)
            .request_timeout(self.navigation_timeout);
        if let Some(path) = &self.chrome_path {
            builder = builder.chrome_executable(path);
        }
        builder.build().map_err(RelayError::Capture)
    }

    async fn capture_to(&self, url: &str, path: &Path) -> Result<(), RelayError> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let (mut browser, mut handler) = Browser::launch(self.browser_config()?)
            .await
            .map_err(|e| RelayError::Capture(format!("browser launch failed: {e}")))?;
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("browser handler event error: {e}");
                }
            }
        });

        let result = self.render(&browser, url, path).await;

        self.release(&mut browser).await;
        handler_task.abort();
        result
    }

    /// Close the browser, escalating to a kill. Every step is bounded.
    async fn release(&self, browser: &mut Browser) {
        if !teardown_step("close", self.close_grace, browser.close()).await {
            if let Some(Err(e)) = browser.kill().await {
                warn!("browser kill failed: {e}");
            }
        }
        if !teardown_step("wait", self.close_grace, browser.wait()).await {
            if let Some(Err(e)) = browser.kill().await {
                warn!("browser kill failed: {e}");
            }
        }
    }

    async fn render(&self, browser: &Browser, url: &str, path: &Path) -> Result<(), RelayError> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| RelayError::Capture(format!("failed to open page: {e}")))?;

        tokio::time::timeout(self.navigation_timeout, page.goto(url))
            .await
            .map_err(|_| {
                RelayError::Capture(format!(
                    "navigation to {url} timed out after {}s",
                    self.navigation_timeout.as_secs()
                ))
            })?
            .map_err(|e| RelayError::Capture(format!("navigation to {url} failed: {e}")))?;

        page.save_screenshot(ScreenshotParams::builder().full_page(true).build(), path)
            .await
            .map_err(|e| RelayError::Capture(format!("screenshot failed: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl Capturer for ChromeCapturer {
    async fn capture(&self, url: &str) -> Option<PathBuf> {
        let path = self.output_dir.join(artifact_name(chrono::Utc::now()));
        info!("capturing {url} to {}", path.display());
        match self.capture_to(url, &path).await {
            Ok(()) => Some(path),
            Err(e) => {
                warn!("capture of {url} failed: {e}");
                None
            }
        }
    }
}

/// Await one teardown step for at most `grace`. `true` only if it finished cleanly.
async fn teardown_step<T, E: Display>(
    step: &str,
    grace: Duration,
    fut: impl Future<Output = Result<T, E>>,
) -> bool {
    match tokio::time::timeout(grace, fut).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            debug!("browser {step} failed: {e}");
            false
        }
        Err(_) => {
            warn!("browser {step} timed out after {}ms", grace.as_millis());
            false
        }
    }
}

/// `shot_<unix millis>.png`.
pub(crate) fn artifact_name(now: chrono::DateTime<chrono::Utc>) -> String {
    format!("shot_{}.png", now.timestamp_millis())
}
