//! Ephemeral static file server.
//!
//! Serves one directory over `http://localhost:<port>` for the duration of a
//! single capture. The child is spawned with `kill_on_drop`, so a handle that
//! is dropped without `stop` (panic, cancelled future) still takes the
//! process down.

use relay_core::{config::CaptureConfig, error::RelayError};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

/// Server launch and teardown settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interpreter run as `<program> -m http.server <port> --directory <dir>`.
    pub program: String,
    pub base_port: u16,
    pub max_attempts: u16,
    /// Wait after spawning before the readiness probe.
    pub settle: Duration,
    pub probe_timeout: Duration,
    /// Time allowed for a graceful exit before SIGKILL.
    pub stop_grace: Duration,
}

impl ServerConfig {
    pub fn from_capture(config: &CaptureConfig) -> Self {
        Self {
            program: config.server_program.clone(),
            base_port: config.base_port,
            max_attempts: config.max_attempts.max(1),
            settle: Duration::from_millis(config.settle_ms),
            probe_timeout: Duration::from_secs(config.probe_timeout_secs),
            stop_grace: Duration::from_secs(config.stop_grace_secs),
        }
    }
}

/// A running server. Owned by exactly one capture operation.
#[derive(Debug)]
pub struct ServerHandle {
    child: Option<Child>,
    port: u16,
    base_url: String,
    stop_grace: Duration,
}

impl ServerHandle {
    pub fn port(&self) -> u16 {
        self.port
    }

    /// `http://localhost:<port>`, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Terminate the server: SIGTERM, wait up to the grace period, then
    /// SIGKILL and reap. Calling it again is a no-op.
    pub async fn stop(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };
        info!("stopping static server on port {}", self.port);
        terminate(&mut child, self.stop_grace).await;
    }
}

/// Starts static file servers with port fallback.
pub struct EphemeralServer {
    config: ServerConfig,
    client: reqwest::Client,
}

impl EphemeralServer {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Serve `dir`, trying `base_port`, `base_port + 1`, … until one
    /// instance answers the readiness probe.
    pub async fn start(&self, dir: &Path) -> Result<ServerHandle, RelayError> {
        if !dir.is_dir() {
            return Err(RelayError::Capture(format!(
                "directory does not exist: {}",
                dir.display()
            )));
        }

        let first = self.config.base_port;
        for attempt in 0..self.config.max_attempts {
            let Some(port) = first.checked_add(attempt) else {
                break;
            };
            debug!("starting static server on port {port} (attempt {})", attempt + 1);

            let mut child = match self.spawn(dir, port) {
                Ok(c) => c,
                Err(e) => {
                    warn!("static server failed to spawn on port {port}: {e}");
                    continue;
                }
            };

            tokio::time::sleep(self.config.settle).await;

            if let Ok(Some(status)) = child.try_wait() {
                debug!("static server on port {port} exited early: {status}");
                continue;
            }
            if self.probe(port).await {
                info!("static server ready on port {port}");
                return Ok(ServerHandle {
                    child: Some(child),
                    port,
                    base_url: format!("http://localhost:{port}"),
                    stop_grace: self.config.stop_grace,
                });
            }

            debug!("static server on port {port} not reachable, trying next port");
            terminate(&mut child, self.config.stop_grace).await;
        }

        Err(RelayError::Capture(format!(
            "failed to start static server on ports {first}-{}",
            first.saturating_add(self.config.max_attempts.saturating_sub(1))
        )))
    }

    /// Whether anything answers HTTP on `localhost:<port>`. Any response,
    /// including an error status, counts.
    pub async fn probe(&self, port: u16) -> bool {
        self.client
            .get(format!("http://localhost:{port}"))
            .timeout(self.config.probe_timeout)
            .send()
            .await
            .is_ok()
    }

    fn spawn(&self, dir: &Path, port: u16) -> std::io::Result<Child> {
        Command::new(&self.config.program)
            .arg("-m")
            .arg("http.server")
            .arg(port.to_string())
            .arg("--directory")
            .arg(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
    }
}

async fn terminate(child: &mut Child, grace: Duration) {
    if let Some(pid) = child.id() {
        // SAFETY: `pid` belongs to a child we have not yet reaped.
        unsafe {
            libc::kill(pid as libc::pid_t, libc::SIGTERM);
        }
    }

    match tokio::time::timeout(grace, child.wait()).await {
        Ok(Ok(status)) => debug!("static server exited: {status}"),
        Ok(Err(e)) => warn!("failed to wait for static server: {e}"),
        Err(_) => {
            warn!("static server ignored SIGTERM, killing");
            if let Err(e) = child.kill().await {
                warn!("failed to kill static server: {e}");
            }
        }
    }
}
