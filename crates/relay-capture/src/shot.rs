//! Local and external screenshot orchestration.

use crate::browser::{Capturer, ChromeCapturer};
use crate::server::{EphemeralServer, ServerConfig};
use crate::targets::{TargetMap, TargetResolver};
use relay_core::config::Config;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Ties target discovery, the static server, and the capturer together.
pub struct Screenshotter {
    resolver: TargetResolver,
    server: EphemeralServer,
    capturer: Arc<dyn Capturer>,
}

impl Screenshotter {
    pub fn new(project_dir: PathBuf, server: ServerConfig, capturer: Arc<dyn Capturer>) -> Self {
        Self {
            resolver: TargetResolver::new(project_dir),
            server: EphemeralServer::new(server),
            capturer,
        }
    }

    /// Build the production pipeline (headless Chrome) from config.
    pub fn from_config(config: &Config, project_dir: PathBuf) -> Self {
        let output_dir = config
            .capture
            .resolved_output_dir(&config.relay.data_dir);
        let capturer = ChromeCapturer::from_config(&config.capture, output_dir);
        Self::new(
            project_dir,
            ServerConfig::from_capture(&config.capture),
            Arc::new(capturer),
        )
    }

    pub fn resolver(&self) -> &TargetResolver {
        &self.resolver
    }

    /// Capture an absolute URL directly.
    pub async fn capture_url(&self, url: &str) -> Option<PathBuf> {
        self.capturer.capture(url).await
    }

    /// Serve the project and capture the file mapped to `keyword`.
    ///
    /// The server is stopped before returning on every path.
    pub async fn capture_project(&self, keyword: &str) -> Option<PathBuf> {
        let Some(map) = self.resolver.resolve() else {
            warn!("no HTML files to capture in {}", self.resolver.root().display());
            return None;
        };
        let target = map.get(keyword);
        info!("local capture: {keyword} -> {}", target.display());

        let mut server = match self.server.start(map.root()).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!("local capture aborted: {e}");
                return None;
            }
        };

        let url = served_url(server.base_url(), &map, target);
        info!("capturing served URL {url}");
        let shot = self.capturer.capture(&url).await;
        server.stop().await;
        shot
    }
}

/// `base_url` + `/` + the target's path relative to the served root.
pub fn served_url(base_url: &str, map: &TargetMap, target: &Path) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), map.url_path(target))
}
