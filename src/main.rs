mod commands;
mod gateway;
mod intent;
mod lock;

use clap::{Parser, Subcommand};
use commands::ShotTarget;
use relay_capture::Screenshotter;
use relay_channels::telegram::TelegramChannel;
use relay_core::config::{self, Config};
use relay_providers::{claude_code::ClaudeCodeAgent, git_pr::GitPrCreator};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "relay",
    version,
    about = "Relay: Telegram bridge to a local coding agent"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bridge.
    Start,
    /// Show configuration and collaborator availability.
    Status,
    /// Take one screenshot: empty, project|build|app|page, or a URL.
    Shot {
        #[arg(trailing_var_arg = true)]
        target: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_with_env(&cli.config)?;
    let _log_guard = init_logging(&cfg)?;
    // Loading ran before the subscriber existed; report the source now.
    info!("{}", config_source(&cli.config));

    // The claude CLI rejects permission bypass for root.
    if unsafe { libc::geteuid() } == 0 {
        anyhow::bail!("relay must not run as root; start it as the user that owns the project");
    }

    match cli.command {
        Commands::Start => start(cfg).await?,
        Commands::Status => print_status(&cli.config, &cfg).await,
        Commands::Shot { target } => {
            let project_dir = cfg.project.resolved_dir();
            let shots = Screenshotter::from_config(&cfg, project_dir);
            let target = ShotTarget::parse(&target.join(" "));
            let shot = match &target {
                ShotTarget::Local(keyword) => shots.capture_project(keyword).await,
                ShotTarget::External(url) => shots.capture_url(url).await,
            };
            match shot {
                Some(path) => println!("{}", path.display()),
                None => anyhow::bail!("screenshot of {} failed, see logs", target.label()),
            }
        }
    }

    Ok(())
}

fn config_source(path: &str) -> String {
    if Path::new(path).exists() {
        format!("config loaded from {path}")
    } else {
        format!("config file {path} not found, using defaults")
    }
}

/// stderr plus a non-blocking file layer at `{data_dir}/logs/relay.log`.
fn init_logging(cfg: &Config) -> anyhow::Result<WorkerGuard> {
    let log_dir = cfg.data_dir().join("logs");
    std::fs::create_dir_all(&log_dir)?;
    let file_appender = tracing_appender::rolling::never(&log_dir, "relay.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.relay.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false),
        )
        .init();
    Ok(guard)
}

async fn start(cfg: Config) -> anyhow::Result<()> {
    cfg.validate()?;

    let _lock = lock::InstanceLock::acquire(&cfg.data_dir().join("relay.lock"))?;

    let project_dir = cfg.project.resolved_dir();
    info!("{} starting | project: {}", cfg.relay.name, project_dir.display());

    let channel = Arc::new(TelegramChannel::new(&cfg.telegram));
    let agent = Arc::new(ClaudeCodeAgent::from_config(&cfg.agent, project_dir.clone()));
    let prs = Arc::new(GitPrCreator::from_config(&cfg.pr, project_dir.clone()));
    let shots = Arc::new(Screenshotter::from_config(&cfg, project_dir.clone()));
    let settings = gateway::GatewaySettings::from_config(&cfg, project_dir);

    let mut gw = gateway::Gateway::new(channel, agent, prs, shots, settings);
    tokio::select! {
        _ = gw.run() => {}
        reason = shutdown_signal() => info!("received {reason}, shutting down"),
    }
    gw.say_goodbye().await;
    info!("shutdown complete");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() -> &'static str {
    let mut term = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            error!("failed to install SIGTERM handler: {e}");
            return match tokio::signal::ctrl_c().await {
                Ok(()) => "SIGINT",
                Err(_) => "signal error",
            };
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => "SIGINT",
        _ = term.recv() => "SIGTERM",
    }
}

async fn print_status(config_path: &str, cfg: &Config) {
    println!("Relay status\n");
    println!("Config: {config_path}");
    println!("Data dir: {}", cfg.data_dir().display());
    let project_dir = cfg.project.resolved_dir();
    println!("Project: {}", project_dir.display());
    println!();

    println!(
        "  telegram: {}",
        match cfg.validate() {
            Ok(()) => "configured".to_string(),
            Err(e) => e.to_string(),
        }
    );
    let available = ClaudeCodeAgent::check_cli(&cfg.agent.program).await;
    println!(
        "  {}: {}",
        cfg.agent.program,
        if available { "available" } else { "not found" }
    );
    println!();

    let shots = Screenshotter::from_config(cfg, project_dir);
    match shots.resolver().resolve() {
        Some(map) => {
            println!("HTML targets:");
            for (keyword, path) in map.keywords() {
                println!("  {keyword} -> {}", map.url_path(path));
            }
        }
        None => println!("HTML targets: none found"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_source_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let path = path.to_str().unwrap();
        assert!(config_source(path).contains("not found, using defaults"));

        std::fs::write(path, "").unwrap();
        assert_eq!(config_source(path), format!("config loaded from {path}"));
    }
}
