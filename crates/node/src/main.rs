// node/src/main.rs
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blockchain_core::Settings;
use node::{DemoConfig, Node};

#[derive(Parser)]
#[command(name = "consensus-demo")]
#[command(about = "Runs the proof-of-stake consensus core against an in-memory chain", version)]
struct Cli {
    /// Path to a demo configuration TOML file.
    #[arg(short, long)]
    config: Option<String>,

    /// Path to a consensus Settings TOML file. Falls back to the demo
    /// config's `settings_path`, then to `Settings::default()`.
    #[arg(short, long)]
    settings: Option<String>,

    /// Enable debug logging.
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}={}", env!("CARGO_PKG_NAME"), log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match &cli.config {
        Some(path) => {
            tracing::info!(path, "loading demo configuration");
            DemoConfig::from_file(path)?
        }
        None => DemoConfig::default(),
    };

    let (settings, using_default_settings) = match cli.settings.as_ref().or(config.settings_path.as_ref()) {
        Some(path) => {
            tracing::info!(path, "loading consensus settings");
            (Settings::from_file(path)?, false)
        }
        None => {
            tracing::info!("no settings file given, using defaults");
            (Settings::default(), true)
        }
    };

    let node = Node::new(settings, config, using_default_settings)?;
    node.run().await?;

    Ok(())
}
