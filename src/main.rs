use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use inventory_forwarder::app::ForwardUseCase;
use inventory_forwarder::config::Config;
use inventory_forwarder::infra::ReqwestForwarder;
use inventory_forwarder::types::UploadedFile;
use inventory_forwarder::{logging, metrics, server};

#[derive(Parser)]
#[command(name = "inventory_forwarder")]
#[command(about = "Forwards CSV inventory rows to a product service")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to a TOML config file (defaults to ./config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Downstream product-creation endpoint, overrides config and environment
    #[arg(long, global = true)]
    downstream_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP upload endpoint
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Forward a local CSV file and print the per-row outcomes as JSON
    Forward {
        #[arg(long)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let _log_guard = logging::init_logging("forwarder.log");

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(url) = cli.downstream_url {
        config.downstream.url = url;
    }

    let transport = ReqwestForwarder::from_config(&config.downstream)?;
    let forwarder = ForwardUseCase::new(Box::new(transport), config.downstream.url.clone());

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            metrics::init_metrics();
            server::start_server(Arc::new(forwarder), &config).await?;
        }
        Commands::Forward { file } => {
            let content = std::fs::read(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let filename = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            info!("Forwarding {} to {}", file.display(), forwarder.endpoint());

            let summary = forwarder
                .process_upload(Some(UploadedFile::new(filename, content)))
                .await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
