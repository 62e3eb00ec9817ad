// src/main.rs
// BFHL server entry point

use anyhow::Result;
use bfhl::{ServerConfig, server};
use clap::Parser;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "bfhl")]
#[command(about = "Fibonacci, prime, LCM, HCF and AI answer operations behind one endpoint")]
#[command(version)]
struct Cli {
    /// Address to bind (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Operator identity returned in success responses (overrides OFFICIAL_EMAIL)
    #[arg(long)]
    official_email: Option<String>,

    /// Enable debug logging
    #[arg(short, long, env = "BFHL_DEBUG", default_value_t = false)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env from current directory
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::INFO })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = ServerConfig::from_env();
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(email) = cli.official_email {
        config.official_email = email;
    }

    info!("Starting BFHL server v{}", env!("CARGO_PKG_VERSION"));
    server::run(config).await
}
