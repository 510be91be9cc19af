use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use whodunit::{ServerConfig, WhodunitError, WhodunitServerBuilder};

/// Hosts one shared game of whodunit over WebSocket.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// TOML config file (default: ./whodunit.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Address to listen on, overrides the config file and environment
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), WhodunitError> {
    let args = Args::parse();

    let mut config = ServerConfig::load(args.config.as_deref())?;
    config.apply_cli(args.bind);

    let directive = config.log_directive(std::env::var("RUST_LOG").ok());
    let filter = EnvFilter::try_new(&directive)
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    config.validate()?;

    let server = WhodunitServerBuilder::from_config(&config).build().await?;
    let room = server.room();
    tracing::info!(addr = %config.bind_addr, "whodunit server starting");

    tokio::select! {
        result = server.run() => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
            room.shutdown().await?;
            Ok(())
        }
    }
}
