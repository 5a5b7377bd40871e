mod cli;

use clap::Parser;
use cli::{Cli, Commands, ServerArgs};
use linkcount::config::Config;
use tracing_subscriber::EnvFilter;

type AnyError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), AnyError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("linkcount=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Server(args) => serve(args).await?,
    }

    Ok(())
}

async fn serve(args: ServerArgs) -> Result<(), AnyError> {
    let mut config = match args.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    if let Some(port) = args.port {
        config.server.port = port;
    }

    linkcount::api::run(config).await
}
