use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "linkcount")]
#[command(about = "Count absolute links on a fixed set of web pages over HTTP", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server
    Server(ServerArgs),
}

#[derive(clap::Args, Debug)]
pub struct ServerArgs {
    /// Port to listen on (overrides the configured port, default 8888)
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Path to a TOML configuration file
    #[arg(long, env = "LINKCOUNT_CONFIG")]
    pub config: Option<PathBuf>,
}
