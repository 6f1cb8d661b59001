use anyhow::Result;
use clap::{Parser, Subcommand};
use pitchbridge_backend::api;
use pitchbridge_backend::bootstrap;
use pitchbridge_backend::config::PitchbridgeConfig;
use pitchbridge_backend::telemetry;

#[derive(Parser)]
#[command(author, version, about = "Pitchbridge backend daemon")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (Axum) for REST/API access
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();

    let args = Args::parse();

    let config = PitchbridgeConfig::from_env()?;
    let resources = bootstrap::initialize(&config)?;
    tracing::info!(
        db_initialized = resources.database_initialized,
        directories_created = resources.directories_created.len(),
        "bootstrap complete"
    );

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => api::serve_http(config, resources.database).await,
    }
}
