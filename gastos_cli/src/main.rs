mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gastos")]
#[command(about = "Refresh and inspect Chamber of Deputies quota spending data")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the roster and the yearly archive, then rewrite the static JSON files
    Refresh(commands::refresh::RefreshArgs),
    /// Print the per-deputy totals from a previous refresh
    Show(commands::show::ShowArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("gastos=info".parse()?),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Refresh(args) => commands::refresh::run(args).await?,
        Commands::Show(args) => commands::show::run(args)?,
    }

    Ok(())
}
