mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use gamecheck_lib::{GameClient, Settings};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "gamecheck")]
#[command(about = "Look up game completion times, critic scores and store prices")]
struct Cli {
    /// Output format: table, json, csv or markdown
    #[arg(long, default_value = "table", global = true)]
    output: String,

    /// Settings file (default: gamecheck.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Save fetched HTML when a lookup finds nothing
    #[arg(long, global = true)]
    debug_html: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch HowLongToBeat completion times for the games list
    Times(commands::times::TimesArgs),
    /// Fetch Metacritic scores for the games list
    Scores(commands::scores::ScoresArgs),
    /// Fetch store prices and write the HTML report
    Prices(commands::prices::PricesArgs),
    /// Look one game up on selected sources
    Lookup(commands::lookup::LookupArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gamecheck=info".parse()?),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let format = OutputFormat::parse(&cli.output);

    let mut settings = Settings::load(cli.config.as_deref())?;
    if cli.debug_html {
        settings.debug_html = true;
    }
    let client = GameClient::new(&settings)?;

    match &cli.command {
        Commands::Times(args) => commands::times::run(args, &client, &settings, &format).await?,
        Commands::Scores(args) => commands::scores::run(args, &client, &settings, &format).await?,
        Commands::Prices(args) => commands::prices::run(args, client, &settings, &format).await?,
        Commands::Lookup(args) => commands::lookup::run(args, &client, &format).await?,
    }

    Ok(())
}
