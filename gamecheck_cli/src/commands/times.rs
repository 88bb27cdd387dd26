use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use gamecheck_lib::records::{write_times, TimesRecord};
use gamecheck_lib::{GameClient, Settings, Source};

use super::{games_path, load_games, progress_bar};
use crate::output::{print_times, OutputFormat};

#[derive(Args)]
pub struct TimesArgs {
    /// Games list (default: games_file from settings)
    #[arg(long)]
    pub games: Option<PathBuf>,

    /// Where to write the times file (default: times_file from settings)
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Looks every game up on HowLongToBeat, one at a time, and writes the
/// times file.
pub async fn run(
    args: &TimesArgs,
    client: &GameClient,
    settings: &Settings,
    format: &OutputFormat,
) -> Result<()> {
    let Some(games) = load_games(&games_path(&args.games, &settings.games_file))? else {
        return Ok(());
    };

    let pb = progress_bar(games.len(), "fetching completion times...");
    let mut records = Vec::with_capacity(games.len());
    for name in &games {
        let record = match client.lookup(Source::HowLongToBeat, name).await {
            Ok(lookup) => TimesRecord::from_lookup(name, &lookup),
            Err(e) => {
                pb.println(format!("  Warning: '{}' failed: {}", name, e));
                TimesRecord::unavailable(name)
            }
        };
        tracing::info!("{}", record.to_line());
        records.push(record);
        pb.inc(1);
    }
    pb.finish_and_clear();

    let out = args.out.clone().unwrap_or_else(|| settings.times_file.clone());
    write_times(&out, &records)?;
    let found = records.iter().filter(|r| !r.is_empty()).count();
    eprintln!(
        "Wrote {} games ({} with times) to {}",
        records.len(),
        found,
        out.display()
    );
    if found == 0 {
        tracing::warn!("no completion times found for any game");
    }

    print_times(&records, format)
}
