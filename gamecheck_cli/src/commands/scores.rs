use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use gamecheck_lib::engine::ValueKind;
use gamecheck_lib::records::{write_scores, ScoreRecord};
use gamecheck_lib::{GameClient, Settings, Source};

use super::{games_path, load_games, progress_bar};
use crate::output::{print_scores, OutputFormat};

#[derive(Args)]
pub struct ScoresArgs {
    /// Games list (default: games_file from settings)
    #[arg(long)]
    pub games: Option<PathBuf>,

    /// Where to write the scores file (default: scores_file from settings)
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub async fn run(
    args: &ScoresArgs,
    client: &GameClient,
    settings: &Settings,
    format: &OutputFormat,
) -> Result<()> {
    let Some(games) = load_games(&games_path(&args.games, &settings.games_file))? else {
        return Ok(());
    };

    let pb = progress_bar(games.len(), "fetching Metacritic scores...");
    let mut records = Vec::with_capacity(games.len());
    for name in &games {
        let record = match client.lookup(Source::Metacritic, name).await {
            Ok(lookup) => ScoreRecord::from_lookup(name, &lookup),
            Err(e) => {
                pb.println(format!("  Warning: '{}' failed: {}", name, e));
                ScoreRecord {
                    name: name.clone(),
                    score: ValueKind::Score.placeholder().to_string(),
                }
            }
        };
        tracing::info!("{}", record.to_line());
        records.push(record);
        pb.inc(1);
    }
    pb.finish_and_clear();

    let out = args.out.clone().unwrap_or_else(|| settings.scores_file.clone());
    write_scores(&out, &records)?;
    let placeholder = ValueKind::Score.placeholder();
    let found = records.iter().filter(|r| r.score != placeholder).count();
    eprintln!(
        "Wrote {} games ({} with scores) to {}",
        records.len(),
        found,
        out.display()
    );
    if found == 0 {
        tracing::warn!("no Metacritic scores found for any game");
    }

    print_scores(&records, format)
}
