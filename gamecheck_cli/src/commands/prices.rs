//! Concurrent price lookup for the games list.
//!
//! Uses the Semaphore + JoinSet + mpsc pattern: one task per game, at most
//! `concurrency` running at once, results streamed back as they finish.
//! A game's failure never affects the others.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use clap::Args;
use gamecheck_lib::report::{load_images, write_report, PriceRow};
use gamecheck_lib::{GameClient, ScoreTable, Settings, Source};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

use super::{games_path, load_games, progress_bar};
use crate::output::{print_prices, OutputFormat};

#[derive(Args)]
pub struct PricesArgs {
    /// Games list (default: games_file from settings)
    #[arg(long)]
    pub games: Option<PathBuf>,

    /// Report path (default: report_file from settings)
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Skip writing the HTML report
    #[arg(long)]
    pub no_report: bool,

    /// Games priced at once (default: concurrency from settings)
    #[arg(long)]
    pub concurrency: Option<usize>,
}

/// Sent from a game's task back to the collector.
struct PriceResult {
    index: usize,
    row: PriceRow,
}

pub async fn run(
    args: &PricesArgs,
    client: GameClient,
    settings: &Settings,
    format: &OutputFormat,
) -> Result<()> {
    let Some(games) = load_games(&games_path(&args.games, &settings.games_file))? else {
        return Ok(());
    };
    let started = Instant::now();
    let scores = Arc::new(ScoreTable::load(&settings.scores_file)?);
    let concurrency = args.concurrency.unwrap_or(settings.concurrency).max(1);

    eprintln!(
        "Fetching prices for {} games (concurrency {})",
        games.len(),
        concurrency
    );
    let pb = progress_bar(games.len(), "fetching prices...");

    let client = Arc::new(client);
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let (tx, mut rx) = mpsc::channel::<PriceResult>(concurrency * 2);
    let mut join_set = JoinSet::new();

    for (index, name) in games.iter().cloned().enumerate() {
        let sem = Arc::clone(&semaphore);
        let sender = tx.clone();
        let client = Arc::clone(&client);
        let scores = Arc::clone(&scores);

        join_set.spawn(async move {
            let Ok(_permit) = sem.acquire().await else {
                return;
            };
            let row = client.price_row(&name, &scores).await;
            let _ = sender.send(PriceResult { index, row }).await;
        });
    }
    drop(tx);

    let mut rows: Vec<Option<PriceRow>> = vec![None; games.len()];
    while let Some(result) = rx.recv().await {
        let row = &result.row;
        pb.println(format!(
            "  {} -> Steam: {} | PS: {} | Amazon: {}",
            row.name, row.steam, row.playstation, row.amazon
        ));
        rows[result.index] = Some(result.row);
        pb.inc(1);
    }
    while let Some(joined) = join_set.join_next().await {
        if let Err(e) = joined {
            tracing::warn!("price task failed: {}", e);
        }
    }
    pb.finish_and_clear();

    let rows: Vec<PriceRow> = rows
        .into_iter()
        .zip(&games)
        .map(|(row, name)| row.unwrap_or_else(|| PriceRow::unavailable(name, scores.get(name))))
        .collect();

    for source in Source::STORES {
        let summary = client.request_summary(source);
        tracing::debug!(
            "{}: {} requests, {} retried, {} failed, {:.1}s backoff",
            source.display_name(),
            summary.requests_made,
            summary.requests_retried,
            summary.requests_failed,
            summary.total_backoff_secs
        );
    }

    if !rows.iter().any(PriceRow::has_any_price) {
        tracing::warn!("no prices found for any game");
    }
    if !args.no_report {
        let path = args.report.clone().unwrap_or_else(|| settings.report_file.clone());
        write_report(&path, &rows, &load_images(&settings.images_file))?;
        eprintln!("Report written to {}", path.display());
    }
    eprintln!("Done in {:.2}s", started.elapsed().as_secs_f64());

    print_prices(&rows, format)
}
