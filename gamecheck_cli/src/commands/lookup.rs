use anyhow::{bail, Result};
use clap::Args;
use gamecheck_lib::validation::validate_sources;
use gamecheck_lib::{GameClient, Source};

use crate::output::{print_lookups, OutputFormat};

#[derive(Args)]
pub struct LookupArgs {
    /// Game name
    pub name: String,

    /// Comma-separated sources: howlongtobeat (hltb), metacritic (mc),
    /// playstation (ps), amazon, steam. Default: all
    #[arg(long)]
    pub sources: Option<String>,
}

/// Looks one game up on each selected source in turn. A failing source is
/// reported and skipped.
pub async fn run(args: &LookupArgs, client: &GameClient, format: &OutputFormat) -> Result<()> {
    let sources = match &args.sources {
        Some(list) => validate_sources(list)?,
        None => Source::ALL.to_vec(),
    };

    let mut lookups = Vec::with_capacity(sources.len());
    for source in sources {
        match client.lookup(source, &args.name).await {
            Ok(lookup) => {
                if !lookup.found_anything() {
                    tracing::warn!("{}: nothing found for '{}'", source.display_name(), args.name);
                }
                lookups.push(lookup);
            }
            Err(e) => eprintln!("Warning: {} failed: {}", source.display_name(), e),
        }
    }

    if lookups.is_empty() {
        bail!("every source failed for '{}'", args.name);
    }
    print_lookups(&lookups, format)
}
