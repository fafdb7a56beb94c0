mod config;
mod enumerate;
mod error;
mod extract;
mod feed;
mod format;
mod page;
mod pipeline;
mod store;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::feed::Feed;
use crate::page::HttpPage;
use crate::pipeline::RunOutcome;

#[derive(Parser)]
#[command(name = "oppfeed", about = "Incremental volunteer-opportunity feed crawler")]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the URL store and feed document, then extract every listed opportunity
    Init,
    /// Extract opportunities published since the last run and merge them into the feed
    Update,
    /// Show URL store and feed document counters
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    match cli.command {
        Commands::Init => {
            let outcome = pipeline::bootstrap(&config, || HttpPage::new(&config)).await?;
            print_outcome(&outcome);
        }
        Commands::Update => {
            let outcome = pipeline::update(&config, || HttpPage::new(&config)).await?;
            if outcome.new_urls == 0 {
                println!("There are no new opportunities.");
            } else {
                print_outcome(&outcome);
            }
        }
        Commands::Stats => {
            let urls = store::load(&config.urls_path)?;
            let feed = Feed::load(&config.feed_path)?;
            let last_update = if feed.last_update.is_empty() {
                "never"
            } else {
                feed.last_update.as_str()
            };
            println!("Processed URLs: {}", urls.len());
            println!("Feed entries:   {}", feed.entries.len());
            println!("Last update:    {}", last_update);
        }
    }

    Ok(())
}

fn print_outcome(outcome: &RunOutcome) {
    println!(
        "Discovered {} URLs ({} new): merged {} entries, {} failed.",
        outcome.discovered, outcome.new_urls, outcome.merged, outcome.failed
    );
}
