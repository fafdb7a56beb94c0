//! The incremental crawl pipeline: enumerate listing URLs, diff them against
//! the persisted set, extract each new opportunity, and merge the results
//! into the feed document.

use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::config::Config;
use crate::enumerate;
use crate::error::Result;
use crate::extract;
use crate::feed::Feed;
use crate::page::Page;
use crate::store;

/// Counters describing what a pipeline run did.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunOutcome {
    pub discovered: usize,
    pub new_urls: usize,
    pub merged: usize,
    pub failed: usize,
}

/// Create the URL store and a skeleton feed document when absent, then run
/// an update. With empty stores every discovered URL counts as new, so this
/// doubles as the initial full extraction.
pub async fn bootstrap<P, F>(config: &Config, new_page: F) -> Result<RunOutcome>
where
    P: Page,
    F: Fn() -> P,
{
    if !config.urls_path.exists() {
        store::save(&config.urls_path, &[])?;
    }
    if !config.feed_path.exists() {
        Feed::default().store(&config.feed_path)?;
    }
    update(config, new_page).await
}

/// One incremental run. Enumeration failures abort the run with no writes;
/// extraction failures are isolated per URL, and a failed URL is neither
/// merged nor marked processed, so the next run retries it.
pub async fn update<P, F>(config: &Config, new_page: F) -> Result<RunOutcome>
where
    P: Page,
    F: Fn() -> P,
{
    let persisted = store::load(&config.urls_path)?;

    let discovered = {
        // Dedicated page session for the listing walk, released at scope end.
        let mut listing_page = new_page();
        enumerate::discover_urls(&mut listing_page, config).await?
    };

    let new_urls = store::compute_new(&persisted, &discovered);
    let mut outcome = RunOutcome {
        discovered: discovered.len(),
        new_urls: new_urls.len(),
        ..RunOutcome::default()
    };

    if new_urls.is_empty() {
        info!("no new opportunities");
        return Ok(outcome);
    }
    info!("{} new opportunities to extract", new_urls.len());

    // Fail on a malformed feed before spending time on extraction.
    let mut feed = Feed::load(&config.feed_path)?;

    let pb = ProgressBar::new(new_urls.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec})")
            .unwrap()
            .progress_chars("=> "),
    );

    let mut extraction_page = new_page();
    let mut entries = Vec::new();
    let mut merged_urls = Vec::new();
    for url in &new_urls {
        match extract::extract_entry(&mut extraction_page, url).await {
            Ok(entry) => {
                entries.push(entry);
                merged_urls.push(url.clone());
            }
            Err(e) => {
                outcome.failed += 1;
                warn!("skipping {url}: {e}");
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();
    drop(extraction_page);

    outcome.merged = entries.len();
    feed.merge(entries, Utc::now());
    feed.store(&config.feed_path)?;

    // A URL counts as processed only once its entry is safely in the feed.
    if !merged_urls.is_empty() {
        let mut all = persisted;
        all.extend(merged_urls);
        store::save(&config.urls_path, &all)?;
    }

    info!("merged {} entries ({} failed)", outcome.merged, outcome.failed);
    Ok(outcome)
}
