//! Walks the paginated search-results listing and collects every opportunity
//! URL currently visible, in page-then-position order.

use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::page::Page;

const PAGINATION_ITEMS: &str = "ul.pagination li";
const OPPORTUNITY_LIST: &str = "ul.vp_opportunities";
const OPPORTUNITY_LINKS: &str = "ul.vp_opportunities li p.more a";

/// Enumerate all currently-listed opportunity URLs. The pagination control's
/// rendered item count determines the page count; each page is loaded by
/// index and its item anchors resolved against the site origin. Any missing
/// selector aborts the whole enumeration, partial results are never
/// returned.
pub async fn discover_urls<P: Page>(page: &mut P, config: &Config) -> Result<Vec<String>> {
    let start_url = config.start_url();
    page.goto(&start_url).await?;
    page.wait_for(PAGINATION_ITEMS)?;
    let page_count = page.count(PAGINATION_ITEMS);
    info!("listing has {page_count} pages");

    let mut urls = Vec::new();
    for page_number in 1..=page_count {
        page.goto(&config.listing_page_url(page_number)).await?;
        page.wait_for(OPPORTUNITY_LIST)?;
        for href in page.hrefs(OPPORTUNITY_LINKS) {
            urls.push(format!("{}{}", config.base_url, href));
        }
    }

    info!("discovered {} opportunity URLs", urls.len());
    Ok(urls)
}
