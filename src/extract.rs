//! Extracts the six structured sections from one opportunity detail page.

use crate::error::Result;
use crate::feed::Entry;
use crate::format::format_nodes;
use crate::page::Page;

const MAIN_REGION: &str = "div.twelve.columns";
const ASIDE_REGION: &str = "div.four.columns aside.details";
const BOTTOM_PANELS: &str = "div#content div.container div.eight.columns";
const ADDRESS_BLOCK: &str = "div#vp-address";

const CONTENT_ELEMENTS: &str = "p, ul, h1, h2, h3, h4, h5";
const DETAIL_ELEMENTS: &str = "h3, ul";
const AVAILABILITY_ELEMENTS: &str = "h1, h2, h3, h4, h5, p";

/// Load `url` and pull each fixed structural region into its formatted
/// section. A region with no matching elements yields an empty section; a
/// page whose main region never renders fails with `PageLoadTimeout` and
/// produces no partial entry.
pub async fn extract_entry<P: Page>(page: &mut P, url: &str) -> Result<Entry> {
    page.goto(url).await?;
    page.wait_for(MAIN_REGION)?;

    Ok(Entry {
        description: format_nodes(&page.nodes_in(MAIN_REGION, 0, CONTENT_ELEMENTS)),
        aside: format_nodes(&page.nodes_in(ASIDE_REGION, 0, CONTENT_ELEMENTS)),
        details: format_nodes(&page.nodes_in(BOTTOM_PANELS, 0, DETAIL_ELEMENTS)),
        availability: format_nodes(&page.nodes_in(BOTTOM_PANELS, 1, AVAILABILITY_ELEMENTS)),
        availability_table: format_nodes(&page.nodes_in(BOTTOM_PANELS, 1, "table")),
        location: format_nodes(&page.nodes_in(ADDRESS_BLOCK, 0, "p")),
    })
}
