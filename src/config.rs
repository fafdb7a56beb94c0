use std::path::PathBuf;
use std::time::Duration;

/// Everything a pipeline run needs to know, passed in explicitly instead of
/// living in module-level constants.
#[derive(Debug, Clone, clap::Args)]
pub struct Config {
    /// Site origin, used to resolve relative opportunity links
    #[arg(long, default_value = "https://volunteercentrenewcastle.org.uk")]
    pub base_url: String,

    /// Path of the paginated search-results listing on the site
    #[arg(long, default_value = "/search-results")]
    pub search_path: String,

    /// Feed document maintained by the pipeline
    #[arg(long, default_value = "feed.xml")]
    pub feed_path: PathBuf,

    /// Plain-text store of already-processed opportunity URLs
    #[arg(long, default_value = "opportunity_urls.txt")]
    pub urls_path: PathBuf,

    /// Per-page load timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
}

impl Config {
    pub fn start_url(&self) -> String {
        format!("{}{}", self.base_url, self.search_path)
    }

    pub fn listing_page_url(&self, page_number: usize) -> String {
        format!("{}?results_page={}", self.start_url(), page_number)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
impl Config {
    pub(crate) fn for_tests(dir: &std::path::Path) -> Self {
        Config {
            base_url: "https://example.org".to_string(),
            search_path: "/search-results".to_string(),
            feed_path: dir.join("feed.xml"),
            urls_path: dir.join("opportunity_urls.txt"),
            timeout_secs: 5,
        }
    }
}
