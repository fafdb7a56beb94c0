//! Page-rendering capability consumed by the enumerator and extractor.
//!
//! The real implementation fetches server-rendered HTML over HTTP and answers
//! CSS-selector queries against the parsed document. Crawl logic only sees
//! the `Page` trait, so tests drive it with canned HTML instead of a live
//! site.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::config::Config;
use crate::error::{Error, Result};

static LINE_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\S\n]*\n\s*").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// One rendered list entry, carrying the class attribute that encodes its
/// status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub class: Option<String>,
    pub text: String,
}

/// A content element classified by tag, with its typed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Heading(String),
    Paragraph(String),
    List(Vec<ListItem>),
    Table(Vec<Vec<String>>),
}

#[async_trait]
pub trait Page: Send {
    /// Navigate to `url`, replacing the current document.
    async fn goto(&mut self, url: &str) -> Result<()>;

    /// Fail with `PageLoadTimeout` unless `selector` is present in the
    /// current document.
    fn wait_for(&self, selector: &str) -> Result<()>;

    /// Number of elements matching `selector`.
    fn count(&self, selector: &str) -> usize;

    /// `href` attributes of all elements matching `selector`, in document
    /// order.
    fn hrefs(&self, selector: &str) -> Vec<String>;

    /// Classified content nodes matching `inner` within the `index`-th
    /// element matching `container`. A missing container or zero matches
    /// yield an empty list, not an error.
    fn nodes_in(&self, container: &str, index: usize, inner: &str) -> Vec<Node>;
}

/// `Page` backed by plain HTTP fetches of server-rendered HTML. The bounded
/// wait of the capability is the per-request timeout; selector waits
/// degenerate to presence checks on the fetched document.
pub struct HttpPage {
    client: reqwest::Client,
    timeout: Duration,
    url: String,
    html: String,
}

impl HttpPage {
    pub fn new(config: &Config) -> Self {
        HttpPage {
            client: reqwest::Client::new(),
            timeout: config.timeout(),
            url: String::new(),
            html: String::new(),
        }
    }
}

#[async_trait]
impl Page for HttpPage {
    async fn goto(&mut self, url: &str) -> Result<()> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::page_load(url, e.to_string()))?;
        self.html = response
            .text()
            .await
            .map_err(|e| Error::page_load(url, e.to_string()))?;
        self.url = url.to_string();
        Ok(())
    }

    fn wait_for(&self, selector: &str) -> Result<()> {
        dom::wait_for(&self.html, &self.url, selector)
    }

    fn count(&self, selector: &str) -> usize {
        dom::count(&self.html, selector)
    }

    fn hrefs(&self, selector: &str) -> Vec<String> {
        dom::hrefs(&self.html, selector)
    }

    fn nodes_in(&self, container: &str, index: usize, inner: &str) -> Vec<Node> {
        dom::nodes_in(&self.html, container, index, inner)
    }
}

mod dom {
    use super::*;

    pub(super) fn wait_for(html: &str, url: &str, selector: &str) -> Result<()> {
        if count(html, selector) > 0 {
            Ok(())
        } else {
            Err(Error::page_load(
                url,
                format!("selector `{selector}` did not appear"),
            ))
        }
    }

    pub(super) fn count(html: &str, selector: &str) -> usize {
        let doc = Html::parse_document(html);
        doc.select(&parse(selector)).count()
    }

    pub(super) fn hrefs(html: &str, selector: &str) -> Vec<String> {
        let doc = Html::parse_document(html);
        doc.select(&parse(selector))
            .filter_map(|el| el.value().attr("href").map(str::to_string))
            .collect()
    }

    pub(super) fn nodes_in(html: &str, container: &str, index: usize, inner: &str) -> Vec<Node> {
        let doc = Html::parse_document(html);
        let Some(scope) = doc.select(&parse(container)).nth(index) else {
            return Vec::new();
        };
        scope.select(&parse(inner)).filter_map(classify).collect()
    }

    fn classify(el: ElementRef) -> Option<Node> {
        match el.value().name() {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => Some(Node::Heading(block_text(el))),
            "p" => Some(Node::Paragraph(block_text(el))),
            "ul" => Some(Node::List(
                el.select(&parse("li"))
                    .map(|li| ListItem {
                        class: li.value().attr("class").map(str::to_string),
                        text: inline_text(li),
                    })
                    .collect(),
            )),
            "table" => Some(Node::Table(
                el.select(&parse("tr"))
                    .map(|row| row.select(&parse("th, td")).map(inline_text).collect())
                    .collect(),
            )),
            _ => None,
        }
    }

    // Every selector in this crate is a fixed structural locator.
    fn parse(selector: &str) -> Selector {
        Selector::parse(selector).expect("valid selector")
    }

    /// Inner text, trimmed, with embedded line breaks collapsed to single
    /// newlines.
    fn block_text(el: ElementRef) -> String {
        let raw: String = el.text().collect();
        LINE_BREAK_RE.replace_all(raw.trim(), "\n").to_string()
    }

    /// Inner text flattened to a single trimmed line.
    fn inline_text(el: ElementRef) -> String {
        let raw: String = el.text().collect();
        WHITESPACE_RE.replace_all(raw.trim(), " ").to_string()
    }
}
