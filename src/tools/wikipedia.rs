//! Wikipedia lookup via the MediaWiki action API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use super::{Tool, ToolName};
use crate::config::WikipediaConfig;

/// Returned when a search has no usable hits.
pub const NO_RESULT: &str = "No good Wikipedia Search Result was found";

/// Longest query sent to the search endpoint, in characters.
const MAX_QUERY_CHARS: usize = 300;

/// Failure of the knowledge lookup collaborator.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Wikipedia request timed out")]
    Timeout,

    #[error("Wikipedia request failed: {0}")]
    Http(String),

    #[error("Wikipedia returned an unexpected response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}

/// General-knowledge lookup: query in, natural-language summary out.
#[async_trait]
pub trait KnowledgeLookup: Send + Sync {
    async fn lookup(&self, query: &str) -> Result<String, LookupError>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    #[serde(default)]
    query: Option<ExtractQuery>,
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    extract: Option<String>,
}

/// Summarizes the top search hits of one Wikipedia language edition.
pub struct WikipediaClient {
    client: reqwest::Client,
    config: WikipediaConfig,
}

impl WikipediaClient {
    pub fn new(config: WikipediaConfig, timeout: Duration) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("mathsgpt/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { client, config })
    }

    async fn search(&self, query: &str) -> Result<Vec<String>, LookupError> {
        let limit = self.config.top_k.to_string();
        let response = self
            .client
            .get(self.config.api_url())
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: SearchResponse = response.json().await?;
        Ok(body
            .query
            .map(|q| q.search.into_iter().map(|hit| hit.title).collect())
            .unwrap_or_default())
    }

    async fn extracts(&self, titles: &[String]) -> Result<Vec<(String, String)>, LookupError> {
        let joined = titles.join("|");
        let response = self
            .client
            .get(self.config.api_url())
            .query(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("exlimit", "max"),
                ("titles", joined.as_str()),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: ExtractResponse = response.json().await?;
        let pages = body.query.map(|q| q.pages).unwrap_or_default();

        // Keep search ranking, not the API's page order.
        Ok(titles
            .iter()
            .filter_map(|title| {
                pages
                    .iter()
                    .find(|p| &p.title == title)
                    .and_then(|p| p.extract.clone())
                    .map(|extract| (title.clone(), extract))
            })
            .collect())
    }
}

#[async_trait]
impl KnowledgeLookup for WikipediaClient {
    async fn lookup(&self, query: &str) -> Result<String, LookupError> {
        let query = truncate_chars(query.trim(), MAX_QUERY_CHARS);
        tracing::debug!(query = %query, "Searching Wikipedia");

        let titles = self.search(&query).await?;
        if titles.is_empty() {
            return Ok(NO_RESULT.to_string());
        }

        let pages = self.extracts(&titles).await?;
        Ok(format_summaries(&pages, self.config.max_chars))
    }
}

/// The `Wikipedia` agent tool.
pub struct WikipediaTool {
    lookup: Arc<dyn KnowledgeLookup>,
}

impl WikipediaTool {
    pub fn new(lookup: Arc<dyn KnowledgeLookup>) -> Self {
        Self { lookup }
    }
}

#[async_trait]
impl Tool for WikipediaTool {
    fn name(&self) -> ToolName {
        ToolName::Wikipedia
    }

    fn description(&self) -> &str {
        "Use this for general knowledge or current events."
    }

    async fn execute(&self, input: &str) -> anyhow::Result<String> {
        Ok(self.lookup.lookup(input).await?)
    }
}

/// Render `(title, summary)` pairs the way the agent sees them.
pub fn format_summaries(pages: &[(String, String)], max_chars: usize) -> String {
    let summaries: Vec<String> = pages
        .iter()
        .filter(|(_, summary)| !summary.trim().is_empty())
        .map(|(title, summary)| format!("Page: {}\nSummary: {}", title, summary.trim()))
        .collect();

    if summaries.is_empty() {
        return NO_RESULT.to_string();
    }

    truncate_chars(&summaries.join("\n\n"), max_chars)
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
