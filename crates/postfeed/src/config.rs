use crate::prelude::*;
use postfeed_core::pages::DEFAULT_PAGE_SIZE;

/// Posts endpoint configuration from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    pub base_url: String,
    pub page_size: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl FeedConfig {
    /// Default REST backend
    pub const DEFAULT_BASE_URL: &'static str = "https://jsonplaceholder.typicode.com";

    /// Load configuration from environment variables
    /// Uses POSTFEED_BASE_URL with default fallback
    /// Uses POSTFEED_PAGE_SIZE with default fallback
    pub fn from_env() -> Result<Self> {
        Self::from_vars(
            std::env::var("POSTFEED_BASE_URL").ok(),
            std::env::var("POSTFEED_PAGE_SIZE").ok(),
        )
    }

    fn from_vars(base_url: Option<String>, page_size: Option<String>) -> Result<Self> {
        let page_size = match page_size {
            Some(raw) => parse_page_size(&raw)?,
            None => DEFAULT_PAGE_SIZE,
        };

        Ok(Self {
            base_url: base_url.unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string()),
            page_size,
        })
    }

    /// Apply CLI overrides to the configuration
    pub fn with_overrides(mut self, base_url: Option<String>, page_size: Option<usize>) -> Self {
        if let Some(url) = base_url {
            self.base_url = url;
        }
        if let Some(size) = page_size {
            self.page_size = size;
        }
        self
    }

    pub fn validate(self) -> Result<Self> {
        if self.page_size == 0 {
            return Err(eyre!("Page size must be at least 1"));
        }
        reqwest::Url::parse(&self.base_url)
            .map_err(|e| eyre!("Invalid base URL {}: {}", self.base_url, e))?;
        Ok(self)
    }
}

fn parse_page_size(raw: &str) -> Result<usize> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| eyre!("POSTFEED_PAGE_SIZE must be a positive integer, got {raw:?}"))
}

/// Create the HTTP client used for every request
pub fn create_client() -> Result<reqwest::Client> {
    use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    reqwest::Client::builder()
        .default_headers(headers)
        .user_agent(concat!("postfeed/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| eyre!("Failed to build HTTP client: {}", e))
}
