//! REST paths and query parameters for the posts collection
//!
//! Pure builders; the shell joins them onto the configured base URL.

/// Collection path relative to the base URL
pub const POSTS_PATH: &str = "/posts";

/// Query parameters for one page: `_limit` then `_start`
pub fn page_query(offset: usize, limit: usize) -> [(&'static str, String); 2] {
    [("_limit", limit.to_string()), ("_start", offset.to_string())]
}

/// URL of the collection
pub fn collection_url(base_url: &str) -> String {
    format!("{}{POSTS_PATH}", base_url.trim_end_matches('/'))
}

/// URL of a single post
pub fn post_url(base_url: &str, id: u64) -> String {
    format!("{}/{id}", collection_url(base_url))
}
