//! Derived views over the page cache
//!
//! Pure functions that turn the loaded pages and the current search term into
//! the list presented to the user, and decide when scrolling should request
//! another page.

use crate::pages::{FeedState, FetchState, Page};
use crate::post::Post;

/// Concatenate pages in fetch order
pub fn flatten(pages: &[Page]) -> Vec<Post> {
    pages.iter().flatten().cloned().collect()
}

/// Keep posts whose title contains `term`, ignoring case
///
/// An empty term returns the input unchanged.
pub fn filter(items: &[Post], term: &str) -> Vec<Post> {
    if term.is_empty() {
        return items.to_vec();
    }

    let needle = term.to_lowercase();
    items
        .iter()
        .filter(|post| post.title.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Flatten then filter, the list shown for the current search term
pub fn visible_posts(pages: &[Page], term: &str) -> Vec<Post> {
    filter(&flatten(pages), term)
}

/// Whether the last rendered item coming into view should load another page
pub fn should_fetch_next(state: FetchState, has_more: bool) -> bool {
    has_more && state == FetchState::Idle
}

/// Summary line for the loaded feed
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FeedSummary {
    pub loaded: usize,
    pub shown: usize,
    pub pages: usize,
    pub has_more: bool,
    pub state: FetchState,
}

pub fn summarize(feed: &FeedState, shown: usize) -> FeedSummary {
    FeedSummary {
        loaded: feed.collection().len(),
        shown,
        pages: feed.collection().pages().len(),
        has_more: feed.has_more(),
        state: feed.state(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: u64, title: &str) -> Post {
        Post {
            id,
            title: title.to_string(),
            body: String::new(),
        }
    }

    fn titles(posts: &[Post]) -> Vec<&str> {
        posts.iter().map(|p| p.title.as_str()).collect()
    }

    #[test]
    fn test_flatten_keeps_fetch_order() {
        let pages = vec![
            vec![post(1, "a"), post(2, "b")],
            vec![],
            vec![post(3, "c")],
        ];

        let ids: Vec<u64> = flatten(&pages).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_filter_is_case_insensitive_and_ordered() {
        let items = vec![
            post(1, "Apple pie"),
            post(2, "Banana"),
            post(3, "apple tart"),
        ];

        let found = filter(&items, "apple");
        assert_eq!(titles(&found), vec!["Apple pie", "apple tart"]);

        let upper = filter(&items, "APPLE");
        assert_eq!(titles(&upper), vec!["Apple pie", "apple tart"]);
    }

    #[test]
    fn test_empty_term_returns_everything() {
        let items = vec![post(3, "c"), post(1, "a"), post(2, "b")];
        assert_eq!(filter(&items, ""), items);
    }

    #[test]
    fn test_filter_without_matches() {
        let items = vec![post(1, "Banana")];
        assert!(filter(&items, "kiwi").is_empty());
    }

    #[test]
    fn test_filter_matches_substring_only_in_title() {
        let mut item = post(1, "Cherry");
        item.body = "apple".to_string();
        assert!(filter(&[item], "apple").is_empty());
    }

    #[test]
    fn test_visible_posts() {
        let pages = vec![vec![post(1, "Apple pie")], vec![post(2, "Banana")]];
        assert_eq!(titles(&visible_posts(&pages, "ban")), vec!["Banana"]);
    }

    #[test]
    fn test_should_fetch_next() {
        assert!(should_fetch_next(FetchState::Idle, true));
        assert!(!should_fetch_next(FetchState::Idle, false));
        assert!(!should_fetch_next(FetchState::LoadingMore, true));
        assert!(!should_fetch_next(FetchState::Loading, true));
        assert!(!should_fetch_next(FetchState::Error, true));
    }

    #[test]
    fn test_summarize() {
        let mut feed = FeedState::new(2);
        let request = feed.begin_next_page().unwrap();
        feed.finish_page(request, vec![post(1, "a"), post(2, "b")]);

        let summary = summarize(&feed, 1);
        assert_eq!(summary.loaded, 2);
        assert_eq!(summary.shown, 1);
        assert_eq!(summary.pages, 1);
        assert!(summary.has_more);
        assert_eq!(summary.state, FetchState::Idle);
    }
}
