//! View Controller: search term, derived view and the scroll trigger

use futures::future::BoxFuture;
use postfeed_core::post::Post;
use postfeed_core::view::{should_fetch_next, visible_posts};

use crate::store::{PageCompletion, PageStore};
use crate::transport::PostsTransport;

/// Observation of the last rendered item
///
/// Registered on every render and released when the view is torn down.
#[derive(Debug)]
pub struct LastItemSentinel {
    post_id: Option<u64>,
}

impl LastItemSentinel {
    fn observe(post_id: Option<u64>) -> Self {
        log::trace!("observing last item {post_id:?}");
        Self { post_id }
    }

    /// Id of the observed post; `None` when the rendered list is empty and the
    /// end-of-list marker is observed instead
    pub fn post_id(&self) -> Option<u64> {
        self.post_id
    }
}

impl Drop for LastItemSentinel {
    fn drop(&mut self) {
        log::trace!("released last item {:?}", self.post_id);
    }
}

#[derive(Debug, Default)]
pub struct ViewController {
    search: String,
    visible: Vec<Post>,
    sentinel: Option<LastItemSentinel>,
}

impl ViewController {
    pub fn new(search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            ..Default::default()
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Posts currently presented, after filtering
    pub fn visible(&self) -> &[Post] {
        &self.visible
    }

    pub fn sentinel(&self) -> Option<&LastItemSentinel> {
        self.sentinel.as_ref()
    }

    pub fn is_mounted(&self) -> bool {
        self.sentinel.is_some()
    }

    /// Recompute the presented list from the cache and the search term
    ///
    /// Called after every accepted change to either. Re-registers the
    /// last-item sentinel on the new last row.
    pub fn recompute<T: PostsTransport>(&mut self, store: &PageStore<T>) -> &[Post] {
        self.visible = visible_posts(store.feed().collection().pages(), &self.search);
        self.sentinel = Some(LastItemSentinel::observe(
            self.visible.last().map(|post| post.id),
        ));
        &self.visible
    }

    /// Update the live filter without refetching
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    /// The last rendered item scrolled into view
    ///
    /// Requests the next page only when nothing is loading and more posts
    /// exist. Does nothing once the view is torn down.
    pub fn on_last_item_visible<T: PostsTransport>(
        &self,
        store: &mut PageStore<T>,
    ) -> Option<BoxFuture<'static, PageCompletion>> {
        if !self.is_mounted() || !should_fetch_next(store.state(), store.has_more()) {
            return None;
        }
        store.request_next_page()
    }

    /// Confirm a search term: filter with it and reload from offset 0
    ///
    /// The term filters client-side only; it is not sent to the server.
    pub fn commit_search<T: PostsTransport>(
        &mut self,
        term: impl Into<String>,
        store: &mut PageStore<T>,
    ) -> Option<BoxFuture<'static, PageCompletion>> {
        self.set_search(term);
        store.refetch()
    }

    /// Release the sentinel; the view stops reacting to scroll
    pub fn teardown(&mut self) {
        self.sentinel = None;
        self.visible.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::memory::MemoryTransport;
    use postfeed_core::pages::FetchState;

    fn titled(titles: &[&str]) -> MemoryTransport {
        MemoryTransport::from_posts(
            titles
                .iter()
                .enumerate()
                .map(|(i, title)| Post {
                    id: i as u64 + 1,
                    title: title.to_string(),
                    body: "Body of a fruit post".to_string(),
                })
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_recompute_filters_and_observes_last_row() {
        let mut store = PageStore::new(titled(&["Apple pie", "Banana", "apple tart"]), 10);
        store.load_pages(1).await.unwrap();
        let mut view = ViewController::new("apple");

        let shown: Vec<u64> = view.recompute(&store).iter().map(|p| p.id).collect();

        assert_eq!(shown, vec![1, 3]);
        assert_eq!(view.sentinel().unwrap().post_id(), Some(3));
    }

    #[tokio::test]
    async fn test_empty_view_observes_end_marker() {
        let mut store = PageStore::new(titled(&["Banana"]), 10);
        store.load_pages(1).await.unwrap();
        let mut view = ViewController::new("kiwi");

        assert!(view.recompute(&store).is_empty());
        assert_eq!(view.sentinel().unwrap().post_id(), None);
    }

    #[tokio::test]
    async fn test_scroll_requires_rendered_view() {
        let mut store = PageStore::new(MemoryTransport::with_posts(30), 10);
        let view = ViewController::default();

        assert!(view.on_last_item_visible(&mut store).is_none());
        assert_eq!(store.state(), FetchState::Idle);
    }

    #[tokio::test]
    async fn test_scroll_loads_next_page_once() {
        let mut store = PageStore::new(MemoryTransport::with_posts(30), 10);
        store.load_pages(1).await.unwrap();
        let mut view = ViewController::default();
        view.recompute(&store);

        let fetch = view.on_last_item_visible(&mut store).unwrap();
        assert_eq!(store.state(), FetchState::LoadingMore);
        assert!(view.on_last_item_visible(&mut store).is_none());

        store.complete_page(fetch.await).unwrap();
        assert_eq!(view.recompute(&store).len(), 20);
    }

    #[tokio::test]
    async fn test_scroll_stops_when_exhausted() {
        let mut store = PageStore::new(MemoryTransport::with_posts(4), 10);
        store.load_pages(1).await.unwrap();
        let mut view = ViewController::default();
        view.recompute(&store);

        assert!(view.on_last_item_visible(&mut store).is_none());
    }

    #[tokio::test]
    async fn test_commit_search_refetches_from_start() {
        let transport = MemoryTransport::with_posts(30);
        let mut store = PageStore::new(transport.clone(), 10);
        store.load_pages(2).await.unwrap();
        let mut view = ViewController::default();
        view.recompute(&store);

        let fetch = view.commit_search("number 1", &mut store).unwrap();
        assert!(store.feed().collection().is_empty());
        store.complete_page(fetch.await).unwrap();

        let shown: Vec<u64> = view.recompute(&store).iter().map(|p| p.id).collect();
        assert_eq!(shown, vec![1, 10]);
        assert_eq!(
            transport.requests().last().unwrap(),
            "GET /posts?_limit=10&_start=0"
        );
    }

    #[tokio::test]
    async fn test_teardown_releases_sentinel() {
        let mut store = PageStore::new(MemoryTransport::with_posts(30), 10);
        store.load_pages(1).await.unwrap();
        let mut view = ViewController::default();
        view.recompute(&store);

        view.teardown();

        assert!(view.sentinel().is_none());
        assert!(view.on_last_item_visible(&mut store).is_none());
    }
}
