//! Page Store: owns the page cache and issues page fetches

use futures::future::{BoxFuture, FutureExt};
use postfeed_core::pages::{FeedState, FetchState, Mutation, Page, PageOutcome, PageRequest};

use crate::error::Error;
use crate::transport::{PostsTransport, TransportFuture};

/// A finished page request, ready to be handed back to the store
#[derive(Debug)]
pub struct PageCompletion {
    pub request: PageRequest,
    pub result: Result<Page, Error>,
}

pub struct PageStore<T: PostsTransport> {
    transport: T,
    feed: FeedState,
}

impl<T: PostsTransport> PageStore<T> {
    pub fn new(transport: T, page_size: usize) -> Self {
        Self {
            transport,
            feed: FeedState::new(page_size),
        }
    }

    pub fn feed(&self) -> &FeedState {
        &self.feed
    }

    pub fn state(&self) -> FetchState {
        self.feed.state()
    }

    pub fn has_more(&self) -> bool {
        self.feed.has_more()
    }

    /// Request `limit` posts starting at `offset`
    ///
    /// A raw fetch: it does not touch the cache or the fetch state.
    pub fn fetch_page(&self, offset: usize, limit: usize) -> TransportFuture<Page> {
        self.transport.fetch_page(offset, limit)
    }

    /// Issue the next page request if the fetch state allows one
    ///
    /// The returned future resolves to a [`PageCompletion`] that must be passed
    /// to [`PageStore::complete_page`].
    pub fn request_next_page(&mut self) -> Option<BoxFuture<'static, PageCompletion>> {
        let request = self.feed.begin_next_page()?;
        log::debug!(
            "requesting page offset={} limit={} generation={}",
            request.offset,
            request.limit,
            request.generation
        );

        let fetch = self.fetch_page(request.offset, request.limit);
        Some(
            async move {
                PageCompletion {
                    request,
                    result: fetch.await,
                }
            }
            .boxed(),
        )
    }

    /// Fold a page response into the cache
    ///
    /// A failure moves the store to [`FetchState::Error`] and is returned to
    /// the caller; nothing is retried. Responses for a reset collection are
    /// dropped.
    pub fn complete_page(&mut self, completion: PageCompletion) -> Result<PageOutcome, Error> {
        let PageCompletion { request, result } = completion;

        match result {
            Ok(page) => {
                let outcome = self.feed.finish_page(request, page);
                if outcome == PageOutcome::Stale {
                    log::debug!("dropping page from stale generation {}", request.generation);
                }
                Ok(outcome)
            }
            Err(err) => {
                if self.feed.fail_page(request) {
                    log::warn!("page fetch at offset {} failed: {err}", request.offset);
                    Err(err)
                } else {
                    Ok(PageOutcome::Stale)
                }
            }
        }
    }

    /// Fetch and fold the next page, if one may be requested
    pub async fn load_next_page(&mut self) -> Result<Option<PageOutcome>, Error> {
        match self.request_next_page() {
            Some(fetch) => {
                let completion = fetch.await;
                self.complete_page(completion).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Load up to `max_pages` pages, stopping once the collection is exhausted
    ///
    /// Returns the number of pages appended.
    pub async fn load_pages(&mut self, max_pages: usize) -> Result<usize, Error> {
        let mut loaded = 0;
        while loaded < max_pages {
            match self.load_next_page().await? {
                Some(PageOutcome::Appended { has_more, .. }) => {
                    loaded += 1;
                    if !has_more {
                        break;
                    }
                }
                Some(PageOutcome::Stale) | None => break,
            }
        }
        Ok(loaded)
    }

    /// Discard every page and request the first one again
    ///
    /// This is also the only way out of [`FetchState::Error`].
    pub fn refetch(&mut self) -> Option<BoxFuture<'static, PageCompletion>> {
        log::debug!("refetching from offset 0");
        self.feed.reset();
        self.request_next_page()
    }

    /// Apply a successful mutation response to the cache
    pub fn apply(&mut self, mutation: Mutation) -> bool {
        self.feed.apply(mutation)
    }
}
