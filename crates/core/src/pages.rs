//! Paged post cache and fetch-state bookkeeping
//!
//! Pure functions and types for offset-based infinite pagination. The
//! collection grows one page at a time and is patched in place by successful
//! mutations, keyed by post id.

use serde::{Deserialize, Serialize};

use crate::post::Post;

/// Default number of posts requested per page
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// One batch of posts returned by a single fetch call
pub type Page = Vec<Post>;

/// Fetch lifecycle of the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FetchState {
    #[default]
    Idle,
    Loading,
    LoadingMore,
    Error,
}

impl FetchState {
    /// True while a page request is in flight
    pub fn is_fetching(self) -> bool {
        matches!(self, FetchState::Loading | FetchState::LoadingMore)
    }
}

/// A page request: `limit` posts starting at `offset`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
    /// Collection generation the request was issued for
    pub generation: u64,
}

/// A successful server response that must be reflected in the cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mutation {
    Created(Post),
    Updated(Post),
    Deleted(u64),
}

/// True unless the most recent page came back shorter than `page_size`
///
/// An empty collection has more to load.
pub fn has_more(pages: &[Page], page_size: usize) -> bool {
    match pages.last() {
        Some(last) => last.len() >= page_size,
        None => true,
    }
}

/// Offset of the next page: the number of posts loaded so far
pub fn next_offset(pages: &[Page]) -> usize {
    pages.iter().map(Vec::len).sum()
}

/// Ordered accumulation of every page fetched in this session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCollection {
    pages: Vec<Page>,
}

impl PageCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pages(pages: Vec<Page>) -> Self {
        Self { pages }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Total number of loaded posts across all pages
    pub fn len(&self) -> usize {
        next_offset(&self.pages)
    }

    pub fn push_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    pub fn clear(&mut self) {
        self.pages.clear();
    }

    pub fn find(&self, id: u64) -> Option<&Post> {
        self.pages.iter().flatten().find(|post| post.id == id)
    }

    /// Prepend a newly created post to the first page
    ///
    /// With no page loaded yet, a first page is started so the post stays
    /// visible.
    pub fn prepend_created(&mut self, post: Post) {
        match self.pages.first_mut() {
            Some(first) => first.insert(0, post),
            None => self.pages.push(vec![post]),
        }
    }

    /// Replace the post with a matching id, wherever it lives
    ///
    /// Returns false when no loaded post has that id.
    pub fn replace_updated(&mut self, post: Post) -> bool {
        match self.pages.iter_mut().flatten().find(|p| p.id == post.id) {
            Some(slot) => {
                *slot = post;
                true
            }
            None => false,
        }
    }

    /// Remove the post with a matching id from whichever page holds it
    ///
    /// Other posts stay in their pages. Returns false when nothing matched.
    pub fn remove_deleted(&mut self, id: u64) -> bool {
        for page in &mut self.pages {
            if let Some(index) = page.iter().position(|p| p.id == id) {
                page.remove(index);
                return true;
            }
        }
        false
    }

    /// Fold a fetched first page into a page started by local creates
    ///
    /// Created posts the server page already carries are dropped, the rest
    /// stay in front of the fetched posts.
    fn merge_first_page(&mut self, page: Page) {
        let local = std::mem::take(&mut self.pages).into_iter().flatten();
        let mut merged: Page = local
            .filter(|post| !page.iter().any(|fetched| fetched.id == post.id))
            .collect();
        merged.extend(page);
        self.pages.push(merged);
    }

    /// Apply a successful mutation response
    pub fn apply(&mut self, mutation: Mutation) -> bool {
        match mutation {
            Mutation::Created(post) => {
                self.prepend_created(post);
                true
            }
            Mutation::Updated(post) => self.replace_updated(post),
            Mutation::Deleted(id) => self.remove_deleted(id),
        }
    }
}

/// Outcome of handing a page response back to [`FeedState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// The page was appended
    Appended { len: usize, has_more: bool },
    /// The request belonged to a collection that has since been reset
    Stale,
}

/// Pagination state machine around a [`PageCollection`]
///
/// Issues at most one page request at a time and tags each request with the
/// collection generation, so responses that outlive a reset are dropped.
/// End of collection is judged on the length of the last page as the server
/// sent it, so local deletes never end pagination early.
///
/// A post created before the first page has arrived starts a provisional
/// page. The first fetched page is merged into it rather than appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedState {
    collection: PageCollection,
    state: FetchState,
    page_size: usize,
    generation: u64,
    last_fetched_len: Option<usize>,
    provisional: bool,
}

impl Default for FeedState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl FeedState {
    pub fn new(page_size: usize) -> Self {
        Self {
            collection: PageCollection::new(),
            state: FetchState::Idle,
            page_size: page_size.max(1),
            generation: 0,
            last_fetched_len: None,
            provisional: false,
        }
    }

    pub fn collection(&self) -> &PageCollection {
        &self.collection
    }

    pub fn state(&self) -> FetchState {
        self.state
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn has_more(&self) -> bool {
        match self.last_fetched_len {
            Some(len) => len >= self.page_size,
            None => true,
        }
    }

    /// Offset of the next page request
    ///
    /// Zero while only locally created posts are cached.
    pub fn next_offset(&self) -> usize {
        if self.provisional {
            0
        } else {
            next_offset(self.collection.pages())
        }
    }

    /// Start the next page request, if one may be issued now
    ///
    /// Returns `None` while a request is in flight, after a failure (only a
    /// reset clears it), or once the collection is exhausted.
    pub fn begin_next_page(&mut self) -> Option<PageRequest> {
        if self.state.is_fetching() || self.state == FetchState::Error || !self.has_more() {
            return None;
        }

        self.state = if self.collection.is_empty() || self.provisional {
            FetchState::Loading
        } else {
            FetchState::LoadingMore
        };

        Some(PageRequest {
            offset: self.next_offset(),
            limit: self.page_size,
            generation: self.generation,
        })
    }

    /// Record a successful page response
    pub fn finish_page(&mut self, request: PageRequest, page: Page) -> PageOutcome {
        if request.generation != self.generation {
            return PageOutcome::Stale;
        }

        let len = page.len();
        self.last_fetched_len = Some(len);
        if self.provisional {
            self.provisional = false;
            self.collection.merge_first_page(page);
        } else {
            self.collection.push_page(page);
        }
        self.state = FetchState::Idle;

        PageOutcome::Appended {
            len,
            has_more: self.has_more(),
        }
    }

    /// Record a failed page request
    ///
    /// Returns false when the failure belongs to a stale generation and was
    /// ignored.
    pub fn fail_page(&mut self, request: PageRequest) -> bool {
        if request.generation != self.generation {
            return false;
        }
        self.state = FetchState::Error;
        true
    }

    /// Discard every page and start over from offset 0
    pub fn reset(&mut self) {
        self.collection.clear();
        self.state = FetchState::Idle;
        self.generation += 1;
        self.last_fetched_len = None;
        self.provisional = false;
    }

    /// Apply a successful mutation to the cached pages
    pub fn apply(&mut self, mutation: Mutation) -> bool {
        if matches!(mutation, Mutation::Created(_)) && self.collection.is_empty() {
            self.provisional = true;
        }
        self.collection.apply(mutation)
    }
}
