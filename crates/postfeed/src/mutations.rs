//! Mutation Coordinator: create, update and delete posts
//!
//! Each operation validates at the edit boundary, calls the transport, and
//! only on success edits the cached pages. Edits are keyed by post id, so
//! responses may be applied in whatever order they arrive.

use futures::future::FutureExt;
use postfeed_core::pages::Mutation;
use postfeed_core::post::{merge_edit, validate_draft, Post, PostDraft};

use crate::error::Error;
use crate::store::PageStore;
use crate::transport::{PostsTransport, TransportFuture};

pub struct MutationCoordinator<T: PostsTransport> {
    transport: T,
}

impl<T: PostsTransport> MutationCoordinator<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Validate and send a create request
    ///
    /// Invalid drafts fail here and never reach the transport.
    pub fn submit_create(&self, draft: PostDraft) -> Result<TransportFuture<Mutation>, Error> {
        validate_draft(&draft)?;
        Ok(self.transport.create(draft).map(|r| r.map(Mutation::Created)).boxed())
    }

    /// Validate and send an update request carrying the full post
    pub fn submit_update(&self, post: Post) -> Result<TransportFuture<Mutation>, Error> {
        validate_draft(&PostDraft::from(&post))?;
        Ok(self.transport.update(post).map(|r| r.map(Mutation::Updated)).boxed())
    }

    /// Edit a post that is not cached: fetch it, merge the edits, then
    /// validate and send the full post
    ///
    /// Validation failures come back as [`Error::Validation`] and nothing is
    /// sent.
    pub fn submit_remote_edit(
        &self,
        id: u64,
        title: Option<String>,
        body: Option<String>,
    ) -> TransportFuture<Mutation> {
        let transport = self.transport.clone();
        async move {
            let current = transport.fetch_post(id).await?;
            let edited = merge_edit(&current, title, body);
            validate_draft(&PostDraft::from(&edited))?;
            let updated = transport.update(edited).await?;
            log::debug!("updated post {id} fetched from the server");
            Ok(Mutation::Updated(updated))
        }
        .boxed()
    }

    /// Send a delete request
    pub fn submit_delete(&self, id: u64) -> TransportFuture<Mutation> {
        self.transport
            .delete(id)
            .map(|r| r.map(Mutation::Deleted))
            .boxed()
    }

    /// Create a post and prepend it to the first cached page
    pub async fn create(&self, draft: PostDraft, store: &mut PageStore<T>) -> Result<Post, Error> {
        let mutation = self.submit_create(draft)?.await?;
        let Mutation::Created(post) = &mutation else {
            return Err(Error::Generic("unexpected create response".to_string()));
        };
        let post = post.clone();
        store.apply(mutation);
        log::debug!("created post {}", post.id);
        Ok(post)
    }

    /// Update a post and replace it wherever it is cached
    pub async fn update(&self, post: Post, store: &mut PageStore<T>) -> Result<Post, Error> {
        let mutation = self.submit_update(post)?.await?;
        let Mutation::Updated(updated) = &mutation else {
            return Err(Error::Generic("unexpected update response".to_string()));
        };
        let updated = updated.clone();
        if !store.apply(mutation) {
            log::debug!("updated post {} is not loaded", updated.id);
        }
        Ok(updated)
    }

    /// Delete a post and drop it from whichever cached page holds it
    pub async fn delete(&self, id: u64, store: &mut PageStore<T>) -> Result<(), Error> {
        let mutation = self.submit_delete(id).await?;
        if !store.apply(mutation) {
            log::debug!("deleted post {id} is not loaded");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::memory::MemoryTransport;

    async fn loaded_store(transport: &MemoryTransport, pages: usize) -> PageStore<MemoryTransport> {
        let mut store = PageStore::new(transport.clone(), 10);
        store.load_pages(pages).await.unwrap();
        store
    }

    fn ids(store: &PageStore<MemoryTransport>) -> Vec<Vec<u64>> {
        store
            .feed()
            .collection()
            .pages()
            .iter()
            .map(|p| p.iter().map(|post| post.id).collect())
            .collect()
    }

    #[tokio::test]
    async fn test_create_prepends_to_first_page() {
        let transport = MemoryTransport::with_posts(15);
        let mut store = loaded_store(&transport, 2).await;
        let coordinator = MutationCoordinator::new(transport.clone());

        let post = coordinator
            .create(PostDraft::new("Fresh", "Freshly written body"), &mut store)
            .await
            .unwrap();

        assert_eq!(post.id, 16);
        assert_eq!(ids(&store)[0][..3], [16, 1, 2]);
        assert_eq!(ids(&store)[1], (11..=15).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_create_before_any_page_is_kept() {
        let transport = MemoryTransport::with_posts(0);
        let mut store = PageStore::new(transport.clone(), 10);
        let coordinator = MutationCoordinator::new(transport);

        coordinator
            .create(PostDraft::new("First", "The very first body"), &mut store)
            .await
            .unwrap();

        assert_eq!(ids(&store), vec![vec![1]]);
    }

    #[tokio::test]
    async fn test_invalid_draft_never_reaches_transport() {
        let transport = MemoryTransport::with_posts(5);
        let mut store = loaded_store(&transport, 1).await;
        let before = store.feed().collection().clone();
        let coordinator = MutationCoordinator::new(transport.clone());

        let err = coordinator
            .create(PostDraft::new("ab", "short"), &mut store)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(store.feed().collection(), &before);
        assert!(!transport.requests().iter().any(|r| r.starts_with("POST")));
    }

    #[tokio::test]
    async fn test_invalid_update_never_reaches_transport() {
        let transport = MemoryTransport::with_posts(5);
        let coordinator = MutationCoordinator::new(transport.clone());

        let result = coordinator.submit_update(Post {
            id: 2,
            title: String::new(),
            body: "A perfectly fine body".to_string(),
        });

        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_update_replaces_in_second_page() {
        let transport = MemoryTransport::with_posts(20);
        let mut store = loaded_store(&transport, 2).await;
        let before = store.feed().collection().clone();
        let coordinator = MutationCoordinator::new(transport.clone());

        coordinator
            .update(
                Post {
                    id: 12,
                    title: "new title".to_string(),
                    body: "An edited body text".to_string(),
                },
                &mut store,
            )
            .await
            .unwrap();

        let pages = store.feed().collection().pages();
        assert_eq!(pages[0], before.pages()[0]);
        assert_eq!(pages[1][1].title, "new title");
        for (index, post) in pages[1].iter().enumerate() {
            if post.id != 12 {
                assert_eq!(post, &before.pages()[1][index]);
            }
        }
        assert_eq!(transport.requests().last().unwrap(), "PUT /posts/12");
    }

    #[tokio::test]
    async fn test_delete_removes_one_post() {
        let transport = MemoryTransport::with_posts(20);
        let mut store = loaded_store(&transport, 2).await;
        let coordinator = MutationCoordinator::new(transport.clone());

        coordinator.delete(5, &mut store).await.unwrap();

        assert_eq!(store.feed().collection().len(), 19);
        assert!(store.feed().collection().find(5).is_none());
        assert_eq!(ids(&store)[0].len(), 9);
        assert_eq!(ids(&store)[1], (11..=20).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_failed_mutations_leave_cache_untouched() {
        let transport = MemoryTransport::with_posts(10);
        let mut store = loaded_store(&transport, 1).await;
        let before = store.feed().collection().clone();
        let coordinator = MutationCoordinator::new(transport.clone());
        transport.fail_mutations(true);

        let created = coordinator
            .create(PostDraft::new("Title", "A long enough body"), &mut store)
            .await;
        let updated = coordinator
            .update(
                Post {
                    id: 1,
                    title: "Title".to_string(),
                    body: "A long enough body".to_string(),
                },
                &mut store,
            )
            .await;
        let deleted = coordinator.delete(1, &mut store).await;

        assert!(matches!(created, Err(Error::Transport(_))));
        assert!(matches!(updated, Err(Error::Transport(_))));
        assert!(matches!(deleted, Err(Error::Transport(_))));
        assert_eq!(store.feed().collection(), &before);
    }

    #[tokio::test]
    async fn test_create_while_first_page_loads_is_not_duplicated() {
        let transport = MemoryTransport::with_posts(5);
        let mut store = PageStore::new(transport.clone(), 10);
        let coordinator = MutationCoordinator::new(transport.clone());

        let first = store.request_next_page().unwrap();
        coordinator
            .create(PostDraft::new("Fresh", "Freshly written body"), &mut store)
            .await
            .unwrap();
        assert_eq!(ids(&store), vec![vec![6]]);

        let completion = first.await;
        store.complete_page(completion).unwrap();

        assert_eq!(ids(&store), vec![vec![1, 2, 3, 4, 5, 6]]);
        assert_eq!(store.feed().next_offset(), 6);
    }

    #[tokio::test]
    async fn test_remote_edit_fetches_then_updates() {
        let transport = MemoryTransport::with_posts(20);
        let coordinator = MutationCoordinator::new(transport.clone());

        let mutation = coordinator
            .submit_remote_edit(15, Some("Fifteen, edited".to_string()), None)
            .await
            .unwrap();

        let Mutation::Updated(post) = &mutation else {
            panic!("expected an update, got {mutation:?}");
        };
        assert_eq!(post.title, "Fifteen, edited");
        assert_eq!(post.body, "Body text of post 15");
        assert_eq!(
            transport.requests(),
            vec!["GET /posts/15", "PUT /posts/15"]
        );
    }

    #[tokio::test]
    async fn test_invalid_remote_edit_is_not_sent() {
        let transport = MemoryTransport::with_posts(20);
        let coordinator = MutationCoordinator::new(transport.clone());

        let err = coordinator
            .submit_remote_edit(15, Some("ab".to_string()), None)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(transport.requests(), vec!["GET /posts/15"]);
    }

    #[tokio::test]
    async fn test_out_of_order_completions_both_apply() {
        let (transport, gate) = MemoryTransport::with_posts(10).gate_deletes();
        let mut store = loaded_store(&transport, 1).await;
        let coordinator = MutationCoordinator::new(transport.clone());

        let delete = tokio::spawn(coordinator.submit_delete(5));
        let create = coordinator
            .submit_create(PostDraft::new("Later", "Issued after the delete"))
            .unwrap();

        // the create response lands first
        let created = create.await.unwrap();
        store.apply(created);

        gate.notify_one();
        let deleted = delete.await.unwrap().unwrap();
        store.apply(deleted);

        assert_eq!(store.feed().collection().len(), 10);
        assert!(store.feed().collection().find(5).is_none());
        assert_eq!(ids(&store)[0][0], 11);
    }
}
