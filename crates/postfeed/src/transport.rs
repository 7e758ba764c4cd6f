//! Transport adapter for the `/posts` REST collection
//!
//! Every call returns an owned, boxed future so the session can keep several
//! requests in flight at once and handle their completions in any order.

use futures::future::{BoxFuture, FutureExt};
use postfeed_core::pages::Page;
use postfeed_core::post::{Post, PostDraft};
use postfeed_core::queries::{collection_url, page_query, post_url};
use serde::de::DeserializeOwned;

use crate::error::Error;

pub type TransportFuture<T> = BoxFuture<'static, Result<T, Error>>;

/// Requests against the posts collection
///
/// Any failure, whatever its HTTP status, is reported as [`Error::Transport`].
pub trait PostsTransport: Clone + Send + Sync + 'static {
    /// `GET /posts?_limit={limit}&_start={offset}`
    fn fetch_page(&self, offset: usize, limit: usize) -> TransportFuture<Page>;

    /// `GET /posts/{id}`
    fn fetch_post(&self, id: u64) -> TransportFuture<Post>;

    /// `POST /posts`, returns the post with its assigned id
    fn create(&self, draft: PostDraft) -> TransportFuture<Post>;

    /// `PUT /posts/{id}` with the full post
    fn update(&self, post: Post) -> TransportFuture<Post>;

    /// `DELETE /posts/{id}`, returns the deleted id
    fn delete(&self, id: u64) -> TransportFuture<u64>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

async fn send(request: reqwest::RequestBuilder, action: &str) -> Result<reqwest::Response, Error> {
    let response = request
        .send()
        .await
        .map_err(|e| Error::Transport(format!("Failed to {action}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        log::warn!("{action} failed with HTTP {status}");
        return Err(Error::Transport(if body.is_empty() {
            format!("Failed to {action}: HTTP {status}")
        } else {
            format!("Failed to {action}: HTTP {status}: {body}")
        }));
    }

    Ok(response)
}

async fn send_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    action: &str,
) -> Result<T, Error> {
    send(request, action)
        .await?
        .json::<T>()
        .await
        .map_err(|e| Error::Transport(format!("Failed to parse {action} response: {e}")))
}

impl PostsTransport for HttpTransport {
    fn fetch_page(&self, offset: usize, limit: usize) -> TransportFuture<Page> {
        let request = self
            .client
            .get(collection_url(&self.base_url))
            .query(&page_query(offset, limit));

        async move {
            log::debug!("GET /posts _start={offset} _limit={limit}");
            let page: Page = send_json(request, "fetch posts").await?;
            log::debug!("received {} posts at offset {offset}", page.len());
            Ok(page)
        }
        .boxed()
    }

    fn fetch_post(&self, id: u64) -> TransportFuture<Post> {
        let request = self.client.get(post_url(&self.base_url, id));

        async move {
            log::debug!("GET /posts/{id}");
            send_json(request, "fetch post").await
        }
        .boxed()
    }

    fn create(&self, draft: PostDraft) -> TransportFuture<Post> {
        let request = self
            .client
            .post(collection_url(&self.base_url))
            .json(&draft);

        async move {
            log::debug!("POST /posts");
            send_json(request, "create post").await
        }
        .boxed()
    }

    fn update(&self, post: Post) -> TransportFuture<Post> {
        let request = self
            .client
            .put(post_url(&self.base_url, post.id))
            .json(&post);
        let id = post.id;

        async move {
            log::debug!("PUT /posts/{id}");
            send_json(request, "update post").await
        }
        .boxed()
    }

    fn delete(&self, id: u64) -> TransportFuture<u64> {
        let request = self.client.delete(post_url(&self.base_url, id));

        async move {
            log::debug!("DELETE /posts/{id}");
            send(request, "delete post").await?;
            Ok(id)
        }
        .boxed()
    }
}
