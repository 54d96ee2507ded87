//! Posting service

use std::sync::Arc;

use crate::error::Result;
use crate::search::SearchIndex;
use crate::service::{now, validation};
use crate::store::Store;
use crate::types::{NewPost, Post, Viewer};

#[derive(Clone)]
pub struct PostingService {
    store: Arc<dyn Store>,
    index: Arc<dyn SearchIndex>,
}

impl PostingService {
    pub fn new(store: Arc<dyn Store>, index: Arc<dyn SearchIndex>) -> Self {
        Self { store, index }
    }

    /// Store a post by the viewer, then add it to the search index
    ///
    /// The post is committed before indexing starts. If indexing fails the
    /// post stays and the failure is only logged, so it is merely missing
    /// from search results.
    pub async fn publish(&self, viewer: &Viewer, body: &str) -> Result<Post> {
        let author = viewer.account()?;
        let body = validation::post_body(body)?;

        let post = self
            .store
            .create_post(NewPost {
                author_id: author.id,
                body,
                created_at: now(),
            })
            .await?;

        tracing::info!(id = post.id, author = %author.nickname, "Published post");

        if let Err(e) = self.index.index_post(post.id, &post.body).await {
            tracing::warn!(id = post.id, error = %e, "Failed to index post");
        }

        Ok(post)
    }
}
