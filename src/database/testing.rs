//! Store doubles for exercising partial-failure paths.

use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::database::MemoryStore;
use crate::database::repository::PostRepository;
use crate::post::post_model::{Post, PostChanges, PostQuery};
use crate::utils::error::CustomError;

/// Posts backed by a `MemoryStore` whose counter updates can be made to fail.
pub struct FailingCounters {
    pub inner: Arc<MemoryStore>,
    pub fail_votes: bool,
    pub fail_comments: bool,
}

fn store_down() -> CustomError {
    CustomError::InternalServerError("connection reset".into())
}

#[async_trait]
impl PostRepository for FailingCounters {
    async fn insert_post(&self, post: Post) -> Result<Post, CustomError> {
        self.inner.insert_post(post).await
    }

    async fn find_post(&self, id: &ObjectId) -> Result<Option<Post>, CustomError> {
        self.inner.find_post(id).await
    }

    async fn list_posts(&self, query: &PostQuery) -> Result<Vec<Post>, CustomError> {
        self.inner.list_posts(query).await
    }

    async fn update_post(
        &self,
        id: &ObjectId,
        changes: &PostChanges,
    ) -> Result<Option<Post>, CustomError> {
        self.inner.update_post(id, changes).await
    }

    async fn delete_post(&self, id: &ObjectId) -> Result<bool, CustomError> {
        self.inner.delete_post(id).await
    }

    async fn increment_votes(
        &self,
        id: &ObjectId,
        delta: i64,
    ) -> Result<Option<Post>, CustomError> {
        if self.fail_votes {
            return Err(store_down());
        }
        self.inner.increment_votes(id, delta).await
    }

    async fn record_comment(
        &self,
        id: &ObjectId,
        commenter: &str,
    ) -> Result<Option<Post>, CustomError> {
        if self.fail_comments {
            return Err(store_down());
        }
        self.inner.record_comment(id, commenter).await
    }
}
