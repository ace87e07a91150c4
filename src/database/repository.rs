//! Storage seams. Services talk to these traits; `MongoStore` and
//! `MemoryStore` provide them.

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::comment::model::Comment;
use crate::post::post_model::{Post, PostChanges, PostQuery};
use crate::post::vote_model::Vote;
use crate::user::model::{ProfileChanges, User};
use crate::utils::error::CustomError;

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn insert_post(&self, post: Post) -> Result<Post, CustomError>;
    async fn find_post(&self, id: &ObjectId) -> Result<Option<Post>, CustomError>;
    async fn list_posts(&self, query: &PostQuery) -> Result<Vec<Post>, CustomError>;
    async fn update_post(
        &self,
        id: &ObjectId,
        changes: &PostChanges,
    ) -> Result<Option<Post>, CustomError>;
    async fn delete_post(&self, id: &ObjectId) -> Result<bool, CustomError>;
    /// Single-operation `votes += delta`; returns the post after the change.
    async fn increment_votes(&self, id: &ObjectId, delta: i64)
    -> Result<Option<Post>, CustomError>;
    /// Single-operation `comments += 1` plus set-insert of `commenter`.
    async fn record_comment(
        &self,
        id: &ObjectId,
        commenter: &str,
    ) -> Result<Option<Post>, CustomError>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn insert_comment(&self, comment: Comment) -> Result<Comment, CustomError>;
    async fn find_comment(&self, id: &ObjectId) -> Result<Option<Comment>, CustomError>;
    /// Newest first.
    async fn comments_for_post(&self, post_id: &str) -> Result<Vec<Comment>, CustomError>;
    async fn count_for_post(&self, post_id: &str) -> Result<u64, CustomError>;
    async fn delete_comment(&self, id: &ObjectId) -> Result<bool, CustomError>;
    async fn delete_comments_for_post(&self, post_id: &str) -> Result<u64, CustomError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with a validation error when the email is taken.
    async fn insert_user(&self, user: User) -> Result<User, CustomError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, CustomError>;
    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, CustomError>;
    async fn find_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<User>, CustomError>;
    async fn update_profile(
        &self,
        email: &str,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, CustomError>;
    async fn add_following(&self, user: &ObjectId, target: &ObjectId)
    -> Result<bool, CustomError>;
    async fn remove_following(
        &self,
        user: &ObjectId,
        target: &ObjectId,
    ) -> Result<bool, CustomError>;
}

#[async_trait]
pub trait VoteRepository: Send + Sync {
    /// Returns `false` when the user already voted on the post.
    async fn insert_vote(&self, vote: Vote) -> Result<bool, CustomError>;
    async fn has_voted(&self, user: &ObjectId, post: &ObjectId) -> Result<bool, CustomError>;
    async fn delete_vote(&self, user: &ObjectId, post: &ObjectId) -> Result<bool, CustomError>;
    async fn delete_votes_for_post(&self, post: &ObjectId) -> Result<u64, CustomError>;
}
