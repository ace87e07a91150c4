use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use mongodb::bson::{DateTime, oid::ObjectId};

use crate::comment::model::Comment;
use crate::database::repository::{
    CommentRepository, PostRepository, UserRepository, VoteRepository,
};
use crate::post::post_model::{Post, PostChanges, PostQuery, PostSort};
use crate::post::vote_model::Vote;
use crate::user::model::{ProfileChanges, User};
use crate::utils::error::CustomError;

#[derive(Default)]
struct MemoryState {
    posts: Vec<Post>,
    comments: Vec<Comment>,
    users: Vec<User>,
    votes: Vec<Vote>,
}

/// In-process store with the same guarantees as the MongoDB one: every
/// method runs under a single lock, so counter updates and unique inserts
/// are atomic.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>, CustomError> {
        self.state
            .lock()
            .map_err(|_| CustomError::InternalServerError("memory store poisoned".to_string()))
    }
}

fn apply_post_changes(post: &mut Post, changes: &PostChanges) {
    if let Some(title) = &changes.title {
        post.title = title.clone();
    }
    if let Some(content) = &changes.content {
        post.content = content.clone();
    }
    if let Some(category) = &changes.category {
        post.category = category.clone();
    }
    if let Some(tags) = &changes.tags {
        post.tags = tags.clone();
    }
    if let Some(images) = &changes.images {
        post.images = images.clone();
    }
    if let Some(status) = changes.status {
        post.status = status;
    }
    post.updated_at = DateTime::now();
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn insert_post(&self, mut post: Post) -> Result<Post, CustomError> {
        post.id.get_or_insert_with(ObjectId::new);
        self.state()?.posts.push(post.clone());
        Ok(post)
    }

    async fn find_post(&self, id: &ObjectId) -> Result<Option<Post>, CustomError> {
        Ok(self
            .state()?
            .posts
            .iter()
            .find(|p| p.id.as_ref() == Some(id))
            .cloned())
    }

    async fn list_posts(&self, query: &PostQuery) -> Result<Vec<Post>, CustomError> {
        let mut posts: Vec<Post> = self
            .state()?
            .posts
            .iter()
            .filter(|p| query.status.is_none_or(|s| p.status == s))
            .filter(|p| {
                query
                    .author_emails
                    .as_ref()
                    .is_none_or(|emails| emails.contains(&p.author_email))
            })
            .cloned()
            .collect();

        match query.sort {
            PostSort::VotesDesc => posts.sort_by(|a, b| {
                b.votes
                    .cmp(&a.votes)
                    .then_with(|| b.created_at.cmp(&a.created_at))
            }),
            PostSort::CreatedDesc => posts.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            PostSort::UpdatedDesc => posts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
        }
        if let Some(limit) = query.limit {
            posts.truncate(usize::try_from(limit).unwrap_or(0));
        }
        Ok(posts)
    }

    async fn update_post(
        &self,
        id: &ObjectId,
        changes: &PostChanges,
    ) -> Result<Option<Post>, CustomError> {
        let mut state = self.state()?;
        Ok(state
            .posts
            .iter_mut()
            .find(|p| p.id.as_ref() == Some(id))
            .map(|post| {
                apply_post_changes(post, changes);
                post.clone()
            }))
    }

    async fn delete_post(&self, id: &ObjectId) -> Result<bool, CustomError> {
        let mut state = self.state()?;
        let before = state.posts.len();
        state.posts.retain(|p| p.id.as_ref() != Some(id));
        Ok(state.posts.len() < before)
    }

    async fn increment_votes(
        &self,
        id: &ObjectId,
        delta: i64,
    ) -> Result<Option<Post>, CustomError> {
        let mut state = self.state()?;
        Ok(state
            .posts
            .iter_mut()
            .find(|p| p.id.as_ref() == Some(id))
            .map(|post| {
                post.votes += delta;
                post.updated_at = DateTime::now();
                post.clone()
            }))
    }

    async fn record_comment(
        &self,
        id: &ObjectId,
        commenter: &str,
    ) -> Result<Option<Post>, CustomError> {
        let mut state = self.state()?;
        Ok(state
            .posts
            .iter_mut()
            .find(|p| p.id.as_ref() == Some(id))
            .map(|post| {
                post.comments += 1;
                if !post.commenters.iter().any(|c| c == commenter) {
                    post.commenters.push(commenter.to_string());
                }
                post.updated_at = DateTime::now();
                post.clone()
            }))
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn insert_comment(&self, mut comment: Comment) -> Result<Comment, CustomError> {
        comment.id.get_or_insert_with(ObjectId::new);
        self.state()?.comments.push(comment.clone());
        Ok(comment)
    }

    async fn find_comment(&self, id: &ObjectId) -> Result<Option<Comment>, CustomError> {
        Ok(self
            .state()?
            .comments
            .iter()
            .find(|c| c.id.as_ref() == Some(id))
            .cloned())
    }

    async fn comments_for_post(&self, post_id: &str) -> Result<Vec<Comment>, CustomError> {
        let mut comments: Vec<Comment> = self
            .state()?
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        // insertion order breaks ties between comments made in the same millisecond
        comments.reverse();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(comments)
    }

    async fn count_for_post(&self, post_id: &str) -> Result<u64, CustomError> {
        Ok(self
            .state()?
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .count() as u64)
    }

    async fn delete_comment(&self, id: &ObjectId) -> Result<bool, CustomError> {
        let mut state = self.state()?;
        let before = state.comments.len();
        state.comments.retain(|c| c.id.as_ref() != Some(id));
        Ok(state.comments.len() < before)
    }

    async fn delete_comments_for_post(&self, post_id: &str) -> Result<u64, CustomError> {
        let mut state = self.state()?;
        let before = state.comments.len();
        state.comments.retain(|c| c.post_id != post_id);
        Ok((before - state.comments.len()) as u64)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert_user(&self, mut user: User) -> Result<User, CustomError> {
        let mut state = self.state()?;
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(CustomError::ValidationError(
                "User already exists".to_string(),
            ));
        }
        user.id.get_or_insert_with(ObjectId::new);
        state.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, CustomError> {
        Ok(self
            .state()?
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, CustomError> {
        Ok(self
            .state()?
            .users
            .iter()
            .find(|u| u.id.as_ref() == Some(id))
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<User>, CustomError> {
        Ok(self
            .state()?
            .users
            .iter()
            .filter(|u| u.id.is_some_and(|id| ids.contains(&id)))
            .cloned()
            .collect())
    }

    async fn update_profile(
        &self,
        email: &str,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, CustomError> {
        let mut state = self.state()?;
        Ok(state
            .users
            .iter_mut()
            .find(|u| u.email == email)
            .map(|user| {
                if let Some(name) = &changes.name {
                    user.name = name.clone();
                }
                if let Some(bio) = &changes.bio {
                    user.bio = bio.clone();
                }
                if let Some(image) = &changes.image {
                    user.image = image.clone();
                }
                user.updated_at = DateTime::now();
                user.clone()
            }))
    }

    async fn add_following(
        &self,
        user: &ObjectId,
        target: &ObjectId,
    ) -> Result<bool, CustomError> {
        let mut state = self.state()?;
        match state.users.iter_mut().find(|u| u.id.as_ref() == Some(user)) {
            Some(u) if !u.following.contains(target) => {
                u.following.push(*target);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn remove_following(
        &self,
        user: &ObjectId,
        target: &ObjectId,
    ) -> Result<bool, CustomError> {
        let mut state = self.state()?;
        match state.users.iter_mut().find(|u| u.id.as_ref() == Some(user)) {
            Some(u) => {
                let before = u.following.len();
                u.following.retain(|id| id != target);
                Ok(u.following.len() < before)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl VoteRepository for MemoryStore {
    async fn insert_vote(&self, mut vote: Vote) -> Result<bool, CustomError> {
        let mut state = self.state()?;
        if state
            .votes
            .iter()
            .any(|v| v.user_id == vote.user_id && v.post_id == vote.post_id)
        {
            return Ok(false);
        }
        vote.id.get_or_insert_with(ObjectId::new);
        state.votes.push(vote);
        Ok(true)
    }

    async fn has_voted(&self, user: &ObjectId, post: &ObjectId) -> Result<bool, CustomError> {
        Ok(self
            .state()?
            .votes
            .iter()
            .any(|v| &v.user_id == user && &v.post_id == post))
    }

    async fn delete_vote(&self, user: &ObjectId, post: &ObjectId) -> Result<bool, CustomError> {
        let mut state = self.state()?;
        let before = state.votes.len();
        state
            .votes
            .retain(|v| !(&v.user_id == user && &v.post_id == post));
        Ok(state.votes.len() < before)
    }

    async fn delete_votes_for_post(&self, post: &ObjectId) -> Result<u64, CustomError> {
        let mut state = self.state()?;
        let before = state.votes.len();
        state.votes.retain(|v| &v.post_id != post);
        Ok((before - state.votes.len()) as u64)
    }
}
