use std::sync::Arc;

use log::{info, warn};
use mongodb::bson::{DateTime, oid::ObjectId};

use crate::database::repository::{
    CommentRepository, PostRepository, UserRepository, VoteRepository,
};
use crate::middleware::auth::SessionUser;
use crate::post::feed::{FeedSource, following_feed};
use crate::post::listing::{CategoryCount, category_counts, filter_posts};
use crate::post::post_model::{
    CreatePostRequest, MAX_TITLE_LENGTH, MIN_CONTENT_LENGTH, Post, PostChanges,
    PostQuery, PostSort, PostStatus, PostView, SearchQuery, VoteView,
};
use crate::post::vote_model::Vote;
use crate::utils::error::CustomError;
use crate::utils::helpers::parse_object_id;
use crate::utils::pagination::{PAGE_SIZE, Page, paginate};

/// Size of the popular, newest and regular listings.
pub const LIST_LIMIT: i64 = 20;

fn validate_title(title: &str) -> Result<(), CustomError> {
    if title.trim().is_empty() {
        return Err(CustomError::ValidationError("Title cannot be empty".into()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(CustomError::ValidationError(format!(
            "Title cannot be longer than {} characters",
            MAX_TITLE_LENGTH
        )));
    }
    Ok(())
}

fn validate_content(content: &str) -> Result<(), CustomError> {
    if content.chars().count() < MIN_CONTENT_LENGTH {
        return Err(CustomError::ValidationError(format!(
            "Content must be at least {} characters long",
            MIN_CONTENT_LENGTH
        )));
    }
    Ok(())
}

fn validate_changes(changes: &PostChanges) -> Result<(), CustomError> {
    if changes.is_empty() {
        return Err(CustomError::ValidationError("Nothing to update".into()));
    }
    if let Some(title) = &changes.title {
        validate_title(title)?;
    }
    if let Some(content) = &changes.content {
        validate_content(content)?;
    }
    if changes.category.as_deref().is_some_and(|c| c.trim().is_empty()) {
        return Err(CustomError::ValidationError("Category cannot be empty".into()));
    }
    Ok(())
}

/// Published posts are public; a draft only to the account that wrote it.
pub fn is_visible_to(post: &Post, session: Option<&SessionUser>) -> bool {
    post.status == PostStatus::Published || session.is_some_and(|s| post.is_owned_by(&s.email))
}

pub struct PostService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    votes: Arc<dyn VoteRepository>,
    users: Arc<dyn UserRepository>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        votes: Arc<dyn VoteRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        PostService {
            posts,
            comments,
            votes,
            users,
        }
    }

    pub async fn create_post(
        &self,
        session: &SessionUser,
        request: CreatePostRequest,
    ) -> Result<Post, CustomError> {
        let (Some(title), Some(content), Some(category)) = (
            request.title.filter(|t| !t.trim().is_empty()),
            request.content.filter(|c| !c.trim().is_empty()),
            request.category.filter(|c| !c.trim().is_empty()),
        ) else {
            return Err(CustomError::ValidationError(
                "Title, content, and category are required".into(),
            ));
        };
        validate_title(&title)?;
        validate_content(&content)?;

        // name and picture come from the stored profile, which may be newer than the token
        let author = self.users.find_by_id(&session.id).await?;
        let (author_name, author_image) = match &author {
            Some(user) => (user.name.clone(), Some(user.avatar_reference())),
            None => (session.name.clone(), None),
        };

        let now = DateTime::now();
        let post = Post {
            id: None,
            title,
            content,
            author: author_name,
            author_email: session.email.clone(),
            author_image,
            date: now,
            votes: 0,
            comments: 0,
            commenters: Vec::new(),
            category,
            tags: request.tags.unwrap_or_default(),
            images: request.images.unwrap_or_default(),
            status: request.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        let post = self.posts.insert_post(post).await?;
        info!(
            "post {} created by {} ({})",
            post.id.map(|id| id.to_hex()).unwrap_or_default(),
            session.id.to_hex(),
            post.status.as_str()
        );
        Ok(post)
    }

    pub async fn get_post(
        &self,
        session: Option<&SessionUser>,
        id: &str,
    ) -> Result<Post, CustomError> {
        let object_id = parse_object_id(id, "post")?;
        self.find_visible(session, &object_id).await
    }

    async fn find_existing(&self, id: &ObjectId) -> Result<Post, CustomError> {
        self.posts
            .find_post(id)
            .await?
            .ok_or_else(|| CustomError::NotFoundError("Post not found".into()))
    }

    /// Drafts exist only for their author; anyone else gets a 404.
    async fn find_visible(
        &self,
        session: Option<&SessionUser>,
        id: &ObjectId,
    ) -> Result<Post, CustomError> {
        let post = self.find_existing(id).await?;
        if !is_visible_to(&post, session) {
            return Err(CustomError::NotFoundError("Post not found".into()));
        }
        Ok(post)
    }

    async fn find_owned(&self, session: &SessionUser, id: &ObjectId) -> Result<Post, CustomError> {
        let post = self.find_existing(id).await?;
        if !post.is_owned_by(&session.email) {
            warn!(
                "{} tried to modify post {} owned by someone else",
                session.id.to_hex(),
                id.to_hex()
            );
            return Err(CustomError::ForbiddenError("Not authorized".into()));
        }
        Ok(post)
    }

    pub async fn update_post(
        &self,
        session: &SessionUser,
        id: &str,
        changes: PostChanges,
    ) -> Result<Post, CustomError> {
        let object_id = parse_object_id(id, "post")?;
        self.find_owned(session, &object_id).await?;
        validate_changes(&changes)?;

        let updated = self
            .posts
            .update_post(&object_id, &changes)
            .await?
            .ok_or_else(|| CustomError::NotFoundError("Post not found".into()))?;
        info!("post {} updated", id);
        Ok(updated)
    }

    /// Removes the post together with its comments and votes.
    pub async fn delete_post(&self, session: &SessionUser, id: &str) -> Result<(), CustomError> {
        let object_id = parse_object_id(id, "post")?;
        self.find_owned(session, &object_id).await?;

        if !self.posts.delete_post(&object_id).await? {
            return Err(CustomError::NotFoundError("Post not found".into()));
        }
        let comments = self
            .comments
            .delete_comments_for_post(&object_id.to_hex())
            .await?;
        let votes = self.votes.delete_votes_for_post(&object_id).await?;
        info!(
            "post {} deleted with {} comments and {} votes",
            id, comments, votes
        );
        Ok(())
    }

    /// Counts one vote per user. The vote row is written first; its unique key
    /// decides whether the counter moves.
    pub async fn upvote(&self, session: &SessionUser, id: &str) -> Result<VoteView, CustomError> {
        let post_id = parse_object_id(id, "post")?;
        self.find_visible(Some(session), &post_id).await?;

        if !self.votes.insert_vote(Vote::new(session.id, post_id)).await? {
            return Err(CustomError::ConflictError(
                "You have already upvoted this post".into(),
            ));
        }

        // a vote row without its increment would block every retry with 409
        match self.posts.increment_votes(&post_id, 1).await {
            Ok(Some(post)) => {
                info!("post {} upvoted, now {} votes", id, post.votes);
                Ok(VoteView {
                    votes: post.votes,
                    user_voted: true,
                })
            }
            Ok(None) => {
                // deleted between the lookup and the increment
                self.votes.delete_vote(&session.id, &post_id).await?;
                Err(CustomError::NotFoundError("Post not found".into()))
            }
            Err(e) => {
                warn!("vote counter update failed for post {}, removing vote", id);
                self.votes.delete_vote(&session.id, &post_id).await?;
                Err(e)
            }
        }
    }

    pub async fn vote_status(
        &self,
        session: Option<&SessionUser>,
        id: &str,
    ) -> Result<VoteView, CustomError> {
        let post_id = parse_object_id(id, "post")?;
        let post = self.find_visible(session, &post_id).await?;

        let user_voted = match session {
            Some(session) => self.votes.has_voted(&session.id, &post_id).await?,
            None => false,
        };
        Ok(VoteView {
            votes: post.votes,
            user_voted,
        })
    }

    pub async fn list_posts(
        &self,
        sort: PostSort,
        limit: Option<i64>,
    ) -> Result<Vec<PostView>, CustomError> {
        let posts = self
            .posts
            .list_posts(&PostQuery::published(sort, limit))
            .await?;
        Ok(posts.iter().map(PostView::from).collect())
    }

    pub async fn drafts(&self, session: &SessionUser) -> Result<Vec<PostView>, CustomError> {
        let query = PostQuery {
            status: Some(PostStatus::Draft),
            author_emails: Some(vec![session.email.clone()]),
            sort: PostSort::UpdatedDesc,
            limit: None,
        };
        let posts = self.posts.list_posts(&query).await?;
        Ok(posts.iter().map(PostView::from).collect())
    }

    pub async fn following(
        &self,
        session: Option<&SessionUser>,
    ) -> Result<(FeedSource, Vec<PostView>), CustomError> {
        let (source, posts) =
            following_feed(self.posts.as_ref(), self.users.as_ref(), session).await?;
        if source != FeedSource::Personalized {
            info!("following feed fell back to {:?}", source);
        }
        Ok((source, posts.iter().map(PostView::from).collect()))
    }

    /// Popular ordering, filtered by search text and category, one page of ten.
    pub async fn search(&self, query: &SearchQuery) -> Result<Page<PostView>, CustomError> {
        let all = self.list_posts(PostSort::VotesDesc, None).await?;
        let filtered = filter_posts(all, query.search.as_deref(), query.category.as_deref());
        Ok(paginate(&filtered, query.page.unwrap_or(1), PAGE_SIZE))
    }

    pub async fn categories(&self) -> Result<Vec<CategoryCount>, CustomError> {
        let posts = self
            .posts
            .list_posts(&PostQuery::published(PostSort::CreatedDesc, None))
            .await?;
        Ok(category_counts(posts.iter().map(|p| p.category.as_str())))
    }
}
