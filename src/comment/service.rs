use std::sync::Arc;

use log::{info, warn};
use mongodb::bson::{DateTime, oid::ObjectId};

use crate::comment::model::{Comment, CreateCommentRequest};
use crate::database::repository::{CommentRepository, PostRepository, UserRepository};
use crate::middleware::auth::SessionUser;
use crate::post::post_service::is_visible_to;
use crate::user::avatar::letter_avatar;
use crate::utils::error::CustomError;
use crate::utils::helpers::parse_object_id;

/// Comments store the lower-case hex form of their post id; ids that are not
/// ObjectIds are looked up as given.
fn comment_key(post_id: &str) -> String {
    let post_id = post_id.trim();
    ObjectId::parse_str(post_id)
        .map(|id| id.to_hex())
        .unwrap_or_else(|_| post_id.to_string())
}

pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentRepository>,
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        CommentService {
            comments,
            posts,
            users,
        }
    }

    /// Comments of a post, newest first
    pub async fn list_for_post(&self, post_id: &str) -> Result<Vec<Comment>, CustomError> {
        self.comments
            .comments_for_post(&comment_key(post_id))
            .await
    }

    /// Count taken from the comment rows themselves, not the post counter
    pub async fn count_for_post(&self, post_id: &str) -> Result<u64, CustomError> {
        self.comments.count_for_post(&comment_key(post_id)).await
    }

    pub async fn create_comment(
        &self,
        session: &SessionUser,
        request: CreateCommentRequest,
    ) -> Result<Comment, CustomError> {
        let post_id = request
            .post_id
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| CustomError::BadRequestError("Post ID is required".into()))?;
        let content = request
            .content
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| CustomError::ValidationError("Comment content is required".into()))?
            .to_string();

        let post_object_id = parse_object_id(post_id, "post")?;
        match self.posts.find_post(&post_object_id).await? {
            Some(post) if is_visible_to(&post, Some(session)) => {}
            _ => return Err(CustomError::NotFoundError("Post not found".into())),
        }
        // normalised so the string key matches what the post id encodes to
        let post_id = post_object_id.to_hex();

        let parent_comment_id = match request.parent_comment_id.as_deref() {
            Some(parent) if !parent.trim().is_empty() => {
                let parent_id = parse_object_id(parent.trim(), "comment")?;
                match self.comments.find_comment(&parent_id).await? {
                    Some(parent) if parent.post_id == post_id => Some(parent_id.to_hex()),
                    _ => {
                        return Err(CustomError::BadRequestError(
                            "Parent comment not found on this post".into(),
                        ));
                    }
                }
            }
            _ => None,
        };

        let (author, author_image) = match self.users.find_by_id(&session.id).await? {
            Some(user) => (user.name.clone(), user.avatar_reference()),
            None => (
                session.name.clone(),
                letter_avatar(&session.name).reference(&session.id.to_hex()),
            ),
        };

        let now = DateTime::now();
        let comment = self
            .comments
            .insert_comment(Comment {
                id: None,
                post_id,
                content,
                author,
                author_image: author_image.clone(),
                author_email: session.email.clone(),
                parent_comment_id,
                created_at: now,
                updated_at: now,
            })
            .await?;

        let failure = match self
            .posts
            .record_comment(&post_object_id, &author_image)
            .await
        {
            Ok(Some(_)) => None,
            // post deleted while the comment was being written
            Ok(None) => Some(CustomError::NotFoundError("Post not found".into())),
            Err(e) => Some(e),
        };
        if let Some(err) = failure {
            warn!(
                "counter update failed for post {}, rolling back comment",
                post_object_id.to_hex()
            );
            if let Some(id) = comment.id {
                self.comments.delete_comment(&id).await?;
            }
            return Err(err);
        }

        info!(
            "comment added to post {} by {}",
            comment.post_id,
            session.id.to_hex()
        );
        Ok(comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::database::testing::FailingCounters;
    use crate::post::post_model::{Post, PostStatus};
    use crate::user::model::{DEFAULT_BIO, User};

    fn service(store: &Arc<MemoryStore>) -> CommentService {
        CommentService::new(store.clone(), store.clone(), store.clone())
    }

    async fn member(store: &MemoryStore, name: &str, email: &str) -> SessionUser {
        let now = DateTime::now();
        let user = store
            .insert_user(User {
                id: None,
                name: name.into(),
                email: email.into(),
                password: None,
                image: letter_avatar(name),
                bio: DEFAULT_BIO.into(),
                following: Vec::new(),
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
        SessionUser {
            id: user.id.unwrap(),
            email: user.email,
            name: user.name,
        }
    }

    async fn post(store: &MemoryStore) -> String {
        post_with_status(store, PostStatus::Published).await
    }

    async fn post_with_status(store: &MemoryStore, status: PostStatus) -> String {
        let now = DateTime::now();
        store
            .insert_post(Post {
                id: None,
                title: "Hello".into(),
                content: "Body".into(),
                author: "Jane Doe".into(),
                author_email: "jane@x.com".into(),
                author_image: None,
                date: now,
                votes: 0,
                comments: 0,
                commenters: Vec::new(),
                category: "Rentals".into(),
                tags: Vec::new(),
                images: Vec::new(),
                status,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap()
            .id
            .unwrap()
            .to_hex()
    }

    fn request(post_id: &str, content: &str, parent: Option<String>) -> CreateCommentRequest {
        CreateCommentRequest {
            post_id: Some(post_id.into()),
            content: Some(content.into()),
            parent_comment_id: parent,
        }
    }

    #[actix_web::test]
    async fn comment_bumps_counter_and_commenters() {
        let store = Arc::new(MemoryStore::new());
        let comments = service(&store);
        let bob = member(&store, "Bob Smith", "bob@x.com").await;
        let post_id = post(&store).await;

        let comment = comments
            .create_comment(&bob, request(&post_id, "Nice one", None))
            .await
            .unwrap();
        assert_eq!(comment.author, "Bob Smith");
        assert_eq!(comment.author_image, "letter-avatar:BS:#f97316");

        comments
            .create_comment(&bob, request(&post_id, "Again", None))
            .await
            .unwrap();

        let stored = store
            .find_post(&ObjectId::parse_str(&post_id).unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.comments, 2);
        assert_eq!(stored.commenters, vec!["letter-avatar:BS:#f97316".to_string()]);
        assert_eq!(comments.count_for_post(&post_id).await.unwrap(), 2);

        let listed = comments.list_for_post(&post_id).await.unwrap();
        assert_eq!(listed[0].content, "Again");
    }

    #[actix_web::test]
    async fn rejects_missing_content_and_unknown_post() {
        let store = Arc::new(MemoryStore::new());
        let comments = service(&store);
        let bob = member(&store, "Bob Smith", "bob@x.com").await;
        let post_id = post(&store).await;

        assert!(matches!(
            comments.create_comment(&bob, request(&post_id, "   ", None)).await,
            Err(CustomError::ValidationError(_))
        ));
        assert!(matches!(
            comments
                .create_comment(&bob, request(&ObjectId::new().to_hex(), "Hi", None))
                .await,
            Err(CustomError::NotFoundError(_))
        ));
        assert!(matches!(
            comments.create_comment(&bob, request("garbage", "Hi", None)).await,
            Err(CustomError::BadRequestError(_))
        ));
        assert_eq!(comments.count_for_post(&post_id).await.unwrap(), 0);
    }

    #[actix_web::test]
    async fn reply_parent_must_belong_to_the_post() {
        let store = Arc::new(MemoryStore::new());
        let comments = service(&store);
        let bob = member(&store, "Bob Smith", "bob@x.com").await;
        let first_post = post(&store).await;
        let other_post = post(&store).await;

        let parent = comments
            .create_comment(&bob, request(&first_post, "Top level", None))
            .await
            .unwrap();
        let parent_id = parent.id.unwrap().to_hex();

        let reply = comments
            .create_comment(&bob, request(&first_post, "Reply", Some(parent_id.clone())))
            .await
            .unwrap();
        assert_eq!(reply.parent_comment_id, Some(parent_id.clone()));

        assert!(matches!(
            comments
                .create_comment(&bob, request(&other_post, "Wrong post", Some(parent_id)))
                .await,
            Err(CustomError::BadRequestError(_))
        ));
    }

    #[actix_web::test]
    async fn failed_counter_update_removes_the_comment() {
        let store = Arc::new(MemoryStore::new());
        let posts = Arc::new(FailingCounters {
            inner: store.clone(),
            fail_votes: false,
            fail_comments: true,
        });
        let comments = CommentService::new(store.clone(), posts, store.clone());
        let bob = member(&store, "Bob Smith", "bob@x.com").await;
        let post_id = post(&store).await;

        assert!(matches!(
            comments.create_comment(&bob, request(&post_id, "Lost", None)).await,
            Err(CustomError::InternalServerError(_))
        ));
        assert_eq!(comments.count_for_post(&post_id).await.unwrap(), 0);
        let stored = store
            .find_post(&ObjectId::parse_str(&post_id).unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.comments, 0);
    }

    #[actix_web::test]
    async fn drafts_take_comments_from_their_author_only() {
        let store = Arc::new(MemoryStore::new());
        let comments = service(&store);
        let jane = member(&store, "Jane Doe", "jane@x.com").await;
        let bob = member(&store, "Bob Smith", "bob@x.com").await;
        let draft = post_with_status(&store, PostStatus::Draft).await;

        assert!(matches!(
            comments.create_comment(&bob, request(&draft, "Peek", None)).await,
            Err(CustomError::NotFoundError(_))
        ));
        assert!(
            comments
                .create_comment(&jane, request(&draft, "Note to self", None))
                .await
                .is_ok()
        );
    }

    #[actix_web::test]
    async fn lookups_accept_upper_case_ids() {
        let store = Arc::new(MemoryStore::new());
        let comments = service(&store);
        let bob = member(&store, "Bob Smith", "bob@x.com").await;
        let post_id = post(&store).await;
        comments
            .create_comment(&bob, request(&post_id.to_uppercase(), "Shouting", None))
            .await
            .unwrap();

        let upper = post_id.to_uppercase();
        assert_eq!(comments.list_for_post(&upper).await.unwrap().len(), 1);
        assert_eq!(comments.count_for_post(&upper).await.unwrap(), 1);
        assert_eq!(comments.count_for_post(&post_id).await.unwrap(), 1);
    }
}
