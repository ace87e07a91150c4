use async_trait::async_trait;
use futures_util::TryStreamExt;
use log::info;
use mongodb::bson::{Bson, DateTime, Document, doc, oid::ObjectId};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, IndexModel};

use crate::comment::model::Comment;
use crate::database::repository::{
    CommentRepository, PostRepository, UserRepository, VoteRepository,
};
use crate::post::post_model::{Post, PostChanges, PostQuery, PostSort};
use crate::post::vote_model::Vote;
use crate::user::model::{ProfileChanges, User};
use crate::utils::error::CustomError;

const DUPLICATE_KEY: i32 = 11000;

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY
    )
}

fn inserted_object_id(id: &Bson) -> Result<ObjectId, CustomError> {
    id.as_object_id().ok_or_else(|| {
        CustomError::InternalServerError("Failed to get inserted ID".to_string())
    })
}

/// All four collections of the forum in one MongoDB database.
#[derive(Clone)]
pub struct MongoStore {
    posts: Collection<Post>,
    comments: Collection<Comment>,
    users: Collection<User>,
    votes: Collection<Vote>,
}

impl MongoStore {
    pub fn new(client: &Client, database: &str) -> Self {
        let db = client.database(database);
        MongoStore {
            posts: db.collection::<Post>("posts"),
            comments: db.collection::<Comment>("comments"),
            users: db.collection::<User>("users"),
            votes: db.collection::<Vote>("votes"),
        }
    }

    pub async fn ensure_indexes(&self) -> Result<(), CustomError> {
        let unique = || IndexOptions::builder().unique(true).build();

        self.users
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "email": 1 })
                    .options(unique())
                    .build(),
            )
            .await?;
        self.votes
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "user_id": 1, "post_id": 1 })
                    .options(unique())
                    .build(),
            )
            .await?;
        self.comments
            .create_index(IndexModel::builder().keys(doc! { "postId": 1 }).build())
            .await?;

        info!("MongoDB indexes ensured");
        Ok(())
    }
}

fn post_filter(query: &PostQuery) -> Document {
    let mut filter = doc! {};
    if let Some(status) = query.status {
        filter.insert("status", status.as_str());
    }
    if let Some(emails) = &query.author_emails {
        filter.insert("authorEmail", doc! { "$in": emails.clone() });
    }
    filter
}

fn post_sort(sort: PostSort) -> Document {
    match sort {
        PostSort::VotesDesc => doc! { "votes": -1, "createdAt": -1 },
        PostSort::CreatedDesc => doc! { "createdAt": -1 },
        PostSort::UpdatedDesc => doc! { "updatedAt": -1 },
    }
}

fn post_changes(changes: &PostChanges) -> Document {
    let mut set = doc! { "updatedAt": DateTime::now() };
    if let Some(title) = &changes.title {
        set.insert("title", title.clone());
    }
    if let Some(content) = &changes.content {
        set.insert("content", content.clone());
    }
    if let Some(category) = &changes.category {
        set.insert("category", category.clone());
    }
    if let Some(tags) = &changes.tags {
        set.insert("tags", tags.clone());
    }
    if let Some(images) = &changes.images {
        set.insert("images", images.clone());
    }
    if let Some(status) = changes.status {
        set.insert("status", status.as_str());
    }
    set
}

#[async_trait]
impl PostRepository for MongoStore {
    async fn insert_post(&self, mut post: Post) -> Result<Post, CustomError> {
        let result = self.posts.insert_one(&post).await?;
        post.id = Some(inserted_object_id(&result.inserted_id)?);
        Ok(post)
    }

    async fn find_post(&self, id: &ObjectId) -> Result<Option<Post>, CustomError> {
        Ok(self.posts.find_one(doc! { "_id": id }).await?)
    }

    async fn list_posts(&self, query: &PostQuery) -> Result<Vec<Post>, CustomError> {
        let mut find = self
            .posts
            .find(post_filter(query))
            .sort(post_sort(query.sort));
        if let Some(limit) = query.limit {
            find = find.limit(limit);
        }

        let cursor = find.await?;
        Ok(cursor.try_collect().await?)
    }

    async fn update_post(
        &self,
        id: &ObjectId,
        changes: &PostChanges,
    ) -> Result<Option<Post>, CustomError> {
        Ok(self
            .posts
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": post_changes(changes) })
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn delete_post(&self, id: &ObjectId) -> Result<bool, CustomError> {
        let result = self.posts.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn increment_votes(
        &self,
        id: &ObjectId,
        delta: i64,
    ) -> Result<Option<Post>, CustomError> {
        Ok(self
            .posts
            .find_one_and_update(
                doc! { "_id": id },
                doc! {
                    "$inc": { "votes": delta },
                    "$set": { "updatedAt": DateTime::now() },
                },
            )
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn record_comment(
        &self,
        id: &ObjectId,
        commenter: &str,
    ) -> Result<Option<Post>, CustomError> {
        Ok(self
            .posts
            .find_one_and_update(
                doc! { "_id": id },
                doc! {
                    "$inc": { "comments": 1 },
                    "$addToSet": { "commenters": commenter },
                    "$set": { "updatedAt": DateTime::now() },
                },
            )
            .return_document(ReturnDocument::After)
            .await?)
    }
}

#[async_trait]
impl CommentRepository for MongoStore {
    async fn insert_comment(&self, mut comment: Comment) -> Result<Comment, CustomError> {
        let result = self.comments.insert_one(&comment).await?;
        comment.id = Some(inserted_object_id(&result.inserted_id)?);
        Ok(comment)
    }

    async fn find_comment(&self, id: &ObjectId) -> Result<Option<Comment>, CustomError> {
        Ok(self.comments.find_one(doc! { "_id": id }).await?)
    }

    async fn comments_for_post(&self, post_id: &str) -> Result<Vec<Comment>, CustomError> {
        let cursor = self
            .comments
            .find(doc! { "postId": post_id })
            .sort(doc! { "createdAt": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn count_for_post(&self, post_id: &str) -> Result<u64, CustomError> {
        Ok(self
            .comments
            .count_documents(doc! { "postId": post_id })
            .await?)
    }

    async fn delete_comment(&self, id: &ObjectId) -> Result<bool, CustomError> {
        let result = self.comments.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn delete_comments_for_post(&self, post_id: &str) -> Result<u64, CustomError> {
        let result = self
            .comments
            .delete_many(doc! { "postId": post_id })
            .await?;
        Ok(result.deleted_count)
    }
}

#[async_trait]
impl UserRepository for MongoStore {
    async fn insert_user(&self, mut user: User) -> Result<User, CustomError> {
        let result = self.users.insert_one(&user).await.map_err(|e| {
            if is_duplicate_key(&e) {
                CustomError::ValidationError("User already exists".to_string())
            } else {
                CustomError::from(e)
            }
        })?;
        user.id = Some(inserted_object_id(&result.inserted_id)?);
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, CustomError> {
        Ok(self.users.find_one(doc! { "email": email }).await?)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, CustomError> {
        Ok(self.users.find_one(doc! { "_id": id }).await?)
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<User>, CustomError> {
        let cursor = self
            .users
            .find(doc! { "_id": { "$in": ids.to_vec() } })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn update_profile(
        &self,
        email: &str,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, CustomError> {
        let mut set = doc! { "updatedAt": DateTime::now() };
        if let Some(name) = &changes.name {
            set.insert("name", name.clone());
        }
        if let Some(bio) = &changes.bio {
            set.insert("bio", bio.clone());
        }
        if let Some(image) = &changes.image {
            set.insert("image", Bson::from(image.clone()));
        }

        Ok(self
            .users
            .find_one_and_update(doc! { "email": email }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn add_following(
        &self,
        user: &ObjectId,
        target: &ObjectId,
    ) -> Result<bool, CustomError> {
        let result = self
            .users
            .update_one(
                doc! { "_id": user },
                doc! { "$addToSet": { "following": target } },
            )
            .await?;
        Ok(result.modified_count > 0)
    }

    async fn remove_following(
        &self,
        user: &ObjectId,
        target: &ObjectId,
    ) -> Result<bool, CustomError> {
        let result = self
            .users
            .update_one(
                doc! { "_id": user },
                doc! { "$pull": { "following": target } },
            )
            .await?;
        Ok(result.modified_count > 0)
    }
}

#[async_trait]
impl VoteRepository for MongoStore {
    async fn insert_vote(&self, vote: Vote) -> Result<bool, CustomError> {
        match self.votes.insert_one(&vote).await {
            Ok(_) => Ok(true),
            Err(e) if is_duplicate_key(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn has_voted(&self, user: &ObjectId, post: &ObjectId) -> Result<bool, CustomError> {
        let count = self
            .votes
            .count_documents(doc! { "user_id": user, "post_id": post })
            .await?;
        Ok(count > 0)
    }

    async fn delete_vote(&self, user: &ObjectId, post: &ObjectId) -> Result<bool, CustomError> {
        let result = self
            .votes
            .delete_one(doc! { "user_id": user, "post_id": post })
            .await?;
        Ok(result.deleted_count > 0)
    }

    async fn delete_votes_for_post(&self, post: &ObjectId) -> Result<u64, CustomError> {
        let result = self.votes.delete_many(doc! { "post_id": post }).await?;
        Ok(result.deleted_count)
    }
}
