use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::utils::helpers::{short_date, to_chrono};

pub const DEFAULT_CATEGORY: &str = "Real Estate Investing";
pub const MAX_TITLE_LENGTH: usize = 100;
pub const MIN_CONTENT_LENGTH: usize = 50;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    #[default]
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub content: String,
    pub author: String,
    pub author_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_image: Option<String>,
    pub date: DateTime,
    #[serde(default)]
    pub votes: i64,
    #[serde(default)]
    pub comments: i64,
    #[serde(default)]
    pub commenters: Vec<String>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub status: PostStatus,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Post {
    pub fn is_owned_by(&self, email: &str) -> bool {
        self.author_email == email
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostSort {
    VotesDesc,
    CreatedDesc,
    UpdatedDesc,
}

/// Filter, order and limit for a post listing.
#[derive(Debug, Clone)]
pub struct PostQuery {
    pub status: Option<PostStatus>,
    pub author_emails: Option<Vec<String>>,
    pub sort: PostSort,
    pub limit: Option<i64>,
}

impl PostQuery {
    pub fn published(sort: PostSort, limit: Option<i64>) -> Self {
        PostQuery {
            status: Some(PostStatus::Published),
            author_emails: None,
            sort,
            limit,
        }
    }
}

/// Fields a post owner may change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub status: Option<PostStatus>,
}

impl PostChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.category.is_none()
            && self.tags.is_none()
            && self.images.is_none()
            && self.status.is_none()
    }
}

#[derive(Deserialize)]
pub struct CreatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub status: Option<PostStatus>,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub page: Option<i64>,
}

/// Transport shape of a post in every listing.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: String,
    pub author_email: String,
    pub author_image: String,
    pub date: String,
    pub votes: i64,
    pub comments: i64,
    pub commenters: Vec<String>,
    pub category: String,
    pub tags: Vec<String>,
    pub images: Vec<String>,
    pub status: PostStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Post> for PostView {
    fn from(post: &Post) -> Self {
        PostView {
            id: post.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: post.title.clone(),
            content: post.content.clone(),
            author: post.author.clone(),
            author_email: post.author_email.clone(),
            author_image: post.author_image.clone().unwrap_or_default(),
            date: short_date(post.date),
            votes: post.votes,
            comments: post.comments,
            commenters: post.commenters.clone(),
            category: post.category.clone(),
            tags: post.tags.clone(),
            images: post.images.clone(),
            status: post.status,
            created_at: to_chrono(post.created_at).to_rfc3339(),
            updated_at: to_chrono(post.updated_at).to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteView {
    pub votes: i64,
    pub user_voted: bool,
}
