use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::utils::helpers::to_chrono;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub post_id: String,
    pub content: String,
    pub author: String,
    pub author_image: String,
    pub author_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_comment_id: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub post_id: Option<String>,
    pub content: Option<String>,
    pub parent_comment_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: String,
    pub post_id: String,
    pub content: String,
    pub author: String,
    pub author_image: String,
    pub author_email: String,
    pub parent_comment_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Comment> for CommentView {
    fn from(comment: &Comment) -> Self {
        CommentView {
            id: comment.id.map(|id| id.to_hex()).unwrap_or_default(),
            post_id: comment.post_id.clone(),
            content: comment.content.clone(),
            author: comment.author.clone(),
            author_image: comment.author_image.clone(),
            author_email: comment.author_email.clone(),
            parent_comment_id: comment.parent_comment_id.clone(),
            created_at: to_chrono(comment.created_at).to_rfc3339(),
            updated_at: to_chrono(comment.updated_at).to_rfc3339(),
        }
    }
}
