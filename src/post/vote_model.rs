use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// One user's upvote on one post. `(user_id, post_id)` is unique.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Vote {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub post_id: ObjectId,
    pub created_at: DateTime,
}

impl Vote {
    pub fn new(user_id: ObjectId, post_id: ObjectId) -> Self {
        Vote {
            id: None,
            user_id,
            post_id,
            created_at: DateTime::now(),
        }
    }
}
