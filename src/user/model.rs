use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::user::avatar::Avatar;

pub const DEFAULT_BIO: &str = "Click edit to add your bio";

fn default_bio() -> String {
    DEFAULT_BIO.to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    /// bcrypt hash; absent for accounts created through an OAuth provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub image: Avatar,
    #[serde(default = "default_bio")]
    pub bio: String,
    #[serde(default)]
    pub following: Vec<ObjectId>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl User {
    pub fn id_hex(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }

    pub fn avatar_reference(&self) -> String {
        Avatar::resolve(Some(&self.image), &self.name).reference(&self.id_hex())
    }
}

/// Fields replaced by a profile edit or an OAuth re-sync.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub image: Option<Avatar>,
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct OAuthProfileRequest {
    pub name: String,
    pub email: String,
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub image: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        UserSummary {
            id: user.id_hex(),
            name: user.name.clone(),
            email: user.email.clone(),
            image: user.avatar_reference(),
        }
    }
}

/// Profile as returned by the profile endpoints; carries the inline data URL
/// when the picture is an uploaded blob.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub bio: String,
    pub has_image: bool,
    pub image: String,
    pub image_url: Option<String>,
    pub following: Vec<String>,
}

impl From<&User> for ProfileView {
    fn from(user: &User) -> Self {
        let image_url = user.image.data_url();
        ProfileView {
            id: user.id_hex(),
            name: user.name.clone(),
            email: user.email.clone(),
            bio: user.bio.clone(),
            has_image: true,
            image: image_url.clone().unwrap_or_else(|| user.avatar_reference()),
            image_url,
            following: user.following.iter().map(|id| id.to_hex()).collect(),
        }
    }
}
