use std::sync::Arc;

use log::{info, warn};
use mongodb::bson::{DateTime, oid::ObjectId};

use crate::database::repository::UserRepository;
use crate::user::avatar::{Avatar, letter_avatar};
use crate::user::model::{CreateUserRequest, DEFAULT_BIO, ProfileChanges, User};
use crate::utils::error::CustomError;
use crate::utils::hashing;
use crate::utils::validation::{require, validate_email, validate_password};

/// Data of a profile edit form.
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub image: Option<(Vec<u8>, String)>,
}

pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        UserService { users }
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> Result<User, CustomError> {
        let missing = "All fields are required";
        let name = require(request.name.as_deref(), missing)?.to_string();
        let email = require(request.email.as_deref(), missing)?.to_lowercase();
        let password = request
            .password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| CustomError::ValidationError(missing.into()))?;

        validate_email(&email)?;
        validate_password(password)?;

        if self.users.find_by_email(&email).await?.is_some() {
            warn!("registration rejected, email taken: {}", email);
            return Err(CustomError::ValidationError(
                "User already exists".to_string(),
            ));
        }

        let hashed_password = hashing::hash_password(password)?;

        let now = DateTime::now();
        let new_user = User {
            id: None,
            image: letter_avatar(&name),
            name,
            email,
            password: Some(hashed_password),
            bio: DEFAULT_BIO.to_string(),
            following: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        // the unique index still guards concurrent registrations
        let user = self.users.insert_user(new_user).await?;
        info!("user registered: {}", user.id_hex());
        Ok(user)
    }

    pub async fn authenticate_user(&self, email: &str, password: &str) -> Result<User, CustomError> {
        let invalid = || CustomError::UnauthenticatedError("Invalid credentials".to_string());

        let user = self
            .users
            .find_by_email(&email.trim().to_lowercase())
            .await?
            .ok_or_else(invalid)?;

        // OAuth accounts have no password to check against
        let Some(hash) = user.password.as_deref() else {
            return Err(invalid());
        };

        if !hashing::verify_password(password, hash)? {
            warn!("password mismatch for {}", user.id_hex());
            return Err(invalid());
        }

        Ok(user)
    }

    /// First sign-in through a provider creates the account; later sign-ins
    /// copy over a changed name or picture.
    pub async fn sync_oauth_user(
        &self,
        name: &str,
        email: &str,
        image: Option<&str>,
    ) -> Result<User, CustomError> {
        let email = email.trim().to_lowercase();
        validate_email(&email)?;
        let avatar = image
            .filter(|i| !i.is_empty())
            .map(Avatar::from_provider_image);

        if let Some(existing) = self.users.find_by_email(&email).await? {
            let name_changed = existing.name != name;
            let image_changed = avatar.as_ref().is_some_and(|a| *a != existing.image);
            if !name_changed && !image_changed {
                return Ok(existing);
            }

            let changes = ProfileChanges {
                name: Some(name.to_string()),
                bio: None,
                image: avatar,
            };
            info!("syncing provider profile for {}", existing.id_hex());
            return self
                .users
                .update_profile(&email, &changes)
                .await?
                .ok_or_else(|| CustomError::NotFoundError("User not found".into()));
        }

        let now = DateTime::now();
        let user = User {
            id: None,
            name: name.to_string(),
            email,
            password: None,
            image: avatar.unwrap_or_else(|| letter_avatar(name)),
            bio: DEFAULT_BIO.to_string(),
            following: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        let user = self.users.insert_user(user).await?;
        info!("user created from provider sign-in: {}", user.id_hex());
        Ok(user)
    }

    pub async fn get_user(&self, id: &ObjectId) -> Result<User, CustomError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| CustomError::NotFoundError("User not found".into()))
    }

    pub async fn update_profile(
        &self,
        email: &str,
        update: ProfileUpdate,
    ) -> Result<User, CustomError> {
        let name = update
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let image = match (update.image, &name) {
            (Some((data, content_type)), _) => Some(Avatar::Stored { data, content_type }),
            (None, Some(name)) => Some(letter_avatar(name)),
            (None, None) => None,
        };

        let changes = ProfileChanges {
            name,
            bio: update.bio,
            image,
        };

        self.users
            .update_profile(email, &changes)
            .await?
            .ok_or_else(|| CustomError::NotFoundError("User not found".into()))
    }

    pub async fn follow(&self, user: &ObjectId, target: &ObjectId) -> Result<bool, CustomError> {
        if user == target {
            return Err(CustomError::BadRequestError(
                "You cannot follow yourself".into(),
            ));
        }
        self.get_user(target).await?;

        let added = self.users.add_following(user, target).await?;
        if added {
            info!("{} now follows {}", user.to_hex(), target.to_hex());
        }
        Ok(added)
    }

    pub async fn unfollow(&self, user: &ObjectId, target: &ObjectId) -> Result<bool, CustomError> {
        self.users.remove_following(user, target).await
    }

    /// Bytes and content type of an uploaded picture.
    pub async fn stored_image(&self, id: &ObjectId) -> Result<(Vec<u8>, String), CustomError> {
        match self.get_user(id).await?.image {
            Avatar::Stored { data, content_type } => Ok((data, content_type)),
            _ => Err(CustomError::NotFoundError("Image not found".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    fn service() -> UserService {
        UserService::new(Arc::new(MemoryStore::new()))
    }

    fn request(name: &str, email: &str, password: &str) -> CreateUserRequest {
        CreateUserRequest {
            name: Some(name.into()),
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }

    #[actix_web::test]
    async fn registration_assigns_letter_avatar() {
        let users = service();
        let user = users
            .create_user(request("Jane Doe", "jane@x.com", "secret1"))
            .await
            .unwrap();

        assert_eq!(user.avatar_reference(), "letter-avatar:JD:#e74c3c");
        assert_ne!(user.password.as_deref(), Some("secret1"));
    }

    #[actix_web::test]
    async fn duplicate_email_is_a_validation_error() {
        let users = service();
        users
            .create_user(request("Jane Doe", "jane@x.com", "secret1"))
            .await
            .unwrap();

        let err = users
            .create_user(request("Other Jane", "JANE@x.com", "secret2"))
            .await
            .unwrap_err();
        assert!(matches!(err, CustomError::ValidationError(m) if m == "User already exists"));
    }

    #[actix_web::test]
    async fn short_password_and_missing_fields() {
        let users = service();
        assert!(matches!(
            users.create_user(request("Jane", "jane@x.com", "12345")).await,
            Err(CustomError::ValidationError(_))
        ));
        assert!(matches!(
            users.create_user(request("", "jane@x.com", "secret1")).await,
            Err(CustomError::ValidationError(_))
        ));
    }

    #[actix_web::test]
    async fn wrong_password_is_unauthenticated() {
        let users = service();
        users
            .create_user(request("Jane Doe", "jane@x.com", "secret1"))
            .await
            .unwrap();

        assert!(users.authenticate_user("jane@x.com", "secret1").await.is_ok());
        assert!(matches!(
            users.authenticate_user("jane@x.com", "wrong").await,
            Err(CustomError::UnauthenticatedError(_))
        ));
        assert!(matches!(
            users.authenticate_user("nobody@x.com", "secret1").await,
            Err(CustomError::UnauthenticatedError(_))
        ));
    }

    #[actix_web::test]
    async fn oauth_sign_in_creates_then_syncs() {
        let users = service();
        let first = users
            .sync_oauth_user("Jane", "jane@x.com", Some("https://g.co/a.png"))
            .await
            .unwrap();
        assert!(first.password.is_none());

        let again = users
            .sync_oauth_user("Jane Doe", "jane@x.com", Some("https://g.co/b.png"))
            .await
            .unwrap();
        assert_eq!(again.id, first.id);
        assert_eq!(again.name, "Jane Doe");
        assert_eq!(
            again.image,
            Avatar::Linked {
                url: "https://g.co/b.png".into()
            }
        );

        // password-less accounts cannot use credentials sign-in
        assert!(users.authenticate_user("jane@x.com", "").await.is_err());
    }

    #[actix_web::test]
    async fn profile_update_without_picture_regenerates_letters() {
        let users = service();
        users
            .create_user(request("Jane Doe", "jane@x.com", "secret1"))
            .await
            .unwrap();

        let updated = users
            .update_profile(
                "jane@x.com",
                ProfileUpdate {
                    name: Some("Alice".into()),
                    bio: Some("hello".into()),
                    image: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.image, letter_avatar("Alice"));
        assert_eq!(updated.bio, "hello");

        let with_picture = users
            .update_profile(
                "jane@x.com",
                ProfileUpdate {
                    image: Some((vec![1, 2], "image/png".into())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(with_picture.image.is_stored());
        assert_eq!(with_picture.name, "Alice");

        let id = with_picture.id.unwrap();
        assert_eq!(
            users.stored_image(&id).await.unwrap(),
            (vec![1, 2], "image/png".to_string())
        );
    }

    #[actix_web::test]
    async fn following_is_set_like() {
        let users = service();
        let jane = users
            .create_user(request("Jane Doe", "jane@x.com", "secret1"))
            .await
            .unwrap();
        let bob = users
            .create_user(request("Bob Smith", "bob@x.com", "secret1"))
            .await
            .unwrap();
        let (jane_id, bob_id) = (jane.id.unwrap(), bob.id.unwrap());

        assert!(users.follow(&jane_id, &bob_id).await.unwrap());
        assert!(!users.follow(&jane_id, &bob_id).await.unwrap());
        assert_eq!(users.get_user(&jane_id).await.unwrap().following, vec![bob_id]);
        assert!(users.follow(&jane_id, &jane_id).await.is_err());
        assert!(matches!(
            users.follow(&jane_id, &ObjectId::new()).await,
            Err(CustomError::NotFoundError(_))
        ));

        assert!(users.unfollow(&jane_id, &bob_id).await.unwrap());
        assert!(users.get_user(&jane_id).await.unwrap().following.is_empty());
    }
}
