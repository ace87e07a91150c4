use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, web};
use futures_util::StreamExt;
use mongodb::bson::oid::ObjectId;
use serde_json::json;

use crate::database::RedisService;
use crate::middleware::auth::{SessionUser, create_token_with_session};
use crate::user::model::{CreateUserRequest, OAuthProfileRequest, ProfileView, UserSummary};
use crate::user::service::{ProfileUpdate, UserService};
use crate::utils::config::AppConfig;
use crate::utils::error::CustomError;
use crate::utils::helpers::{parse_object_id, service_name};
use crate::utils::model::LoginRequests;

/// Largest accepted profile picture.
const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Register a credentials account
/// POST /api/register
pub async fn register_user(
    user_service: web::Data<UserService>,
    user_info: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, CustomError> {
    let user = user_service.create_user(user_info.into_inner()).await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "User created successfully",
        "httpStatusCode": 201,
        "service": service_name(),
        "user": UserSummary::from(&user),
    })))
}

/// POST /api/auth/login
pub async fn login_user(
    user_service: web::Data<UserService>,
    config: web::Data<AppConfig>,
    redis: Option<web::Data<RedisService>>,
    login_info: web::Json<LoginRequests>,
) -> Result<HttpResponse, CustomError> {
    let user = user_service
        .authenticate_user(&login_info.email, &login_info.password)
        .await?;
    let registry = redis.as_ref().map(|r| r.get_ref());
    let token = create_token_with_session(&user, &config, registry).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Login successful",
        "httpStatusCode": 200,
        "token": token,
        "user": UserSummary::from(&user),
    })))
}

/// POST /api/auth/logout
pub async fn logout_user(
    session: SessionUser,
    redis: Option<web::Data<RedisService>>,
) -> Result<HttpResponse, CustomError> {
    if let Some(redis) = redis {
        redis
            .invalidate_session(&session.id.to_hex())
            .await
            .map_err(CustomError::InternalServerError)?;
    }

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Logged out successfully",
        "httpStatusCode": 200,
    })))
}

/// Profile hand-over from the OAuth front end
/// POST /api/auth/oauth
pub async fn oauth_sign_in(
    req: HttpRequest,
    user_service: web::Data<UserService>,
    config: web::Data<AppConfig>,
    redis: Option<web::Data<RedisService>>,
    profile: web::Json<OAuthProfileRequest>,
) -> Result<HttpResponse, CustomError> {
    let Some(expected) = config.oauth_bridge_secret.as_deref() else {
        return Err(CustomError::NotFoundError("Route does not exist".into()));
    };
    let presented = req
        .headers()
        .get("X-Bridge-Secret")
        .and_then(|v| v.to_str().ok());
    if presented != Some(expected) {
        return Err(CustomError::UnauthenticatedError(
            "Invalid bridge secret".into(),
        ));
    }

    let user = user_service
        .sync_oauth_user(&profile.name, &profile.email, profile.image.as_deref())
        .await?;
    let registry = redis.as_ref().map(|r| r.get_ref());
    let token = create_token_with_session(&user, &config, registry).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Signed in",
        "httpStatusCode": 200,
        "token": token,
        "user": UserSummary::from(&user),
    })))
}

/// GET /api/profile
pub async fn get_profile(
    session: SessionUser,
    user_service: web::Data<UserService>,
) -> Result<HttpResponse, CustomError> {
    let user = user_service.get_user(&session.id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Profile fetched successfully",
        "httpStatusCode": 200,
        "user": ProfileView::from(&user),
    })))
}

/// Read the `name`, `bio` and `image` parts of the profile form
async fn read_profile_form(mut payload: Multipart) -> Result<ProfileUpdate, CustomError> {
    let mut update = ProfileUpdate::default();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| {
            CustomError::BadRequestError(format!("Error reading multipart field: {}", e))
        })?;

        let field_name = match field.content_disposition().and_then(|cd| cd.get_name()) {
            Some(name) => name.to_string(),
            None => continue,
        };
        let content_type = field.content_type().map(|ct| ct.to_string());

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| {
                CustomError::BadRequestError(format!("Error reading form data: {}", e))
            })?;
            if data.len() + chunk.len() > MAX_IMAGE_BYTES {
                return Err(CustomError::ValidationError(
                    "Image must be at most 5 MB".into(),
                ));
            }
            data.extend_from_slice(&chunk);
        }

        match field_name.as_str() {
            "name" => update.name = Some(String::from_utf8_lossy(&data).into_owned()),
            "bio" => update.bio = Some(String::from_utf8_lossy(&data).into_owned()),
            "image" if !data.is_empty() => {
                let content_type =
                    content_type.unwrap_or_else(|| "application/octet-stream".to_string());
                if !content_type.starts_with("image/") {
                    return Err(CustomError::ValidationError(
                        "Profile picture must be an image".into(),
                    ));
                }
                update.image = Some((data, content_type));
            }
            _ => {}
        }
    }

    Ok(update)
}

/// POST /api/profile/update
pub async fn update_profile(
    session: SessionUser,
    user_service: web::Data<UserService>,
    payload: Multipart,
) -> Result<HttpResponse, CustomError> {
    let update = read_profile_form(payload).await?;
    let user = user_service.update_profile(&session.email, update).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Profile updated successfully",
        "httpStatusCode": 200,
        "user": ProfileView::from(&user),
    })))
}

/// GET /api/users/{id}/image
pub async fn get_user_image(
    user_service: web::Data<UserService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let id = parse_object_id(&path.into_inner(), "user")?;
    let (data, content_type) = user_service.stored_image(&id).await?;

    Ok(HttpResponse::Ok().content_type(content_type).body(data))
}

/// POST /api/users/{id}/follow
pub async fn follow_user(
    session: SessionUser,
    user_service: web::Data<UserService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let target: ObjectId = parse_object_id(&path.into_inner(), "user")?;
    let added = user_service.follow(&session.id, &target).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": if added { "User followed" } else { "Already following" },
        "httpStatusCode": 200,
    })))
}

/// DELETE /api/users/{id}/follow
pub async fn unfollow_user(
    session: SessionUser,
    user_service: web::Data<UserService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let target = parse_object_id(&path.into_inner(), "user")?;
    let removed = user_service.unfollow(&session.id, &target).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": if removed { "User unfollowed" } else { "Not following" },
        "httpStatusCode": 200,
    })))
}
