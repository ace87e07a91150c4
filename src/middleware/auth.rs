use std::future::Future;
use std::pin::Pin;

use actix_web::dev::{Payload, ServiceRequest};
use actix_web::http::header::Header;
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest, web};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};
use jsonwebtoken::{DecodingKey, EncodingKey, Header as JwtHeader, Validation, decode, encode};
use log::warn;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::database::RedisService;
use crate::user::model::User;
use crate::utils::config::AppConfig;
use crate::utils::error::CustomError;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub id: String,
    pub email: String,
    pub name: String,
    pub exp: usize,
}

/// The signed-in caller, resolved from the bearer token.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub id: ObjectId,
    pub email: String,
    pub name: String,
}

impl TryFrom<Claims> for SessionUser {
    type Error = CustomError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id = ObjectId::parse_str(&claims.id)
            .map_err(|_| CustomError::UnauthenticatedError("Invalid user id in token".into()))?;
        Ok(SessionUser {
            id,
            email: claims.email,
            name: claims.name,
        })
    }
}

/// Create a signed session token for `user`
pub fn create_token(user: &User, config: &AppConfig) -> Result<String, CustomError> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::seconds(
            config.session_max_age_secs as i64,
        ))
        .ok_or_else(|| CustomError::InternalServerError("token expiry overflow".into()))?
        .timestamp() as usize;

    let claims = Claims {
        id: user.id_hex(),
        email: user.email.clone(),
        name: user.name.clone(),
        exp: expiration,
    };

    encode(
        &JwtHeader::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| CustomError::InternalServerError(format!("Token generation failed: {}", e)))
}

/// Create a token and register it in Redis when a registry is configured
pub async fn create_token_with_session(
    user: &User,
    config: &AppConfig,
    redis_service: Option<&RedisService>,
) -> Result<String, CustomError> {
    let token = create_token(user, config)?;

    if let Some(redis) = redis_service {
        redis
            .store_session(&user.id_hex(), &token, config.session_max_age_secs)
            .await
            .map_err(CustomError::InternalServerError)?;
    }

    Ok(token)
}

/// Decode the JWT and, when Redis is available, check the session was not revoked.
pub async fn validate_token(
    token: &str,
    config: &AppConfig,
    redis_service: Option<&RedisService>,
) -> Result<Claims, CustomError> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| CustomError::UnauthenticatedError("Invalid token".into()))?
    .claims;

    let Some(redis) = redis_service else {
        return Ok(claims);
    };

    match redis.validate_session(token).await {
        Ok(Some(stored_user_id)) if stored_user_id == claims.id => Ok(claims),
        Ok(Some(_)) => Err(CustomError::UnauthenticatedError("Session mismatch".into())),
        Ok(None) => Err(CustomError::UnauthenticatedError(
            "Session expired or invalid".into(),
        )),
        Err(e) => {
            // registry unreachable: the signature check alone decides
            warn!("session registry unavailable, trusting JWT: {}", e);
            Ok(claims)
        }
    }
}

/// Bearer middleware for scopes where every route needs a session
pub async fn verify_token(
    req: ServiceRequest,
    credentials: BearerAuth,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let Some(config) = req.app_data::<web::Data<AppConfig>>().cloned() else {
        return Err((
            CustomError::InternalServerError("AppConfig missing from app data".into()).into(),
            req,
        ));
    };
    let redis = req.app_data::<web::Data<RedisService>>().cloned();
    let registry = redis.as_ref().map(|r| r.get_ref());

    match validate_token(credentials.token(), &config, registry).await {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            Ok(req)
        }
        Err(e) => Err((e.into(), req)),
    }
}

async fn session_from_request(req: HttpRequest) -> Result<SessionUser, CustomError> {
    if let Some(claims) = req.extensions().get::<Claims>().cloned() {
        return SessionUser::try_from(claims);
    }

    let header = Authorization::<Bearer>::parse(&req)
        .map_err(|_| CustomError::UnauthenticatedError("Not authenticated".into()))?;
    let config = req
        .app_data::<web::Data<AppConfig>>()
        .cloned()
        .ok_or_else(|| CustomError::InternalServerError("AppConfig missing from app data".into()))?;
    let redis = req.app_data::<web::Data<RedisService>>().cloned();
    let registry = redis.as_ref().map(|r| r.get_ref());

    let claims = validate_token(header.as_ref().token(), &config, registry).await?;
    SessionUser::try_from(claims)
}

impl FromRequest for SessionUser {
    type Error = CustomError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        Box::pin(session_from_request(req.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::avatar::letter_avatar;
    use mongodb::bson::DateTime;

    fn user() -> User {
        User {
            id: Some(ObjectId::new()),
            name: "Jane Doe".into(),
            email: "jane@x.com".into(),
            password: None,
            image: letter_avatar("Jane Doe"),
            bio: String::new(),
            following: Vec::new(),
            created_at: DateTime::now(),
            updated_at: DateTime::now(),
        }
    }

    #[actix_web::test]
    async fn issued_tokens_validate() {
        let config = AppConfig::for_tests();
        let user = user();
        let token = create_token(&user, &config).unwrap();

        let claims = validate_token(&token, &config, None).await.unwrap();
        assert_eq!(claims.email, "jane@x.com");
        assert_eq!(claims.id, user.id_hex());
    }

    #[actix_web::test]
    async fn foreign_signature_is_rejected() {
        let config = AppConfig::for_tests();
        let token = create_token(&user(), &config).unwrap();

        let mut other = AppConfig::for_tests();
        other.jwt_secret = "another-secret".into();
        assert!(matches!(
            validate_token(&token, &other, None).await,
            Err(CustomError::UnauthenticatedError(_))
        ));
    }
}
