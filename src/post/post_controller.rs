use actix_web::{HttpResponse, web};
use serde_json::json;

use crate::middleware::auth::SessionUser;
use crate::post::post_model::{
    CreatePostRequest, PostChanges, PostSort, PostStatus, PostView, SearchQuery,
};
use crate::post::post_service::{LIST_LIMIT, PostService};
use crate::utils::error::CustomError;
use crate::utils::helpers::service_name;

/// POST /api/posts/create
pub async fn create_post(
    session: SessionUser,
    post_service: web::Data<PostService>,
    body: web::Json<CreatePostRequest>,
) -> Result<HttpResponse, CustomError> {
    let post = post_service.create_post(&session, body.into_inner()).await?;
    let redirect = match post.status {
        PostStatus::Published => "/",
        PostStatus::Draft => "/my-drafts",
    };

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Post created successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "post": PostView::from(&post),
        "redirect": redirect,
    })))
}

/// GET /api/posts/{id}
pub async fn get_post(
    session: Option<SessionUser>,
    post_service: web::Data<PostService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let post = post_service
        .get_post(session.as_ref(), &path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Post fetched successfully",
        "httpStatusCode": 200,
        "post": PostView::from(&post),
    })))
}

/// PATCH /api/posts/{id}
pub async fn update_post(
    session: SessionUser,
    post_service: web::Data<PostService>,
    path: web::Path<String>,
    body: web::Json<PostChanges>,
) -> Result<HttpResponse, CustomError> {
    let post = post_service
        .update_post(&session, &path.into_inner(), body.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Post updated successfully",
        "httpStatusCode": 200,
        "post": PostView::from(&post),
    })))
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    session: SessionUser,
    post_service: web::Data<PostService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    post_service.delete_post(&session, &path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Post deleted successfully",
        "httpStatusCode": 200,
    })))
}

/// POST /api/posts/{id}/upvotes
pub async fn upvote_post(
    session: SessionUser,
    post_service: web::Data<PostService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let votes = post_service.upvote(&session, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(votes))
}

/// GET /api/posts/{id}/upvotes
pub async fn get_upvotes(
    session: Option<SessionUser>,
    post_service: web::Data<PostService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let votes = post_service
        .vote_status(session.as_ref(), &path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(votes))
}

async fn listing(
    post_service: &PostService,
    sort: PostSort,
    limit: Option<i64>,
) -> Result<HttpResponse, CustomError> {
    let posts = post_service.list_posts(sort, limit).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// GET /api/posts
pub async fn get_all_posts(
    post_service: web::Data<PostService>,
) -> Result<HttpResponse, CustomError> {
    listing(&post_service, PostSort::UpdatedDesc, None).await
}

/// GET /api/posts/popular
pub async fn get_popular_posts(
    post_service: web::Data<PostService>,
) -> Result<HttpResponse, CustomError> {
    listing(&post_service, PostSort::VotesDesc, Some(LIST_LIMIT)).await
}

/// GET /api/posts/newest
pub async fn get_newest_posts(
    post_service: web::Data<PostService>,
) -> Result<HttpResponse, CustomError> {
    listing(&post_service, PostSort::CreatedDesc, Some(LIST_LIMIT)).await
}

/// GET /api/posts/regular
pub async fn get_regular_posts(
    post_service: web::Data<PostService>,
) -> Result<HttpResponse, CustomError> {
    listing(&post_service, PostSort::UpdatedDesc, Some(LIST_LIMIT)).await
}

/// GET /api/posts/following
pub async fn get_following_posts(
    session: Option<SessionUser>,
    post_service: web::Data<PostService>,
) -> Result<HttpResponse, CustomError> {
    let (source, posts) = post_service.following(session.as_ref()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "source": source,
        "posts": posts,
    })))
}

/// GET /api/posts/drafts
pub async fn get_drafts(
    session: SessionUser,
    post_service: web::Data<PostService>,
) -> Result<HttpResponse, CustomError> {
    let drafts = post_service.drafts(&session).await?;
    Ok(HttpResponse::Ok().json(drafts))
}

/// GET /api/posts/search?search=&category=&page=
pub async fn search_posts(
    post_service: web::Data<PostService>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, CustomError> {
    let page = post_service.search(&query).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// GET /api/categories
pub async fn get_categories(
    post_service: web::Data<PostService>,
) -> Result<HttpResponse, CustomError> {
    let categories = post_service.categories().await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "httpStatusCode": 200,
        "categories": categories,
    })))
}
