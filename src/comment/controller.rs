use crate::comment::model::{CommentView, CreateCommentRequest};
use crate::comment::service::CommentService;
use crate::middleware::auth::SessionUser;
use crate::utils::error::CustomError;
use crate::utils::model::PostIdQuery;
use actix_web::{HttpResponse, web};
use serde_json::json;

fn required_post_id(query: &PostIdQuery) -> Result<&str, CustomError> {
    query
        .post_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| CustomError::BadRequestError("Post ID is required".to_string()))
}

/// Comments of a post, newest first
/// GET /api/comments?postId=
pub async fn get_post_comments(
    comment_service: web::Data<CommentService>,
    query: web::Query<PostIdQuery>,
) -> Result<HttpResponse, CustomError> {
    let post_id = required_post_id(&query)?;
    let comments = comment_service.list_for_post(post_id).await?;
    let views: Vec<CommentView> = comments.iter().map(CommentView::from).collect();

    Ok(HttpResponse::Ok().json(views))
}

/// GET /api/comments/count?postId=
pub async fn get_comment_count(
    comment_service: web::Data<CommentService>,
    query: web::Query<PostIdQuery>,
) -> Result<HttpResponse, CustomError> {
    let post_id = required_post_id(&query)?;
    let count = comment_service.count_for_post(post_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "httpStatusCode": 200,
        "postId": post_id,
        "count": count
    })))
}

/// POST /api/comments
pub async fn create_comment(
    session: SessionUser,
    comment_service: web::Data<CommentService>,
    body: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse, CustomError> {
    let comment = comment_service
        .create_comment(&session, body.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Comment created successfully",
        "httpStatusCode": 201,
        "comment": CommentView::from(&comment)
    })))
}
