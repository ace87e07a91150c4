use super::controller::{create_comment, get_comment_count, get_post_comments};
use actix_web::web;

pub fn comment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/comments")
            .route("", web::get().to(get_post_comments))
            .route("", web::post().to(create_comment))
            .route("/count", web::get().to(get_comment_count)),
    );
}
