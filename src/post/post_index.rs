use super::post_controller::{
    create_post, delete_post, get_all_posts, get_categories, get_drafts, get_following_posts,
    get_newest_posts, get_popular_posts, get_post, get_regular_posts, get_upvotes, search_posts,
    update_post, upvote_post,
};
use actix_web::web;

// Sessions are read by the SessionUser extractor so that public and
// authenticated routes can share a scope.
pub fn post_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/categories", web::get().to(get_categories))
        .service(
            web::scope("/posts")
                .route("", web::get().to(get_all_posts))
                .route("/create", web::post().to(create_post))
                .route("/popular", web::get().to(get_popular_posts))
                .route("/newest", web::get().to(get_newest_posts))
                .route("/regular", web::get().to(get_regular_posts))
                .route("/following", web::get().to(get_following_posts))
                .route("/drafts", web::get().to(get_drafts))
                .route("/search", web::get().to(search_posts))
                .route("/{id}", web::get().to(get_post))
                .route("/{id}", web::patch().to(update_post))
                .route("/{id}", web::delete().to(delete_post))
                .route("/{id}/upvotes", web::post().to(upvote_post))
                .route("/{id}/upvotes", web::get().to(get_upvotes)),
        );
}
