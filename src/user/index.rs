use super::controller::{
    follow_user, get_profile, get_user_image, login_user, logout_user, oauth_sign_in,
    register_user, unfollow_user, update_profile,
};
use crate::middleware::auth::verify_token;
use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

pub fn user_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/register", web::post().to(register_user))
        .service(
            web::scope("/auth")
                .route("/login", web::post().to(login_user))
                .route("/logout", web::post().to(logout_user))
                .route("/oauth", web::post().to(oauth_sign_in)),
        )
        .service(
            web::scope("/profile")
                .wrap(HttpAuthentication::bearer(verify_token))
                .route("", web::get().to(get_profile))
                .route("/update", web::post().to(update_profile)),
        )
        .service(
            web::scope("/users")
                .route("/{id}/image", web::get().to(get_user_image))
                .route("/{id}/follow", web::post().to(follow_user))
                .route("/{id}/follow", web::delete().to(unfollow_user)),
        );
}
