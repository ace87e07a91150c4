use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::middleware::{ErrorHandlers, Logger};
use actix_web::{HttpResponse, HttpServer, Responder, get, web};
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info, warn};

mod comment;
mod database;
mod middleware;
mod post;
mod router;
mod user;
mod utils;

use comment::service::CommentService;
use database::{MemoryStore, MongoStore, RedisService, connect_to_mongo, connect_to_redis};
use database::repository::{CommentRepository, PostRepository, UserRepository, VoteRepository};
use middleware::error_handler::handle_error;
use middleware::not_found::not_found;
use post::post_service::PostService;
use router::index::routes;
use serde_json::json;
use user::service::UserService;
use utils::config::{AppConfig, StoreBackend};
use utils::helpers::service_name;

#[get("/")]
async fn default() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Forum API is running",
        "httpStatusCode": StatusCode::OK.as_u16(),
        "service": service_name(),
    }))
}

/// Services shared by every worker
#[derive(Clone)]
struct Services {
    users: web::Data<UserService>,
    posts: web::Data<PostService>,
    comments: web::Data<CommentService>,
}

impl Services {
    fn build<S>(store: Arc<S>) -> Self
    where
        S: PostRepository + CommentRepository + UserRepository + VoteRepository + 'static,
    {
        Services {
            users: web::Data::new(UserService::new(store.clone())),
            posts: web::Data::new(PostService::new(
                store.clone(),
                store.clone(),
                store.clone(),
                store.clone(),
            )),
            comments: web::Data::new(CommentService::new(store.clone(), store.clone(), store)),
        }
    }
}

async fn open_store(config: &AppConfig) -> Result<Services, String> {
    match config.store_backend {
        StoreBackend::Mongo => {
            let client = connect_to_mongo(config)
                .await
                .map_err(|e| format!("Failed to connect to MongoDB: {}", e))?;
            let store = MongoStore::new(&client, &config.mongo_database);
            store
                .ensure_indexes()
                .await
                .map_err(|e| format!("Failed to create indexes: {}", e))?;
            Ok(Services::build(Arc::new(store)))
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory store; data is lost on restart");
            Ok(Services::build(Arc::new(MemoryStore::new())))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return Err(std::io::Error::other(e));
        }
    };

    let services = open_store(&config).await.map_err(|e| {
        error!("{}", e);
        std::io::Error::other(e)
    })?;

    let redis_service = match config.redis_url.as_deref() {
        Some(url) => match connect_to_redis(url).await {
            Ok(client) => Some(web::Data::new(RedisService::new(&client))),
            Err(e) => {
                warn!("Redis unavailable, sessions rely on JWT only: {}", e);
                None
            }
        },
        None => None,
    };

    let bind = (config.host.clone(), config.port);
    info!("Starting server on http://{}:{}", bind.0, bind.1);
    let config = web::Data::new(config);

    HttpServer::new(move || {
        let mut app = actix_web::App::new()
            .wrap(Logger::default())
            .app_data(config.clone())
            .app_data(services.users.clone())
            .app_data(services.posts.clone())
            .app_data(services.comments.clone());
        if let Some(redis) = &redis_service {
            app = app.app_data(redis.clone());
        }
        app.configure(routes)
            .wrap(
                ErrorHandlers::new()
                    .handler(StatusCode::NOT_FOUND, not_found)
                    .default_handler(handle_error),
            )
            .service(default)
    })
    .bind(bind)?
    .run()
    .await?;

    info!("Server has stopped");

    Ok(())
}
