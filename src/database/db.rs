use log::{error, info};
use mongodb::bson::doc;
use mongodb::{Client, options::ClientOptions};
use std::error::Error;
use tokio::sync::OnceCell;

use crate::utils::config::AppConfig;

static MONGO_CLIENT: OnceCell<Client> = OnceCell::const_new();

pub struct Database {
    pub client: Client,
}

impl Database {
    pub async fn init(mongodb_uri: &str) -> Result<Self, mongodb::error::Error> {
        let mut client_options = ClientOptions::parse(mongodb_uri).await?;
        client_options.app_name = Some("forum_backend".to_string());
        let client = Client::with_options(client_options)?;

        // Ping the server to see if you can connect to the cluster
        client
            .database("admin")
            .run_command(doc! {"ping": 1})
            .await?;

        info!("Connected successfully to MongoDB");

        Ok(Self { client })
    }
}

/// Returns the process-wide client, connecting on first use. Later calls reuse
/// the same handle; a failed attempt leaves the cell empty so the next call retries.
pub async fn connect_to_mongo(config: &AppConfig) -> Result<Client, Box<dyn Error + Send + Sync>> {
    let uri = config
        .mongo_uri
        .as_deref()
        .ok_or("MONGO_URI is required")?;

    let client = MONGO_CLIENT
        .get_or_try_init(|| async {
            Database::init(uri)
                .await
                .map(|database| database.client)
                .map_err(|e| {
                    error!("Failed to initialize database: {:?}", e);
                    e
                })
        })
        .await?;

    Ok(client.clone())
}
