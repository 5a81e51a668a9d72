use std::env;

use dotenvy::dotenv;
use mongodb::{
    Client, Database, IndexModel,
    bson::doc,
    options::{ClientOptions, IndexOptions},
};
use tracing::info;

use crate::models::{poll_models::Poll, vote_models::Vote};
use crate::utils::error::{AppError, AppResult};

pub async fn init_db() -> AppResult<Database> {
    dotenv().ok();

    let mongo_uri = env::var("MONGO_URI")
        .map_err(|_| AppError::InternalError("MONGO_URI must be set in .env".to_string()))?;
    let db_name = env::var("DB_NAME")
        .map_err(|_| AppError::InternalError("DB_NAME must be set in .env".to_string()))?;

    let mut client_options = ClientOptions::parse(&mongo_uri)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to parse MongoDB URI: {e}")))?;

    client_options.app_name = Some("pollboard".to_string());

    let client = Client::with_options(client_options)
        .map_err(|e| AppError::DatabaseError(format!("Failed to initialize MongoDB client: {e}")))?;

    info!("Database connection established");

    Ok(client.database(&db_name))
}

/// The unique indexes are the actual uniqueness guarantees; application
/// pre-checks against them are advisory.
pub async fn ensure_indexes(db: &Database) -> AppResult<()> {
    db.collection::<Poll>("polls")
        .create_index(
            IndexModel::builder()
                .keys(doc! { "title": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
        )
        .await?;

    db.collection::<Vote>("votes")
        .create_index(
            IndexModel::builder()
                .keys(doc! { "poll_id": 1, "voter_id": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
        )
        .await?;

    Ok(())
}
