use mongodb::{
    Database,
    bson::{Bson, DateTime, doc},
};
use tracing::warn;

use crate::models::user_models::User;

/// Best-effort persistence of session-derived identities. Failures are
/// logged and swallowed: identity resolution has no error conditions.
#[derive(Clone)]
pub struct UserStore {
    db: Database,
}

impl UserStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn record(&self, voter_id: &str) {
        let result = self
            .db
            .collection::<User>("users")
            .update_one(
                doc! { "_id": voter_id },
                doc! { "$setOnInsert": { "username": Bson::Null, "created_at": DateTime::now() } },
            )
            .upsert(true)
            .await;

        if let Err(err) = result {
            warn!("Failed to record user {voter_id}: {err}");
        }
    }
}
