use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

/// A poll and its options, stored as a single document so that creation is
/// atomic. Immutable after creation; only votes referencing it accumulate.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Poll {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    /// Session identity of the creator; None for anonymous creators. Never
    /// exposed in responses.
    pub creator_id: Option<String>,
    pub creator_name: Option<String>,
    pub is_anonymous_creator: bool,
    pub allow_anonymous_voting: bool,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    pub options: Vec<PollOption>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PollOption {
    pub id: String,
    pub text: String,
}
