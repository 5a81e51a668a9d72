use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

/// One vote on one poll. The unique index on (poll_id, voter_id) keeps a
/// voter identity to a single vote per poll.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Vote {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub poll_id: ObjectId,

    pub option_id: String,

    /// Dedup key: a session-derived identity, a client-supplied anonymous
    /// token, or a one-way hash.
    pub voter_id: String,

    pub is_anonymous: bool,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// Per-option aggregate for a poll's results view.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PollResult {
    pub option_id: String,
    pub option_text: String,
    pub vote_count: u64,
    pub percentage: f64,
}
