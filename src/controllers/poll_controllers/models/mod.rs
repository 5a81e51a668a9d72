use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::poll_store::PollWithCount;
use crate::models::poll_models::{Poll, PollOption};
use crate::models::vote_models::PollResult;

#[derive(Debug, Deserialize)]
pub struct CreatePollRequest {
    pub title: String,
    pub options: Vec<String>,
    pub creator_name: Option<String>,
    #[serde(default)]
    pub is_anonymous_creator: bool,
    #[serde(default = "default_allow_anonymous_voting")]
    pub allow_anonymous_voting: bool,
}

fn default_allow_anonymous_voting() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct CastVoteRequest {
    pub option_id: String,
    #[serde(default)]
    pub is_anonymous: bool,
    /// Client-stored per-poll token for anonymous votes; taken verbatim
    /// when present.
    pub anonymous_user_id: Option<String>,
}

/// List-view shape: no per-caller vote status, no results. The creator's
/// internal identity is never exposed, only the display name.
#[derive(Debug, Serialize)]
pub struct PollSummary {
    pub id: String,
    pub title: String,
    pub creator_name: Option<String>,
    pub is_anonymous_creator: bool,
    pub allow_anonymous_voting: bool,
    pub created_at: DateTime<Utc>,
    pub options: Vec<PollOption>,
    pub vote_count: u64,
    pub user_has_voted: bool,
}

impl PollSummary {
    pub fn from_store(entry: PollWithCount) -> Self {
        let PollWithCount { poll, vote_count } = entry;
        Self {
            id: poll.id.to_hex(),
            title: poll.title,
            creator_name: poll.creator_name,
            is_anonymous_creator: poll.is_anonymous_creator,
            allow_anonymous_voting: poll.allow_anonymous_voting,
            created_at: poll.created_at,
            options: poll.options,
            vote_count,
            user_has_voted: false,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PollDetailResponse {
    pub id: String,
    pub title: String,
    pub creator_name: Option<String>,
    pub is_anonymous_creator: bool,
    pub allow_anonymous_voting: bool,
    pub created_at: DateTime<Utc>,
    pub options: Vec<PollOption>,
    pub vote_count: u64,
    pub user_has_voted: bool,
    pub results: Vec<PollResult>,
}

impl PollDetailResponse {
    pub fn from_parts(
        poll: Poll,
        vote_count: u64,
        user_has_voted: bool,
        results: Vec<PollResult>,
    ) -> Self {
        Self {
            id: poll.id.to_hex(),
            title: poll.title,
            creator_name: poll.creator_name,
            is_anonymous_creator: poll.is_anonymous_creator,
            allow_anonymous_voting: poll.allow_anonymous_voting,
            created_at: poll.created_at,
            options: poll.options,
            vote_count,
            user_has_voted,
            results,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll: Option<PollDetailResponse>,
}
