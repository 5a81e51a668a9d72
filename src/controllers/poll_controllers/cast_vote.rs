use std::net::SocketAddr;

use axum::{
    Json,
    extract::{ConnectInfo, Extension, Path, State},
    http::{HeaderMap, header::USER_AGENT},
};
use mongodb::bson::oid::ObjectId;
use tracing::error;

use crate::controllers::poll_controllers::models::{
    CastVoteRequest, PollDetailResponse, VoteResponse,
};
use crate::middleware::session::SessionToken;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::identity::IdentityResolver;

/// Votes never fail across the boundary: every error becomes a structured
/// `{success: false, message}` body.
pub async fn cast_vote(
    Path(poll_id): Path<String>,
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Extension(SessionToken(session_token)): Extension<SessionToken>,
    headers: HeaderMap,
    Json(payload): Json<CastVoteRequest>,
) -> Json<VoteResponse> {
    match try_cast_vote(&state, &poll_id, addr, &session_token, &headers, payload).await {
        Ok(poll) => Json(VoteResponse {
            success: true,
            message: "Vote recorded successfully".to_string(),
            poll: Some(poll),
        }),
        Err(err) => {
            let message = match &err {
                AppError::DatabaseError(msg) | AppError::InternalError(msg) => {
                    error!("Vote failed: {msg}");
                    "Failed to record vote".to_string()
                }
                other => other.message().to_string(),
            };

            Json(VoteResponse {
                success: false,
                message,
                poll: None,
            })
        }
    }
}

async fn try_cast_vote(
    state: &AppState,
    poll_id: &str,
    addr: SocketAddr,
    session_token: &str,
    headers: &HeaderMap,
    payload: CastVoteRequest,
) -> AppResult<PollDetailResponse> {
    let obj_id = ObjectId::parse_str(poll_id)
        .map_err(|_| AppError::BadRequest("Invalid poll id".to_string()))?;

    let voter_id = if payload.is_anonymous {
        match payload.anonymous_user_id.filter(|token| !token.is_empty()) {
            // Client-stored token: taken verbatim, untraceable server-side.
            Some(token) => token,
            // Fallback: one-way hash, so the same poll/browser/network
            // combination still collides.
            None => {
                let user_agent = headers
                    .get(USER_AGENT)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("");
                IdentityResolver::anonymous_identity(poll_id, user_agent, &addr.ip().to_string())
            }
        }
    } else {
        state.session_voter_id(session_token).await
    };

    state
        .votes
        .create(obj_id, &payload.option_id, &voter_id, payload.is_anonymous)
        .await?;

    let entry = state
        .polls
        .find_by_id(obj_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Poll not found".to_string()))?;

    let user_has_voted = state.polls.has_voted(obj_id, &voter_id).await?;
    let results = state.votes.results(obj_id, &entry.poll.options).await?;

    Ok(PollDetailResponse::from_parts(
        entry.poll,
        entry.vote_count,
        user_has_voted,
        results,
    ))
}
