use axum::{
    Json,
    extract::{Extension, Path, State},
};
use mongodb::bson::oid::ObjectId;

use crate::controllers::poll_controllers::models::PollDetailResponse;
use crate::middleware::session::SessionToken;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};

pub async fn get_poll(
    Path(poll_id): Path<String>,
    State(state): State<AppState>,
    Extension(SessionToken(session_token)): Extension<SessionToken>,
) -> AppResult<Json<PollDetailResponse>> {
    let obj_id = ObjectId::parse_str(&poll_id)
        .map_err(|_| AppError::BadRequest("Invalid poll id".to_string()))?;

    let entry = state
        .polls
        .find_by_id(obj_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Poll not found".to_string()))?;

    let voter_id = state.session_voter_id(&session_token).await;
    let user_has_voted = state.polls.has_voted(obj_id, &voter_id).await?;
    let results = state.votes.results(obj_id, &entry.poll.options).await?;

    Ok(Json(PollDetailResponse::from_parts(
        entry.poll,
        entry.vote_count,
        user_has_voted,
        results,
    )))
}
