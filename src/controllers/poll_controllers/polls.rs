use axum::{Json, extract::State};

use crate::controllers::poll_controllers::models::PollSummary;
use crate::state::AppState;
use crate::utils::error::AppResult;

/// All polls, newest first. Vote status is per-identity and is only
/// computed on the detail view.
pub async fn get_all_polls(State(state): State<AppState>) -> AppResult<Json<Vec<PollSummary>>> {
    let polls = state.polls.find_all().await?;

    Ok(Json(polls.into_iter().map(PollSummary::from_store).collect()))
}
