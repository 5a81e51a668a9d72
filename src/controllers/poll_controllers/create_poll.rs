use axum::{
    Json,
    extract::{Extension, State},
};

use crate::controllers::poll_controllers::models::{CreatePollRequest, PollDetailResponse};
use crate::middleware::session::SessionToken;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};

pub async fn create_poll(
    State(state): State<AppState>,
    Extension(SessionToken(session_token)): Extension<SessionToken>,
    Json(payload): Json<CreatePollRequest>,
) -> AppResult<Json<PollDetailResponse>> {
    validate_poll_input(&payload.title, &payload.options)?;

    let creator_id = if payload.is_anonymous_creator {
        None
    } else {
        Some(state.session_voter_id(&session_token).await)
    };

    let creator_name = if payload.is_anonymous_creator {
        None
    } else {
        Some(
            payload
                .creator_name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| "Anonymous".to_string()),
        )
    };

    let poll = state
        .polls
        .create(
            &payload.title,
            &payload.options,
            creator_id,
            creator_name,
            payload.is_anonymous_creator,
            payload.allow_anonymous_voting,
        )
        .await?;

    // Fresh poll: zero votes, nobody has voted yet.
    let results = state.votes.results(poll.id, &poll.options).await?;

    Ok(Json(PollDetailResponse::from_parts(poll, 0, false, results)))
}

fn validate_poll_input(title: &str, options: &[String]) -> AppResult<()> {
    if title.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Poll must have a title".to_string(),
        ));
    }

    if options.len() < 2 {
        return Err(AppError::ValidationError(
            "Poll must have at least 2 options".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn rejects_empty_title() {
        let err = validate_poll_input("  ", &options(&["A", "B"])).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn rejects_fewer_than_two_options() {
        let err = validate_poll_input("Lunch?", &options(&["Pizza"])).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn accepts_two_options() {
        assert!(validate_poll_input("Lunch?", &options(&["Pizza", "Salad"])).is_ok());
    }
}
