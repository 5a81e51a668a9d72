use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::controllers::poll_controllers::{cast_vote, create_poll, get_poll, polls};
use crate::middleware::session::session_context;
use crate::state::AppState;

pub fn poll_routes(state: AppState) -> Router {
    Router::new()
        .route("/create", post(create_poll::create_poll))
        .route("/:pollId", get(get_poll::get_poll))
        .route("/:pollId/vote", post(cast_vote::cast_vote))
        .route("/", get(polls::get_all_polls))
        .layer(middleware::from_fn(session_context))
        .with_state(state)
}
