use std::sync::Arc;

use mongodb::Database;

use crate::db::{poll_store::PollStore, user_store::UserStore, vote_store::VoteStore};
use crate::utils::identity::{IdentityResolver, SessionStore};

#[derive(Clone)]
pub struct AppState {
    pub polls: PollStore,
    pub votes: VoteStore,
    pub users: UserStore,
    pub identity: IdentityResolver,
}

impl AppState {
    pub fn new(db: Database, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            polls: PollStore::new(db.clone()),
            votes: VoteStore::new(db.clone()),
            users: UserStore::new(db),
            identity: IdentityResolver::new(sessions),
        }
    }

    /// Voter id for this session token, minting one (and best-effort
    /// recording a user row) when the session has none yet.
    pub async fn session_voter_id(&self, session_token: &str) -> String {
        let resolved = self.identity.session_identity(session_token);
        if resolved.newly_created {
            self.users.record(&resolved.voter_id).await;
        }
        resolved.voter_id
    }
}
