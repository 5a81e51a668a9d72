use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Session-token to voter-id mapping used for vote deduplication. Process
/// local; an entry that expires or is lost simply mints a fresh identity on
/// next use.
pub trait SessionStore: Send + Sync {
    fn get(&self, session_token: &str) -> Option<String>;
    fn put(&self, session_token: &str, voter_id: String);
}

/// Bounded TTL cache over session identities.
pub struct MokaSessionStore {
    inner: Cache<String, String>,
}

impl MokaSessionStore {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }
}

impl SessionStore for MokaSessionStore {
    fn get(&self, session_token: &str) -> Option<String> {
        self.inner.get(session_token)
    }

    fn put(&self, session_token: &str, voter_id: String) {
        self.inner.insert(session_token.to_string(), voter_id);
    }
}

pub struct SessionIdentity {
    pub voter_id: String,
    /// Set when this call minted the identity, so the caller can record a
    /// user row for it.
    pub newly_created: bool,
}

/// Produces stable voter identifiers for deduplication. Identity resolution
/// has no error conditions.
#[derive(Clone)]
pub struct IdentityResolver {
    sessions: Arc<dyn SessionStore>,
}

impl IdentityResolver {
    pub fn new(sessions: Arc<dyn SessionStore>) -> Self {
        Self { sessions }
    }

    /// Looks up or lazily creates the random identity for a session token.
    pub fn session_identity(&self, session_token: &str) -> SessionIdentity {
        if let Some(voter_id) = self.sessions.get(session_token) {
            return SessionIdentity {
                voter_id,
                newly_created: false,
            };
        }

        let voter_id = Uuid::new_v4().simple().to_string();
        self.sessions.put(session_token, voter_id.clone());

        SessionIdentity {
            voter_id,
            newly_created: true,
        }
    }

    /// One-way hash for anonymous votes without a client token. The same
    /// poll + user agent + address collides deterministically; nothing in
    /// the output can be traced back to the inputs.
    pub fn anonymous_identity(poll_id: &str, user_agent: &str, ip: &str) -> String {
        let digest = Sha256::digest(format!("{poll_id}-{user_agent}-{ip}"));
        hex::encode(digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> IdentityResolver {
        IdentityResolver::new(Arc::new(MokaSessionStore::new(
            1024,
            Duration::from_secs(60),
        )))
    }

    #[test]
    fn anonymous_identity_is_deterministic() {
        let a = IdentityResolver::anonymous_identity("poll-1", "Mozilla/5.0", "10.0.0.1");
        let b = IdentityResolver::anonymous_identity("poll-1", "Mozilla/5.0", "10.0.0.1");
        assert_eq!(a, b);
    }

    #[test]
    fn anonymous_identity_varies_per_poll() {
        let a = IdentityResolver::anonymous_identity("poll-1", "Mozilla/5.0", "10.0.0.1");
        let b = IdentityResolver::anonymous_identity("poll-2", "Mozilla/5.0", "10.0.0.1");
        assert_ne!(a, b);
    }

    #[test]
    fn anonymous_identity_is_hex_sha256() {
        let id = IdentityResolver::anonymous_identity("poll-1", "ua", "ip");
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn session_identity_is_stable_per_token() {
        let resolver = resolver();

        let first = resolver.session_identity("session-a");
        assert!(first.newly_created);

        let second = resolver.session_identity("session-a");
        assert!(!second.newly_created);
        assert_eq!(first.voter_id, second.voter_id);
    }

    #[test]
    fn distinct_tokens_get_distinct_identities() {
        let resolver = resolver();

        let a = resolver.session_identity("session-a");
        let b = resolver.session_identity("session-b");
        assert_ne!(a.voter_id, b.voter_id);
    }

    #[test]
    fn expired_session_mints_a_fresh_identity() {
        let resolver = IdentityResolver::new(Arc::new(MokaSessionStore::new(
            1024,
            Duration::from_millis(50),
        )));

        let first = resolver.session_identity("session-a");
        std::thread::sleep(Duration::from_millis(120));

        let second = resolver.session_identity("session-a");
        assert!(second.newly_created);
        assert_ne!(first.voter_id, second.voter_id);
    }

    #[test]
    fn store_roundtrip() {
        let store = MokaSessionStore::new(16, Duration::from_secs(60));
        assert_eq!(store.get("token"), None);

        store.put("token", "voter".to_string());
        assert_eq!(store.get("token"), Some("voter".to_string()));
    }
}
