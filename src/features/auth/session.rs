//! Server-side session store.
//!
//! Sessions are keyed by a random cookie id and hold the authenticated user's
//! public claims. The store is an explicit abstraction so handlers never touch
//! process-global state; the in-memory backend suits a single-instance
//! deployment and can be swapped for an external store behind the same trait.

use async_trait::async_trait;
use axum_extra::extract::cookie::{Cookie, SameSite};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::features::auth::model::AuthenticatedUser;
use crate::shared::constants::{SESSION_COOKIE, TOKEN_COOKIE};

/// Interval between expiry sweeps of the in-memory backend
pub const SESSION_PRUNE_INTERVAL_SECS: u64 = 300;

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, session_id: &str) -> Option<AuthenticatedUser>;
    async fn set(&self, session_id: &str, user: AuthenticatedUser);
    async fn destroy(&self, session_id: &str);
}

/// Generate a fresh session cookie id
pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

struct Entry {
    user: AuthenticatedUser,
    expires_at: Instant,
}

pub struct InMemorySessionStore {
    ttl: Duration,
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Drop expired entries, returning how many were removed
    pub async fn prune(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    /// Periodically sweep expired sessions in a background task
    pub fn spawn_prune_task(store: Arc<Self>) {
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(SESSION_PRUNE_INTERVAL_SECS));
            interval.tick().await; // first tick fires immediately
            loop {
                interval.tick().await;
                let removed = store.prune().await;
                if removed > 0 {
                    tracing::debug!("Pruned {} expired sessions", removed);
                }
            }
        });
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, session_id: &str) -> Option<AuthenticatedUser> {
        {
            let entries = self.entries.read().await;
            match entries.get(session_id) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Some(entry.user.clone())
                }
                Some(_) => {}
                None => return None,
            }
        }
        // Entry exists but expired; remove it under a write lock
        self.entries.write().await.remove(session_id);
        None
    }

    async fn set(&self, session_id: &str, user: AuthenticatedUser) {
        let entry = Entry {
            user,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries.write().await.insert(session_id.to_string(), entry);
    }

    async fn destroy(&self, session_id: &str) {
        self.entries.write().await.remove(session_id);
    }
}

// =============================================================================
// COOKIES
// =============================================================================

fn build_cookie(name: &'static str, value: String, secure: bool, ttl_hours: i64) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(cookie::time::Duration::hours(ttl_hours))
        .build()
}

/// Cookie carrying the server-side session id
pub fn session_cookie(session_id: &str, secure: bool, ttl_hours: i64) -> Cookie<'static> {
    build_cookie(SESSION_COOKIE, session_id.to_string(), secure, ttl_hours)
}

/// Cookie carrying the signed claims token
pub fn token_cookie(token: &str, secure: bool, ttl_hours: i64) -> Cookie<'static> {
    build_cookie(TOKEN_COOKIE, token.to_string(), secure, ttl_hours)
}

/// Cookie removal needs a matching path
pub fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, "")).path("/").build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::Role;

    fn user(id: &str) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: id.to_string(),
            first_name: "T".into(),
            last_name: "U".into(),
            email: format!("{}@example.com", id),
            role: Role::Contributor,
        }
    }

    #[tokio::test]
    async fn test_set_get_destroy() {
        let store = InMemorySessionStore::new(Duration::from_secs(60));
        let sid = new_session_id();

        assert!(store.get(&sid).await.is_none());

        store.set(&sid, user("alice")).await;
        assert_eq!(store.get(&sid).await.unwrap().user_id, "alice");

        store.destroy(&sid).await;
        assert!(store.get(&sid).await.is_none());
    }

    #[tokio::test]
    async fn test_expired_sessions_are_gone() {
        let store = InMemorySessionStore::new(Duration::ZERO);
        let sid = new_session_id();
        store.set(&sid, user("bob")).await;
        assert!(store.get(&sid).await.is_none());
    }

    #[tokio::test]
    async fn test_prune_removes_only_expired() {
        let store = InMemorySessionStore::new(Duration::ZERO);
        store.set("dead", user("dead")).await;
        let fresh = InMemorySessionStore::new(Duration::from_secs(60));
        fresh.set("live", user("live")).await;

        assert_eq!(store.prune().await, 1);
        assert_eq!(fresh.prune().await, 0);
        assert!(fresh.get("live").await.is_some());
    }

    #[test]
    fn test_cookie_attributes() {
        let c = session_cookie("abc", true, 24);
        assert_eq!(c.name(), SESSION_COOKIE);
        assert_eq!(c.value(), "abc");
        assert_eq!(c.path(), Some("/"));
        assert_eq!(c.http_only(), Some(true));
        assert_eq!(c.secure(), Some(true));
        assert_eq!(c.same_site(), Some(SameSite::Lax));
    }

    #[test]
    fn test_session_ids_are_unique() {
        assert_ne!(new_session_id(), new_session_id());
    }
}
