use std::collections::HashMap;
use std::sync::{Arc, RwLock};

pub const SESSION_COOKIE: &str = "session";

/// Authenticated identity attached to a request by the session middleware.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub user_id: i64,
    pub username: String,
}

/// Server-side session state keyed by opaque tokens. Process-local; the
/// lock is only held for map access, never across an await point.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, SessionUser>>>,
}

impl SessionStore {
    pub fn new() -> SessionStore {
        SessionStore::default()
    }

    /// Binds a fresh token to the given user and returns it.
    pub fn create(&self, user: SessionUser) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        self.inner
            .write()
            .expect("session lock poisoned")
            .insert(token.clone(), user);
        token
    }

    pub fn get(&self, token: &str) -> Option<SessionUser> {
        self.inner
            .read()
            .expect("session lock poisoned")
            .get(token)
            .cloned()
    }

    /// Removes the session if present. Idempotent.
    pub fn remove(&self, token: &str) {
        self.inner
            .write()
            .expect("session lock poisoned")
            .remove(token);
    }

    pub fn count(&self) -> usize {
        self.inner.read().expect("session lock poisoned").len()
    }
}

pub fn session_cookie(token: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        SESSION_COOKIE, token
    )
}

pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// Pulls the session token out of a `Cookie` request header value.
pub fn token_from_cookie_header(header: &str) -> Option<&str> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == SESSION_COOKIE && !value.is_empty() {
            Some(value)
        } else {
            None
        }
    })
}
