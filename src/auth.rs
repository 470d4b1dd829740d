use crate::errors::AppError;
use crate::state::AppState;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session";

pub async fn hash_password(password: String, cost: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(AppError::internal)?
        .map_err(AppError::internal)
}

pub async fn verify_password(password: String, hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(AppError::internal)?
        .map_err(AppError::internal)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

/// Opaque bearer tokens mapped to the user they were issued for.
#[derive(Debug)]
pub struct SessionStore {
    ttl: Duration,
    sessions: HashMap<String, Session>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: HashMap::new(),
        }
    }

    pub fn create(&mut self, user_id: &str) -> (String, Session) {
        self.create_at(user_id, Utc::now())
    }

    pub fn create_at(&mut self, user_id: &str, now: DateTime<Utc>) -> (String, Session) {
        self.purge_expired(now);
        let token = Uuid::new_v4().simple().to_string();
        let session = Session {
            user_id: user_id.to_string(),
            expires_at: now + self.ttl,
        };
        self.sessions.insert(token.clone(), session.clone());
        (token, session)
    }

    pub fn resolve(&mut self, token: &str) -> Option<String> {
        self.resolve_at(token, Utc::now())
    }

    pub fn resolve_at(&mut self, token: &str, now: DateTime<Utc>) -> Option<String> {
        match self.sessions.get(token) {
            Some(session) if session.expires_at > now => Some(session.user_id.clone()),
            Some(_) => {
                self.sessions.remove(token);
                None
            }
            None => None,
        }
    }

    pub fn revoke(&mut self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    pub fn purge_expired(&mut self, now: DateTime<Utc>) {
        self.sessions.retain(|_, session| session.expires_at > now);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Token from `Authorization: Bearer ...`, else from the session cookie.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

pub fn session_cookie(token: &str, expires_at: DateTime<Utc>) -> String {
    let max_age = (expires_at - Utc::now()).num_seconds().max(0);
    format!("{SESSION_COOKIE}={token}; HttpOnly; Path=/; SameSite=Lax; Max-Age={max_age}")
}

pub fn cleared_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0")
}

/// The authenticated caller, resolved from its session token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: String,
    pub token: String,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or_else(|| AppError::unauthorized("Unauthorized!"))?;
        let user_id = state
            .sessions
            .lock()
            .await
            .resolve(&token)
            .ok_or_else(|| AppError::unauthorized("Unauthorized!"))?;

        if !state.data.lock().await.users.contains_key(&user_id) {
            state.sessions.lock().await.revoke(&token);
            return Err(AppError::unauthorized("Unauthorized!"));
        }

        Ok(Self { user_id, token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn sessions_expire_after_ttl() {
        let mut store = SessionStore::new(Duration::hours(1));
        let now = Utc::now();
        let (token, session) = store.create_at("user-1", now);
        assert_eq!(session.expires_at, now + Duration::hours(1));

        assert_eq!(store.resolve_at(&token, now + Duration::minutes(59)), Some("user-1".into()));
        assert_eq!(store.resolve_at(&token, now + Duration::hours(1)), None);
        assert!(store.is_empty());
    }

    #[test]
    fn revoke_removes_only_that_token() {
        let mut store = SessionStore::new(Duration::hours(1));
        let (first, _) = store.create("user-1");
        let (second, _) = store.create("user-1");
        let (other, _) = store.create("user-2");
        assert_eq!(store.len(), 3);

        assert!(store.revoke(&first));
        assert!(!store.revoke(&first));
        assert_eq!(store.len(), 2);
        assert_eq!(store.resolve(&first), None);
        assert_eq!(store.resolve(&second), Some("user-1".into()));
        assert_eq!(store.resolve(&other), Some("user-2".into()));
    }

    #[test]
    fn creating_a_session_purges_expired_ones() {
        let mut store = SessionStore::new(Duration::hours(1));
        let now = Utc::now();
        store.create_at("old", now - Duration::hours(2));
        store.create_at("new", now);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn token_from_bearer_header_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        headers.insert(header::COOKIE, HeaderValue::from_static("session=cookie-token"));
        assert_eq!(session_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; session=xyz; lang=en"));
        assert_eq!(session_token(&headers).as_deref(), Some("xyz"));

        headers.insert(header::COOKIE, HeaderValue::from_static("session="));
        assert_eq!(session_token(&headers), None);
        assert_eq!(session_token(&HeaderMap::new()), None);
    }

    #[test]
    fn cookie_strings() {
        let cookie = session_cookie("tok", Utc::now() + Duration::hours(1));
        assert!(cookie.starts_with("session=tok; HttpOnly"));
        assert!(cleared_cookie().ends_with("Max-Age=0"));
    }

    #[tokio::test]
    async fn password_hash_round_trip() {
        let hash = hash_password("hunter22".into(), 4).await.unwrap();
        assert!(verify_password("hunter22".into(), hash.clone()).await.unwrap());
        assert!(!verify_password("hunter23".into(), hash).await.unwrap());
    }
}
