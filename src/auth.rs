//! Authentication collaborator surface.
//!
//! The service never handles credentials; it only asks the collaborator
//! "is a user present, and who". `AuthClient` is the lookup seam,
//! `RequireUser` is the request-side guard, and `Session` is the
//! application-scoped auth-state holder for single-user embedders.

use crate::AppState;
use crate::errors::{AppError, AuthError};
use crate::models::User;
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::watch;

/// Resolves a bearer token to a user identity.
#[async_trait]
pub trait AuthClient: Send + Sync + 'static {
    /// `Ok(None)` for an unknown or expired token.
    async fn current_user(&self, token: &str) -> Result<Option<User>, AuthError>;
}

/// Token-to-user map, for development and tests.
#[derive(Default)]
pub struct MemoryAuth {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, token: &str, user: User) {
        self.users
            .write()
            .expect("auth map lock poisoned")
            .insert(token.to_string(), user);
    }
}

#[async_trait]
impl AuthClient for MemoryAuth {
    async fn current_user(&self, token: &str) -> Result<Option<User>, AuthError> {
        let users = self.users.read().expect("auth map lock poisoned");
        Ok(users.get(token).cloned())
    }
}

/// Extractor requiring an authenticated caller. Rejects with 401 when the
/// `Authorization: Bearer` header is missing or does not resolve to a user.
pub struct RequireUser(pub User);

impl FromRequestParts<Arc<AppState>> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?;
        let user = state
            .auth
            .current_user(&token)
            .await?
            .ok_or(AppError::Unauthorized)?;
        Ok(RequireUser(user))
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
}

/// Application-scoped auth-state holder.
///
/// Replaces ambient global session state: initialized at startup, read or
/// watched by interested parts, torn down by dropping. Subscribers observe
/// login/logout transitions; dropping the receiver unsubscribes.
pub struct Session {
    tx: watch::Sender<Option<User>>,
}

impl Session {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Session { tx }
    }

    pub fn login(&self, user: User) {
        tracing::info!(user_id = %user.id, "Session: user signed in");
        self.tx.send_replace(Some(user));
    }

    pub fn logout(&self) {
        tracing::info!("Session: user signed out");
        self.tx.send_replace(None);
    }

    pub fn current(&self) -> Option<User> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.tx.subscribe()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
