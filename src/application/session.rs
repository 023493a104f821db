//! Shared session state.
//!
//! [`SessionHub`] is the single owner of the auth provider handle and of the
//! session-change channel. Request handlers resolve identities through it and
//! long-lived views subscribe to it; nothing else talks to the provider.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use metrics::counter;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::domain::types::UserId;

pub const METRIC_SESSION_EVENTS_TOTAL: &str = "postdesk_session_events_total";

const CHANGE_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    pub id: UserId,
    pub email: Option<String>,
}

/// An authenticated session as reported by the auth provider.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    user: SessionUser,
    access_token: String,
}

impl Session {
    pub fn new(user: SessionUser, access_token: impl Into<String>) -> Self {
        Self {
            user,
            access_token: access_token.into(),
        }
    }

    pub fn user(&self) -> &SessionUser {
        &self.user
    }

    pub fn user_id(&self) -> &UserId {
        &self.user.id
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("auth provider unreachable: {0}")]
    Unavailable(String),
    #[error("auth provider answered with status {0}")]
    UnexpectedStatus(u16),
    #[error("auth provider response could not be decoded: {0}")]
    Malformed(String),
}

/// Remote identity service that issues and revokes access tokens.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Resolve a token. An unknown or expired token is `Ok(None)`.
    async fn get_session(&self, access_token: &str) -> Result<Option<Session>, AuthError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionChange {
    SignedIn { user: SessionUser },
    SignedOut { user_id: UserId },
}

impl SessionChange {
    pub fn user_id(&self) -> &UserId {
        match self {
            SessionChange::SignedIn { user } => &user.id,
            SessionChange::SignedOut { user_id } => user_id,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            SessionChange::SignedIn { .. } => "signed_in",
            SessionChange::SignedOut { .. } => "signed_out",
        }
    }
}

#[derive(Clone)]
pub struct SessionHub {
    provider: Arc<dyn AuthProvider>,
    changes: broadcast::Sender<SessionChange>,
    subscribers: Arc<AtomicUsize>,
}

impl SessionHub {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            provider,
            changes,
            subscribers: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Look up the session behind `access_token`, if any.
    pub async fn current_session(
        &self,
        access_token: Option<&str>,
    ) -> Result<Option<Session>, AuthError> {
        match access_token.map(str::trim).filter(|token| !token.is_empty()) {
            Some(token) => self.provider.get_session(token).await,
            None => Ok(None),
        }
    }

    /// Validate a freshly issued token and announce the sign-in.
    pub async fn sign_in(&self, access_token: &str) -> Result<Option<Session>, AuthError> {
        let session = self.current_session(Some(access_token)).await?;
        if let Some(session) = session.as_ref() {
            info!(
                target = "application::session::sign_in",
                user_id = %session.user_id(),
                "session established"
            );
            self.publish(SessionChange::SignedIn {
                user: session.user().clone(),
            });
        }
        Ok(session)
    }

    pub async fn sign_out(&self, session: &Session) -> Result<(), AuthError> {
        self.provider.sign_out(session.access_token()).await?;
        info!(
            target = "application::session::sign_out",
            user_id = %session.user_id(),
            "session ended"
        );
        self.publish(SessionChange::SignedOut {
            user_id: session.user_id().clone(),
        });
        Ok(())
    }

    pub fn subscribe(&self) -> SessionSubscription {
        self.subscribers.fetch_add(1, Ordering::SeqCst);
        SessionSubscription {
            receiver: self.changes.subscribe(),
            subscribers: Arc::clone(&self.subscribers),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.load(Ordering::SeqCst)
    }

    fn publish(&self, change: SessionChange) {
        counter!(METRIC_SESSION_EVENTS_TOTAL, "event" => change.kind()).increment(1);
        // No receivers is not an error: nobody is watching yet.
        let delivered = self.changes.send(change).unwrap_or(0);
        debug!(
            target = "application::session::publish",
            delivered, "session change broadcast"
        );
    }
}

/// Live feed of session changes. Dropping it unsubscribes.
pub struct SessionSubscription {
    receiver: broadcast::Receiver<SessionChange>,
    subscribers: Arc<AtomicUsize>,
}

impl SessionSubscription {
    /// Next change, skipping over anything missed while lagging. `None` once
    /// the hub is gone.
    pub async fn recv(&mut self) -> Option<SessionChange> {
        loop {
            match self.receiver.recv().await {
                Ok(change) => return Some(change),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(
                        target = "application::session::recv",
                        skipped, "session subscriber lagged"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for SessionSubscription {
    fn drop(&mut self) {
        self.subscribers.fetch_sub(1, Ordering::SeqCst);
    }
}
