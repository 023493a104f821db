//! Repository traits describing the remote post store.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::PostRecord;
use crate::domain::posts::NewPost;
use crate::domain::types::{PostId, UserId};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Row selector for update and delete statements.
///
/// `owner` is passed straight through to the store; the store is the only
/// place ownership is enforced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostMatch {
    pub id: PostId,
    pub owner: Option<UserId>,
}

impl PostMatch {
    pub fn owned(id: PostId, owner: UserId) -> Self {
        Self {
            id,
            owner: Some(owner),
        }
    }

    pub fn matches(&self, record: &PostRecord) -> bool {
        record.id == self.id
            && self
                .owner
                .as_ref()
                .is_none_or(|owner| *owner == record.user_id)
    }
}

#[async_trait]
pub trait PostsRepo: Send + Sync {
    async fn find_by_id(&self, id: &PostId) -> Result<Option<PostRecord>, RepoError>;

    /// Every post owned by `owner`, newest first.
    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<PostRecord>, RepoError>;
}

#[async_trait]
pub trait PostsWriteRepo: Send + Sync {
    async fn insert_post(&self, post: NewPost) -> Result<PostRecord, RepoError>;

    /// Returns `None` when no row matched.
    async fn update_published(
        &self,
        matcher: &PostMatch,
        published: bool,
    ) -> Result<Option<PostRecord>, RepoError>;

    /// Returns the removed row, or `None` when no row matched.
    async fn delete_post(&self, matcher: &PostMatch) -> Result<Option<PostRecord>, RepoError>;
}

#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> Result<(), RepoError>;
}
