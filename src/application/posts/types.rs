use std::fmt;

use thiserror::Error;

use crate::application::repos::RepoError;
use crate::domain::error::{DomainError, FieldIssue};
use crate::domain::types::PostId;

pub const METRIC_POST_ACTION_TOTAL: &str = "postdesk_post_action_total";

/// The three mutations a caller can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostAction {
    Create,
    Publish,
    Delete,
}

impl PostAction {
    pub fn as_str(self) -> &'static str {
        match self {
            PostAction::Create => "create",
            PostAction::Publish => "publish",
            PostAction::Delete => "delete",
        }
    }
}

impl fmt::Display for PostAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("validation failed: {}", join(.0))]
    Validation(Vec<FieldIssue>),
    #[error("missing {0}")]
    MissingPrecondition(&'static str),
    #[error("post `{0}` not found")]
    NotFound(PostId),
    #[error(transparent)]
    Store(#[from] RepoError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionErrorKind {
    Validation,
    MissingPrecondition,
    NotFound,
    Store,
}

impl ActionErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionErrorKind::Validation => "validation",
            ActionErrorKind::MissingPrecondition => "missing_precondition",
            ActionErrorKind::NotFound => "not_found",
            ActionErrorKind::Store => "store",
        }
    }
}

impl ActionError {
    pub fn kind(&self) -> ActionErrorKind {
        match self {
            ActionError::Validation(_) => ActionErrorKind::Validation,
            ActionError::MissingPrecondition(_) => ActionErrorKind::MissingPrecondition,
            ActionError::NotFound(_) => ActionErrorKind::NotFound,
            ActionError::Store(_) => ActionErrorKind::Store,
        }
    }

    /// Field names rejected by validation, empty for every other kind.
    pub fn fields(&self) -> Vec<&'static str> {
        match self {
            ActionError::Validation(issues) => issues.iter().map(|issue| issue.field).collect(),
            _ => Vec::new(),
        }
    }
}

impl From<DomainError> for ActionError {
    fn from(error: DomainError) -> Self {
        let DomainError::Validation(issues) = error;
        ActionError::Validation(issues)
    }
}

fn join(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
