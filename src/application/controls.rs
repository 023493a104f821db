//! Server-side state behind the post UI controls.
//!
//! Two pieces live here: the in-flight registry that turns a second click on
//! a busy control into a no-op, and the delete dialog phase machine.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use thiserror::Error;

use crate::application::posts::PostAction;
use crate::domain::types::{PostId, UserId};

/// Identity of one pending submission: who pressed which control on what.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ControlKey {
    pub action: PostAction,
    pub user: UserId,
    pub target: Option<PostId>,
}

impl ControlKey {
    pub fn new(action: PostAction, user: UserId, target: Option<PostId>) -> Self {
        Self {
            action,
            user,
            target,
        }
    }
}

#[derive(Debug, Error)]
pub enum InFlightError {
    #[error("{action} already in progress")]
    AlreadyRunning { action: PostAction },
}

/// Tracks control submissions that have not resolved yet.
#[derive(Default, Clone)]
pub struct InFlightActions {
    pending: Arc<DashMap<ControlKey, ()>>,
}

impl InFlightActions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self, key: ControlKey) -> Result<ActionGuard, InFlightError> {
        match self.pending.entry(key.clone()) {
            Entry::Vacant(vacant) => {
                vacant.insert(());
                Ok(ActionGuard {
                    key,
                    pending: Arc::clone(&self.pending),
                })
            }
            Entry::Occupied(_) => Err(InFlightError::AlreadyRunning { action: key.action }),
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Releases its slot in [`InFlightActions`] on drop.
pub struct ActionGuard {
    key: ControlKey,
    pending: Arc<DashMap<ControlKey, ()>>,
}

impl Drop for ActionGuard {
    fn drop(&mut self) {
        self.pending.remove(&self.key);
    }
}

/// Which of the delete views is showing. Only one can be visible at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteDialogPhase {
    #[default]
    Closed,
    Confirming,
    Deleting,
}

impl DeleteDialogPhase {
    /// Closed -> Confirming.
    pub fn open(self) -> Self {
        match self {
            DeleteDialogPhase::Closed => DeleteDialogPhase::Confirming,
            other => other,
        }
    }

    /// Confirming -> Closed.
    pub fn cancel(self) -> Self {
        match self {
            DeleteDialogPhase::Confirming => DeleteDialogPhase::Closed,
            other => other,
        }
    }

    /// Confirming -> Deleting.
    pub fn confirm(self) -> Self {
        match self {
            DeleteDialogPhase::Confirming => DeleteDialogPhase::Deleting,
            other => other,
        }
    }

    /// Deleting -> Closed, once the action has an outcome.
    pub fn resolve(self) -> Self {
        match self {
            DeleteDialogPhase::Deleting => DeleteDialogPhase::Closed,
            other => other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeleteDialogPhase::Closed => "closed",
            DeleteDialogPhase::Confirming => "confirming",
            DeleteDialogPhase::Deleting => "deleting",
        }
    }

    /// Read the phase a client echoed back; anything unrecognised is `Closed`.
    pub fn from_client(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("confirming") => DeleteDialogPhase::Confirming,
            Some("deleting") => DeleteDialogPhase::Deleting,
            _ => DeleteDialogPhase::Closed,
        }
    }

    pub fn confirm_visible(self) -> bool {
        self == DeleteDialogPhase::Confirming
    }

    pub fn wait_visible(self) -> bool {
        self == DeleteDialogPhase::Deleting
    }
}
