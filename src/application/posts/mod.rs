mod commands;
mod queries;
mod service;
pub mod types;

pub use service::PostActions;
pub use types::{ActionError, ActionErrorKind, METRIC_POST_ACTION_TOTAL, PostAction};
