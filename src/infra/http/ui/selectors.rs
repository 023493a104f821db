//! CSS selectors targeted by datastar patches.

pub const TOAST_STACK: &str = "[data-role=\"toast-stack\"]";
pub const SESSION_BADGE: &str = "[data-role=\"session-badge\"]";
pub const CREATE_FORM: &str = "[data-role=\"create-form\"]";
pub const POSTS_PANEL: &str = "[data-role=\"posts-panel\"]";
pub const POST_EDITOR: &str = "[data-role=\"post-editor\"]";
pub const DELETE_DIALOG: &str = "[data-role=\"delete-dialog\"]";
