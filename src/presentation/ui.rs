//! View models and askama templates for the post pages.

mod editor;
mod layout;
mod posts;
mod toast;

pub use editor::*;
pub use layout::*;
pub use posts::*;
pub use toast::*;
