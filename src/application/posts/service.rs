use std::sync::Arc;

use crate::application::repos::{PostsRepo, PostsWriteRepo};

/// Entry point for the create, publish and delete post actions.
///
/// Every action validates its input first and issues at most one mutation.
#[derive(Clone)]
pub struct PostActions {
    pub(crate) reader: Arc<dyn PostsRepo>,
    pub(crate) writer: Arc<dyn PostsWriteRepo>,
}

impl PostActions {
    pub fn new(reader: Arc<dyn PostsRepo>, writer: Arc<dyn PostsWriteRepo>) -> Self {
        Self { reader, writer }
    }
}
