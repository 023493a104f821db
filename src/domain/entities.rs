//! Domain entities mirrored from persistent storage.

use postdesk_api_types::PostView;
use serde::Serialize;
use time::OffsetDateTime;

use crate::domain::types::{PostId, UserId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostRecord {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub published: bool,
    pub user_id: UserId,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<PostRecord> for PostView {
    fn from(record: PostRecord) -> Self {
        Self {
            id: record.id.into_inner(),
            title: record.title,
            content: record.content,
            published: record.published,
            user_id: record.user_id.into_inner(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}
