use time::OffsetDateTime;

use crate::application::repos::RepoError;
use crate::domain::entities::PostRecord;
use crate::domain::types::{PostId, UserId};

#[derive(sqlx::FromRow)]
pub(crate) struct PostRow {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) published: bool,
    pub(crate) user_id: String,
    pub(crate) created_at: OffsetDateTime,
    pub(crate) updated_at: OffsetDateTime,
}

impl TryFrom<PostRow> for PostRecord {
    type Error = RepoError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        let id = PostId::parse(&row.id).map_err(|err| RepoError::Integrity {
            message: format!("stored post id is invalid: {err}"),
        })?;
        let user_id = UserId::parse(&row.user_id).map_err(|err| RepoError::Integrity {
            message: format!("stored owner id for post `{id}` is invalid: {err}"),
        })?;
        Ok(Self {
            id,
            title: row.title,
            content: row.content,
            published: row.published,
            user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub(crate) const POST_COLUMNS: &str = "id, title, content, published, user_id, created_at, updated_at";
