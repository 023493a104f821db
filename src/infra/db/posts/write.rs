use async_trait::async_trait;
use uuid::Uuid;

use crate::application::repos::{PostMatch, PostsWriteRepo, RepoError};
use crate::domain::entities::PostRecord;
use crate::domain::posts::NewPost;

use super::super::{PostgresRepositories, map_sqlx_error};
use super::types::{POST_COLUMNS, PostRow};

#[async_trait]
impl PostsWriteRepo for PostgresRepositories {
    async fn insert_post(&self, post: NewPost) -> Result<PostRecord, RepoError> {
        let NewPost {
            title,
            content,
            published,
            user_id,
        } = post;

        let sql = format!(
            "INSERT INTO posts (id, title, content, published, user_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {POST_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(Uuid::new_v4().to_string())
            .bind(title)
            .bind(content)
            .bind(published)
            .bind(user_id.as_str())
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        PostRecord::try_from(row)
    }

    async fn update_published(
        &self,
        matcher: &PostMatch,
        published: bool,
    ) -> Result<Option<PostRecord>, RepoError> {
        let sql = format!(
            "UPDATE posts SET published = $2, updated_at = now() \
             WHERE id = $1 AND ($3::text IS NULL OR user_id = $3) \
             RETURNING {POST_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(matcher.id.as_str())
            .bind(published)
            .bind(matcher.owner.as_ref().map(|owner| owner.as_str()))
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        row.map(PostRecord::try_from).transpose()
    }

    async fn delete_post(&self, matcher: &PostMatch) -> Result<Option<PostRecord>, RepoError> {
        let sql = format!(
            "DELETE FROM posts \
             WHERE id = $1 AND ($2::text IS NULL OR user_id = $2) \
             RETURNING {POST_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(matcher.id.as_str())
            .bind(matcher.owner.as_ref().map(|owner| owner.as_str()))
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        row.map(PostRecord::try_from).transpose()
    }
}
