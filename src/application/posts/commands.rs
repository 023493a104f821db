use metrics::counter;
use tracing::{error, info, warn};

use crate::application::repos::PostMatch;
use crate::domain::entities::PostRecord;
use crate::domain::posts::{CreatePostInput, DeletePostInput, PublishPostInput};

use super::service::PostActions;
use super::types::{ActionError, METRIC_POST_ACTION_TOTAL, PostAction};

impl PostActions {
    pub async fn create(&self, input: CreatePostInput) -> Result<PostRecord, ActionError> {
        let result = self.insert(input).await;
        record_outcome(PostAction::Create, &result);
        result
    }

    pub async fn publish(&self, input: PublishPostInput) -> Result<PostRecord, ActionError> {
        let result = self.set_published(input).await;
        record_outcome(PostAction::Publish, &result);
        result
    }

    pub async fn delete(&self, input: DeletePostInput) -> Result<PostRecord, ActionError> {
        let result = self.remove(input).await;
        record_outcome(PostAction::Delete, &result);
        result
    }

    async fn insert(&self, input: CreatePostInput) -> Result<PostRecord, ActionError> {
        let post = input.parse()?;
        Ok(self.writer.insert_post(post).await?)
    }

    async fn set_published(&self, input: PublishPostInput) -> Result<PostRecord, ActionError> {
        if input.id.is_none() {
            return Err(ActionError::MissingPrecondition("post id"));
        }
        let change = input.parse()?;
        let matcher = PostMatch {
            id: change.id,
            owner: change.user_id,
        };
        self.writer
            .update_published(&matcher, change.published)
            .await?
            .ok_or(ActionError::NotFound(matcher.id))
    }

    async fn remove(&self, input: DeletePostInput) -> Result<PostRecord, ActionError> {
        if input.id.is_none() {
            return Err(ActionError::MissingPrecondition("post id"));
        }
        if input.user_id.is_none() {
            return Err(ActionError::MissingPrecondition("user id"));
        }
        let target = input.parse()?;
        let matcher = PostMatch::owned(target.id, target.user_id);
        self.writer
            .delete_post(&matcher)
            .await?
            .ok_or(ActionError::NotFound(matcher.id))
    }
}

fn record_outcome(action: PostAction, result: &Result<PostRecord, ActionError>) {
    let outcome = match result {
        Ok(post) => {
            info!(
                target = "application::posts::record_outcome",
                action = action.as_str(),
                post_id = %post.id,
                user_id = %post.user_id,
                "post action succeeded"
            );
            "ok"
        }
        Err(err @ ActionError::Store(_)) => {
            error!(
                target = "application::posts::record_outcome",
                action = action.as_str(),
                error = %err,
                "post action failed in store"
            );
            err.kind().as_str()
        }
        Err(err) => {
            warn!(
                target = "application::posts::record_outcome",
                action = action.as_str(),
                kind = err.kind().as_str(),
                error = %err,
                "post action rejected"
            );
            err.kind().as_str()
        }
    };

    counter!(METRIC_POST_ACTION_TOTAL, "action" => action.as_str(), "outcome" => outcome)
        .increment(1);
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use time::OffsetDateTime;

    use super::*;
    use crate::application::posts::ActionErrorKind;
    use crate::application::repos::{PostsRepo, PostsWriteRepo, RepoError};
    use crate::domain::posts::NewPost;
    use crate::domain::types::{PostId, UserId};

    #[derive(Default)]
    struct MemoryPosts {
        rows: Mutex<Vec<PostRecord>>,
        calls: Mutex<usize>,
        fail_writes: bool,
    }

    impl MemoryPosts {
        fn failing() -> Self {
            Self {
                fail_writes: true,
                ..Self::default()
            }
        }

        fn seed(&self, id: &str, owner: &str, published: bool) {
            let now = OffsetDateTime::now_utc();
            self.rows.lock().unwrap().push(PostRecord {
                id: PostId::parse(id).unwrap(),
                title: format!("post {id}"),
                content: String::new(),
                published,
                user_id: UserId::parse(owner).unwrap(),
                created_at: now,
                updated_at: now,
            });
        }

        fn store_calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }

        fn published(&self, id: &str) -> Option<bool> {
            self.rows
                .lock()
                .unwrap()
                .iter()
                .find(|row| row.id.as_str() == id)
                .map(|row| row.published)
        }

        fn touch(&self) -> Result<(), RepoError> {
            *self.calls.lock().unwrap() += 1;
            if self.fail_writes {
                return Err(RepoError::from_persistence("connection reset"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl PostsRepo for MemoryPosts {
        async fn find_by_id(&self, id: &PostId) -> Result<Option<PostRecord>, RepoError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|row| &row.id == id)
                .cloned())
        }

        async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<PostRecord>, RepoError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|row| &row.user_id == owner)
                .cloned()
                .collect())
        }
    }

    #[async_trait]
    impl PostsWriteRepo for MemoryPosts {
        async fn insert_post(&self, post: NewPost) -> Result<PostRecord, RepoError> {
            self.touch()?;
            let now = OffsetDateTime::now_utc();
            let mut rows = self.rows.lock().unwrap();
            let record = PostRecord {
                id: PostId::parse(&format!("p{}", rows.len() + 1)).unwrap(),
                title: post.title,
                content: post.content,
                published: post.published,
                user_id: post.user_id,
                created_at: now,
                updated_at: now,
            };
            rows.push(record.clone());
            Ok(record)
        }

        async fn update_published(
            &self,
            matcher: &PostMatch,
            published: bool,
        ) -> Result<Option<PostRecord>, RepoError> {
            self.touch()?;
            let mut rows = self.rows.lock().unwrap();
            Ok(rows.iter_mut().find(|row| matcher.matches(row)).map(|row| {
                row.published = published;
                row.clone()
            }))
        }

        async fn delete_post(&self, matcher: &PostMatch) -> Result<Option<PostRecord>, RepoError> {
            self.touch()?;
            let mut rows = self.rows.lock().unwrap();
            let position = rows.iter().position(|row| matcher.matches(row));
            Ok(position.map(|index| rows.remove(index)))
        }
    }

    fn actions(store: &Arc<MemoryPosts>) -> PostActions {
        PostActions::new(store.clone(), store.clone())
    }

    #[tokio::test]
    async fn create_returns_validated_record() {
        let store = Arc::new(MemoryPosts::default());
        let post = actions(&store)
            .create(CreatePostInput {
                title: Some("Hello".into()),
                content: None,
                published: Some(false),
                user_id: Some("u1".into()),
            })
            .await
            .expect("created");

        assert_eq!(post.title, "Hello");
        assert_eq!(post.content, "");
        assert!(!post.published);
        assert_eq!(post.user_id.as_str(), "u1");
        assert_eq!(store.store_calls(), 1);
    }

    #[tokio::test]
    async fn invalid_create_never_reaches_store() {
        let store = Arc::new(MemoryPosts::default());
        let err = actions(&store)
            .create(CreatePostInput {
                title: Some(" ".into()),
                user_id: Some("u1".into()),
                ..CreatePostInput::default()
            })
            .await
            .expect_err("blank title");

        assert_eq!(err.kind(), ActionErrorKind::Validation);
        assert_eq!(err.fields(), vec!["title"]);
        assert_eq!(store.store_calls(), 0);
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_store_error() {
        let store = Arc::new(MemoryPosts::failing());
        let err = actions(&store)
            .create(CreatePostInput {
                title: Some("Hello".into()),
                user_id: Some("u1".into()),
                ..CreatePostInput::default()
            })
            .await
            .expect_err("store down");

        assert_eq!(err.kind(), ActionErrorKind::Store);
    }

    #[tokio::test]
    async fn publish_only_touches_the_target() {
        let store = Arc::new(MemoryPosts::default());
        store.seed("p1", "u1", false);
        store.seed("p2", "u1", false);

        let post = actions(&store)
            .publish(PublishPostInput {
                id: Some("p1".into()),
                published: Some(true),
                user_id: None,
            })
            .await
            .expect("published");

        assert!(post.published);
        assert_eq!(store.published("p1"), Some(true));
        assert_eq!(store.published("p2"), Some(false));
    }

    #[tokio::test]
    async fn publish_with_foreign_owner_is_not_found() {
        let store = Arc::new(MemoryPosts::default());
        store.seed("p1", "u1", false);

        let err = actions(&store)
            .publish(PublishPostInput {
                id: Some("p1".into()),
                published: Some(true),
                user_id: Some("u2".into()),
            })
            .await
            .expect_err("owner mismatch");

        assert_eq!(err.kind(), ActionErrorKind::NotFound);
        assert_eq!(store.published("p1"), Some(false));
    }

    #[tokio::test]
    async fn delete_without_user_skips_store() {
        let store = Arc::new(MemoryPosts::default());
        store.seed("p1", "u1", false);

        let err = actions(&store)
            .delete(DeletePostInput {
                id: Some("p1".into()),
                user_id: None,
            })
            .await
            .expect_err("no user");

        assert_eq!(err.kind(), ActionErrorKind::MissingPrecondition);
        assert_eq!(store.store_calls(), 0);
        assert!(store.published("p1").is_some());
    }

    #[tokio::test]
    async fn publish_without_id_skips_store() {
        let store = Arc::new(MemoryPosts::default());
        store.seed("p1", "u1", false);

        let err = actions(&store)
            .publish(PublishPostInput {
                id: None,
                published: Some(true),
                user_id: Some("u1".into()),
            })
            .await
            .expect_err("no post id");

        assert_eq!(err.kind(), ActionErrorKind::MissingPrecondition);
        assert_eq!(store.store_calls(), 0);
        assert_eq!(store.published("p1"), Some(false));
    }

    #[tokio::test]
    async fn delete_without_id_skips_store() {
        let store = Arc::new(MemoryPosts::default());
        store.seed("p1", "u1", false);

        let err = actions(&store)
            .delete(DeletePostInput {
                id: None,
                user_id: Some("u1".into()),
            })
            .await
            .expect_err("no post id");

        assert_eq!(err.kind(), ActionErrorKind::MissingPrecondition);
        assert_eq!(store.store_calls(), 0);
        assert!(store.published("p1").is_some());
    }

    #[tokio::test]
    async fn delete_removes_matching_row() {
        let store = Arc::new(MemoryPosts::default());
        store.seed("p1", "u1", true);

        let removed = actions(&store)
            .delete(DeletePostInput {
                id: Some("p1".into()),
                user_id: Some("u1".into()),
            })
            .await
            .expect("deleted");

        assert_eq!(removed.id.as_str(), "p1");
        assert!(store.published("p1").is_none());
    }
}
