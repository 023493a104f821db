use crate::domain::entities::PostRecord;
use crate::domain::types::{PostId, UserId};

use super::service::PostActions;
use super::types::ActionError;

impl PostActions {
    /// Load a post for display. Rows owned by someone else read as absent.
    pub async fn load_owned(
        &self,
        id: &PostId,
        owner: &UserId,
    ) -> Result<Option<PostRecord>, ActionError> {
        let post = self.reader.find_by_id(id).await?;
        Ok(post.filter(|post| &post.user_id == owner))
    }

    pub async fn list_owned(&self, owner: &UserId) -> Result<Vec<PostRecord>, ActionError> {
        Ok(self.reader.list_by_owner(owner).await?)
    }
}
