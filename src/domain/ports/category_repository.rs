use crate::domain::entities::{Category, EntryKind};
use crate::infrastructure::http::middleware::error::ApiResult;
use async_trait::async_trait;

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create_category(&self, category: &Category) -> ApiResult<()>;

    async fn get_category(&self, id: &str) -> ApiResult<Option<Category>>;

    /// Active categories of the user, plus system ones unless `custom_only`.
    async fn list_categories(
        &self,
        user_id: &str,
        kind: Option<EntryKind>,
        custom_only: bool,
    ) -> ApiResult<Vec<Category>>;

    async fn update_category(
        &self,
        id: &str,
        kind: EntryKind,
        title: &str,
        icon: &str,
    ) -> ApiResult<()>;

    async fn soft_delete_category(&self, id: &str) -> ApiResult<()>;
}
