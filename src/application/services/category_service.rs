use crate::domain::entities::{
    validate_category_title, Category, CategoryQuery, CategoryRequest, CategoryResponse,
    DEFAULT_CATEGORY_ICON,
};
use crate::domain::ports::category_repository::CategoryRepository;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use std::sync::Arc;

#[derive(Clone)]
pub struct CategoryService {
    category_repo: Arc<dyn CategoryRepository>,
}

fn icon_or_default(icon: Option<String>) -> String {
    icon.map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty())
        .unwrap_or_else(|| DEFAULT_CATEGORY_ICON.to_string())
}

impl CategoryService {
    pub fn new(category_repo: Arc<dyn CategoryRepository>) -> Self {
        Self { category_repo }
    }

    pub async fn list(&self, user_id: &str, query: &CategoryQuery) -> ApiResult<Vec<CategoryResponse>> {
        let categories = self
            .category_repo
            .list_categories(user_id, query.kind, query.custom)
            .await?;
        Ok(categories.into_iter().map(CategoryResponse::from).collect())
    }

    pub async fn create(&self, user_id: &str, request: CategoryRequest) -> ApiResult<CategoryResponse> {
        let title = validate_category_title(&request.title)?;
        let category = Category::new(
            user_id.to_string(),
            request.kind,
            title,
            icon_or_default(request.icon),
        );
        self.category_repo.create_category(&category).await?;
        Ok(category.into())
    }

    /// Active custom category owned by `user_id`; system categories are read-only.
    async fn owned_category(&self, user_id: &str, id: &str) -> ApiResult<Category> {
        let category = self
            .category_repo
            .get_category(id)
            .await?
            .filter(|c| c.active)
            .ok_or_else(|| ApiError::NotFound(format!("Category {} not found", id)))?;

        if category.owner_id.as_deref() != Some(user_id) {
            return Err(ApiError::Forbidden(
                "Only your own categories can be changed".to_string(),
            ));
        }
        Ok(category)
    }

    pub async fn update(
        &self,
        user_id: &str,
        id: &str,
        request: CategoryRequest,
    ) -> ApiResult<CategoryResponse> {
        let title = validate_category_title(&request.title)?;
        let mut category = self.owned_category(user_id, id).await?;
        let icon = icon_or_default(request.icon);

        self.category_repo
            .update_category(id, request.kind, &title, &icon)
            .await?;

        category.kind = request.kind;
        category.title = title;
        category.icon = icon;
        Ok(category.into())
    }

    pub async fn remove(&self, user_id: &str, id: &str) -> ApiResult<()> {
        self.owned_category(user_id, id).await?;
        self.category_repo.soft_delete_category(id).await
    }

    /// Category usable by `user_id` for new records
    pub async fn visible(&self, user_id: &str, id: &str) -> ApiResult<Category> {
        self.category_repo
            .get_category(id)
            .await?
            .filter(|c| c.is_visible_to(user_id))
            .ok_or_else(|| ApiError::NotFound(format!("Category {} not found", id)))
    }
}
