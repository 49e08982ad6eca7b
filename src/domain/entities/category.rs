use super::record::EntryKind;
use crate::domain::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const CATEGORY_TITLE_MAX_CHARS: usize = 4;
pub const DEFAULT_CATEGORY_ICON: &str = "icon-mingxi";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    /// `None` for system categories shared by every user
    pub owner_id: Option<String>,
    pub kind: EntryKind,
    pub title: String,
    pub icon: String,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Category {
    pub fn new(owner_id: String, kind: EntryKind, title: String, icon: String) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id: Some(owner_id),
            kind,
            title,
            icon,
            active: true,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn is_visible_to(&self, user_id: &str) -> bool {
        self.active
            && self
                .owner_id
                .as_deref()
                .map_or(true, |owner| owner == user_id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryResponse {
    pub id: String,
    pub kind: EntryKind,
    pub title: String,
    pub icon: String,
    pub custom: bool,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            custom: category.owner_id.is_some(),
            id: category.id,
            kind: category.kind,
            title: category.title,
            icon: category.icon,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRequest {
    pub kind: EntryKind,
    pub title: String,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryQuery {
    pub kind: Option<EntryKind>,
    #[serde(default)]
    pub custom: bool,
}

pub fn validate_category_title(title: &str) -> DomainResult<String> {
    let title = title.trim();
    let length = title.chars().count();
    if length == 0 || length > CATEGORY_TITLE_MAX_CHARS {
        return Err(DomainError::ValidationError(format!(
            "Category title must be between 1 and {} characters",
            CATEGORY_TITLE_MAX_CHARS
        )));
    }
    Ok(title.to_string())
}
