use crate::domain::entities::{Category, EntryKind};
use crate::domain::ports::category_repository::CategoryRepository;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::infrastructure::persistence::{Database, STATUS_ACTIVE, STATUS_DELETED};
use async_trait::async_trait;
use sqlx::any::AnyRow;
use sqlx::Row;

fn category_from_row(row: &AnyRow) -> ApiResult<Category> {
    let kind: String = row.try_get("kind")?;
    Ok(Category {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id").ok().flatten(),
        kind: kind.parse().map_err(ApiError::Internal)?,
        title: row.try_get("title")?,
        icon: row.try_get("icon")?,
        active: row.try_get::<i64, _>("status")? == STATUS_ACTIVE,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl CategoryRepository for Database {
    async fn create_category(&self, category: &Category) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO categories (id, owner_id, kind, title, icon, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&category.id)
        .bind(&category.owner_id)
        .bind(category.kind.to_string())
        .bind(&category.title)
        .bind(&category.icon)
        .bind(STATUS_ACTIVE)
        .bind(&category.created_at)
        .bind(&category.updated_at)
        .execute(&self.pool)
        .await?;

        tracing::info!(
            "Category created: id={}, kind={}, title={}",
            category.id,
            category.kind,
            category.title
        );
        Ok(())
    }

    async fn get_category(&self, id: &str) -> ApiResult<Option<Category>> {
        let row = sqlx::query(
            "SELECT id, owner_id, kind, title, icon, status, created_at, updated_at
             FROM categories
             WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(category_from_row).transpose()
    }

    async fn list_categories(
        &self,
        user_id: &str,
        kind: Option<EntryKind>,
        custom_only: bool,
    ) -> ApiResult<Vec<Category>> {
        let mut sql = String::from(
            "SELECT id, owner_id, kind, title, icon, status, created_at, updated_at
             FROM categories
             WHERE status = ?",
        );
        if custom_only {
            sql.push_str(" AND owner_id = ?");
        } else {
            sql.push_str(" AND (owner_id = ? OR owner_id IS NULL)");
        }
        if kind.is_some() {
            sql.push_str(" AND kind = ?");
        }
        // System categories first, then the user's own in creation order
        sql.push_str(" ORDER BY owner_id IS NOT NULL, created_at ASC, id ASC");

        let mut query = sqlx::query(&sql).bind(STATUS_ACTIVE).bind(user_id);
        if let Some(kind) = kind {
            query = query.bind(kind.to_string());
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(category_from_row).collect()
    }

    async fn update_category(
        &self,
        id: &str,
        kind: EntryKind,
        title: &str,
        icon: &str,
    ) -> ApiResult<()> {
        sqlx::query(
            "UPDATE categories SET kind = ?, title = ?, icon = ?, updated_at = ? WHERE id = ?",
        )
        .bind(kind.to_string())
        .bind(title)
        .bind(icon)
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;

        tracing::info!("Category updated: id={}, title={}", id, title);
        Ok(())
    }

    async fn soft_delete_category(&self, id: &str) -> ApiResult<()> {
        sqlx::query("UPDATE categories SET status = ?, updated_at = ? WHERE id = ?")
            .bind(STATUS_DELETED)
            .bind(chrono::Utc::now().to_rfc3339())
            .bind(id)
            .execute(&self.pool)
            .await?;

        tracing::info!("Category removed: id={}", id);
        Ok(())
    }
}
