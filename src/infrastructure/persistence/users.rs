use crate::domain::entities::{Book, User};
use crate::domain::ports::user_repository::UserRepository;
use crate::infrastructure::http::middleware::error::ApiResult;
use crate::infrastructure::persistence::{Database, STATUS_ACTIVE};
use async_trait::async_trait;
use sqlx::any::AnyRow;
use sqlx::Row;

fn user_from_row(row: &AnyRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        nickname: row.try_get("nickname")?,
        avatar: row.try_get("avatar")?,
        active: row.try_get::<i64, _>("status")? == STATUS_ACTIVE,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl UserRepository for Database {
    async fn get_user_by_id(&self, id: &str) -> ApiResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, nickname, avatar, status, created_at, updated_at
             FROM users
             WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn find_user_by_open_account(
        &self,
        provider: &str,
        openid: &str,
    ) -> ApiResult<Option<User>> {
        let row = sqlx::query(
            "SELECT u.id, u.nickname, u.avatar, u.status, u.created_at, u.updated_at
             FROM open_accounts o
             INNER JOIN users u ON u.id = o.user_id
             WHERE o.provider = ? AND o.openid = ?",
        )
        .bind(provider)
        .bind(openid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn register_user(
        &self,
        user: &User,
        provider: &str,
        openid: &str,
        first_book: &Book,
    ) -> ApiResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO users (id, nickname, avatar, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.nickname)
        .bind(&user.avatar)
        .bind(STATUS_ACTIVE)
        .bind(&user.created_at)
        .bind(&user.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO open_accounts (provider, openid, user_id, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(provider)
        .bind(openid)
        .bind(&user.id)
        .bind(&user.created_at)
        .execute(&mut *tx)
        .await?;

        self.insert_book_internal(&mut *tx, first_book).await?;

        tx.commit().await?;

        tracing::info!(
            "User registered: id={}, provider={}, first_book={}",
            user.id,
            provider,
            first_book.id
        );
        Ok(())
    }
}
