use crate::domain::entities::{
    ApplicationStatus, Book, BookApplication, BookMember, BookSummary,
};
use crate::domain::ports::book_repository::BookRepository;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::infrastructure::persistence::{Database, STATUS_ACTIVE, STATUS_DELETED};
use async_trait::async_trait;
use sqlx::any::AnyRow;
use sqlx::{AnyConnection, Row};
use std::collections::HashSet;

fn application_from_row(row: &AnyRow) -> ApiResult<BookApplication> {
    let status: String = row.try_get("status")?;
    Ok(BookApplication {
        id: row.try_get("id")?,
        book_id: row.try_get("book_id")?,
        owner_id: row.try_get("owner_id")?,
        applicant_id: row.try_get("applicant_id")?,
        comment: row.try_get("comment")?,
        status: status.parse().map_err(ApiError::Internal)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

// Internal helpers
impl Database {
    /// Insert a book and its owner as admin member on an open connection or
    /// transaction.
    pub(crate) async fn insert_book_internal(
        &self,
        conn: &mut AnyConnection,
        book: &Book,
    ) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO books (id, owner_id, title, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&book.id)
        .bind(&book.owner_id)
        .bind(&book.title)
        .bind(STATUS_ACTIVE)
        .bind(&book.created_at)
        .bind(&book.updated_at)
        .execute(&mut *conn)
        .await?;

        Self::insert_member_internal(conn, &book.id, &book.owner_id, true, &book.created_at)
            .await
    }

    async fn insert_member_internal(
        conn: &mut AnyConnection,
        book_id: &str,
        user_id: &str,
        admin: bool,
        created_at: &str,
    ) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO book_members (book_id, user_id, is_admin, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(book_id)
        .bind(user_id)
        .bind(if admin { 1i64 } else { 0i64 })
        .bind(created_at)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl BookRepository for Database {
    async fn create_book(&self, book: &Book) -> ApiResult<()> {
        let mut tx = self.pool.begin().await?;
        self.insert_book_internal(&mut *tx, book).await?;
        tx.commit().await?;

        tracing::info!(
            "Book created: id={}, owner={}, title={}",
            book.id,
            book.owner_id,
            book.title
        );
        Ok(())
    }

    async fn get_active_book(&self, book_id: &str) -> ApiResult<Option<Book>> {
        let row = sqlx::query(
            "SELECT id, owner_id, title, status, created_at, updated_at
             FROM books
             WHERE id = ? AND status = ?",
        )
        .bind(book_id)
        .bind(STATUS_ACTIVE)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            Ok(Some(Book {
                id: row.try_get("id")?,
                owner_id: row.try_get("owner_id")?,
                title: row.try_get("title")?,
                active: true,
                created_at: row.try_get("created_at")?,
                updated_at: row.try_get("updated_at")?,
            }))
        } else {
            Ok(None)
        }
    }

    async fn list_user_books(
        &self,
        user_id: &str,
        admin_only: bool,
    ) -> ApiResult<Vec<BookSummary>> {
        let mut sql = String::from(
            "SELECT b.id, b.title, b.owner_id, m.is_admin, u.nickname AS owner_nickname
             FROM book_members m
             INNER JOIN books b ON b.id = m.book_id
             INNER JOIN users u ON u.id = b.owner_id
             WHERE m.user_id = ? AND b.status = ?",
        );
        if admin_only {
            sql.push_str(" AND m.is_admin = 1");
        }
        sql.push_str(" ORDER BY m.is_admin DESC, b.created_at ASC");

        let rows = sqlx::query(&sql)
            .bind(user_id)
            .bind(STATUS_ACTIVE)
            .fetch_all(&self.pool)
            .await?;

        let mut books = Vec::with_capacity(rows.len());
        for row in rows {
            books.push(BookSummary {
                id: row.try_get("id")?,
                title: row.try_get("title")?,
                admin: row.try_get::<i64, _>("is_admin")? == 1,
                owner_id: row.try_get("owner_id")?,
                owner_nickname: row.try_get("owner_nickname")?,
            });
        }

        Ok(books)
    }

    async fn count_owned_books(&self, user_id: &str) -> ApiResult<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) as count FROM books WHERE owner_id = ? AND status = ?",
        )
        .bind(user_id)
        .bind(STATUS_ACTIVE)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get("count")?)
    }

    async fn soft_delete_book(&self, book_id: &str) -> ApiResult<()> {
        sqlx::query("UPDATE books SET status = ?, updated_at = ? WHERE id = ?")
            .bind(STATUS_DELETED)
            .bind(chrono::Utc::now().to_rfc3339())
            .bind(book_id)
            .execute(&self.pool)
            .await?;

        tracing::info!("Book removed: id={}", book_id);
        Ok(())
    }

    async fn update_book(
        &self,
        book_id: &str,
        title: &str,
        members: Option<&[String]>,
    ) -> ApiResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE books SET title = ?, updated_at = ? WHERE id = ?")
            .bind(title)
            .bind(chrono::Utc::now().to_rfc3339())
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        if let Some(members) = members {
            let keep: HashSet<&str> = members.iter().map(String::as_str).collect();
            let rows = sqlx::query("SELECT user_id FROM book_members WHERE book_id = ?")
                .bind(book_id)
                .fetch_all(&mut *tx)
                .await?;

            for row in rows {
                let user_id: String = row.try_get("user_id")?;
                if keep.contains(user_id.as_str()) {
                    continue;
                }
                sqlx::query("DELETE FROM book_members WHERE book_id = ? AND user_id = ?")
                    .bind(book_id)
                    .bind(&user_id)
                    .execute(&mut *tx)
                    .await?;
                tracing::info!("Member removed: book={}, user={}", book_id, user_id);
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn is_member(&self, book_id: &str, user_id: &str) -> ApiResult<bool> {
        let row = sqlx::query(
            "SELECT COUNT(*) as count FROM book_members WHERE book_id = ? AND user_id = ?",
        )
        .bind(book_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let count: i64 = row.try_get("count")?;
        Ok(count > 0)
    }

    async fn list_member_ids(&self, book_id: &str) -> ApiResult<Vec<String>> {
        let rows = sqlx::query("SELECT user_id FROM book_members WHERE book_id = ?")
            .bind(book_id)
            .fetch_all(&self.pool)
            .await?;

        let mut ids = Vec::with_capacity(rows.len());
        for row in rows {
            ids.push(row.try_get("user_id")?);
        }
        Ok(ids)
    }

    async fn list_members(&self, book_id: &str) -> ApiResult<Vec<BookMember>> {
        let rows = sqlx::query(
            "SELECT u.id, u.nickname, u.avatar, m.is_admin
             FROM book_members m
             INNER JOIN users u ON u.id = m.user_id
             WHERE m.book_id = ?
             ORDER BY m.is_admin DESC, m.created_at ASC",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        let mut members = Vec::with_capacity(rows.len());
        for row in rows {
            members.push(BookMember {
                id: row.try_get("id")?,
                nickname: row.try_get("nickname")?,
                avatar: row.try_get("avatar")?,
                admin: row.try_get::<i64, _>("is_admin")? == 1,
            });
        }
        Ok(members)
    }

    async fn add_member(&self, book_id: &str, user_id: &str) -> ApiResult<()> {
        let mut conn = self.pool.acquire().await?;
        let now = chrono::Utc::now().to_rfc3339();
        Self::insert_member_internal(&mut conn, book_id, user_id, false, &now).await?;

        tracing::info!("Member added: book={}, user={}", book_id, user_id);
        Ok(())
    }

    async fn remove_member(&self, book_id: &str, user_id: &str) -> ApiResult<bool> {
        let result = sqlx::query("DELETE FROM book_members WHERE book_id = ? AND user_id = ?")
            .bind(book_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            tracing::info!("Member removed: book={}, user={}", book_id, user_id);
        }
        Ok(removed)
    }

    async fn create_application(&self, application: &BookApplication) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO book_applications
                 (id, book_id, owner_id, applicant_id, comment, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&application.id)
        .bind(&application.book_id)
        .bind(&application.owner_id)
        .bind(&application.applicant_id)
        .bind(&application.comment)
        .bind(application.status.to_string())
        .bind(&application.created_at)
        .bind(&application.updated_at)
        .execute(&self.pool)
        .await?;

        tracing::info!(
            "Application created: id={}, book={}, applicant={}",
            application.id,
            application.book_id,
            application.applicant_id
        );
        Ok(())
    }

    async fn get_application(&self, id: &str) -> ApiResult<Option<BookApplication>> {
        let row = sqlx::query(
            "SELECT id, book_id, owner_id, applicant_id, comment, status, created_at, updated_at
             FROM book_applications
             WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(application_from_row).transpose()
    }

    async fn list_applications(&self, book_id: &str) -> ApiResult<Vec<BookApplication>> {
        let rows = sqlx::query(
            "SELECT id, book_id, owner_id, applicant_id, comment, status, created_at, updated_at
             FROM book_applications
             WHERE book_id = ?
             ORDER BY created_at DESC",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(application_from_row).collect()
    }

    async fn close_application(
        &self,
        application: &BookApplication,
        status: ApplicationStatus,
    ) -> ApiResult<()> {
        let now = chrono::Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE book_applications SET status = ?, updated_at = ?
             WHERE id = ? AND status = ?",
        )
        .bind(status.to_string())
        .bind(&now)
        .bind(&application.id)
        .bind(ApplicationStatus::Pending.to_string())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::Conflict(
                "Application has already been examined".to_string(),
            ));
        }

        if status == ApplicationStatus::Approved {
            sqlx::query(
                "INSERT INTO book_members (book_id, user_id, is_admin, created_at)
                 VALUES (?, ?, 0, ?)
                 ON CONFLICT (book_id, user_id) DO NOTHING",
            )
            .bind(&application.book_id)
            .bind(&application.applicant_id)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!("Application {}: id={}", status, application.id);
        Ok(())
    }
}
