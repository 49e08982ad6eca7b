use crate::domain::entities::{
    describe_date, CategoryShare, DayTotals, EntryKind, Record, RecordAnnex, RecordDetail,
    RecordListItem,
};
use crate::domain::ports::record_repository::RecordRepository;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::infrastructure::persistence::{Database, STATUS_ACTIVE, STATUS_DELETED};
use async_trait::async_trait;
use sqlx::any::AnyRow;
use sqlx::{AnyConnection, Row};

const LIST_ITEM_COLUMNS: &str =
    "r.id, r.amount_cents, r.comment, r.kind, c.icon, c.title AS category";

fn kind_from_row(row: &AnyRow) -> ApiResult<EntryKind> {
    let kind: String = row.try_get("kind")?;
    kind.parse().map_err(ApiError::Internal)
}

fn list_item_from_row(row: &AnyRow) -> ApiResult<RecordListItem> {
    Ok(RecordListItem {
        id: row.try_get("id")?,
        amount_cents: row.try_get("amount_cents")?,
        comment: row.try_get("comment")?,
        kind: kind_from_row(row)?,
        icon: row.try_get("icon")?,
        category: row.try_get("category")?,
    })
}

fn day_totals_from_row(row: &AnyRow, date: String) -> ApiResult<DayTotals> {
    Ok(DayTotals {
        date,
        revenue_cents: row.try_get("revenue")?,
        pay_cents: row.try_get("pay")?,
    })
}

// Internal helpers
impl Database {
    async fn insert_annexes_internal(
        conn: &mut AnyConnection,
        record_id: &str,
        images: &[String],
    ) -> ApiResult<()> {
        for image in images {
            let annex = RecordAnnex::new(record_id, image.clone());
            sqlx::query(
                "INSERT INTO record_annexes (id, record_id, asset, created_at)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(&annex.id)
            .bind(&annex.record_id)
            .bind(&annex.asset)
            .bind(&annex.created_at)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl RecordRepository for Database {
    async fn create_record(&self, record: &Record, images: &[String]) -> ApiResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO records
                 (id, book_id, category_id, user_id, kind, amount_cents, oper_date, comment,
                  status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.book_id)
        .bind(&record.category_id)
        .bind(&record.user_id)
        .bind(record.kind.to_string())
        .bind(record.amount_cents)
        .bind(&record.oper_date)
        .bind(&record.comment)
        .bind(STATUS_ACTIVE)
        .bind(&record.created_at)
        .bind(&record.updated_at)
        .execute(&mut *tx)
        .await?;

        Self::insert_annexes_internal(&mut *tx, &record.id, images).await?;

        tx.commit().await?;

        tracing::info!(
            "Record created: id={}, book={}, kind={}, amount_cents={}",
            record.id,
            record.book_id,
            record.kind,
            record.amount_cents
        );
        Ok(())
    }

    async fn get_active_record(&self, id: &str) -> ApiResult<Option<Record>> {
        let row = sqlx::query(
            "SELECT id, book_id, category_id, user_id, kind, amount_cents, oper_date, comment,
                    created_at, updated_at
             FROM records
             WHERE id = ? AND status = ?",
        )
        .bind(id)
        .bind(STATUS_ACTIVE)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            Ok(Some(Record {
                id: row.try_get("id")?,
                book_id: row.try_get("book_id")?,
                category_id: row.try_get("category_id")?,
                user_id: row.try_get("user_id")?,
                kind: kind_from_row(&row)?,
                amount_cents: row.try_get("amount_cents")?,
                oper_date: row.try_get("oper_date")?,
                comment: row.try_get("comment")?,
                active: true,
                created_at: row.try_get("created_at")?,
                updated_at: row.try_get("updated_at")?,
            }))
        } else {
            Ok(None)
        }
    }

    async fn get_record_detail(&self, id: &str) -> ApiResult<Option<RecordDetail>> {
        let row = sqlx::query(
            "SELECT r.id, r.book_id, r.category_id, r.user_id, r.kind, r.amount_cents,
                    r.oper_date, r.comment, c.title AS category_title, c.icon,
                    u.nickname
             FROM records r
             INNER JOIN categories c ON c.id = r.category_id
             INNER JOIN users u ON u.id = r.user_id
             WHERE r.id = ? AND r.status = ?",
        )
        .bind(id)
        .bind(STATUS_ACTIVE)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let oper_date: String = row.try_get("oper_date")?;
        let images = self.list_annexes(id).await?;

        Ok(Some(RecordDetail {
            id: row.try_get("id")?,
            book_id: row.try_get("book_id")?,
            category_id: row.try_get("category_id")?,
            category_title: row.try_get("category_title")?,
            icon: row.try_get("icon")?,
            kind: kind_from_row(&row)?,
            amount_cents: row.try_get("amount_cents")?,
            date_text: describe_date(&oper_date),
            oper_date,
            comment: row.try_get("comment")?,
            user_id: row.try_get("user_id")?,
            user: row.try_get("nickname")?,
            images,
        }))
    }

    async fn update_record(&self, record: &Record, images: &[String]) -> ApiResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE records
             SET category_id = ?, kind = ?, amount_cents = ?, oper_date = ?, comment = ?,
                 updated_at = ?
             WHERE id = ?",
        )
        .bind(&record.category_id)
        .bind(record.kind.to_string())
        .bind(record.amount_cents)
        .bind(&record.oper_date)
        .bind(&record.comment)
        .bind(&record.updated_at)
        .bind(&record.id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM record_annexes WHERE record_id = ?")
            .bind(&record.id)
            .execute(&mut *tx)
            .await?;

        Self::insert_annexes_internal(&mut *tx, &record.id, images).await?;

        tx.commit().await?;

        tracing::info!("Record updated: id={}", record.id);
        Ok(())
    }

    async fn soft_delete_record(&self, id: &str) -> ApiResult<()> {
        sqlx::query("UPDATE records SET status = ?, updated_at = ? WHERE id = ?")
            .bind(STATUS_DELETED)
            .bind(chrono::Utc::now().to_rfc3339())
            .bind(id)
            .execute(&self.pool)
            .await?;

        tracing::info!("Record removed: id={}", id);
        Ok(())
    }

    async fn list_annexes(&self, record_id: &str) -> ApiResult<Vec<String>> {
        let rows = sqlx::query(
            "SELECT asset FROM record_annexes WHERE record_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(record_id)
        .fetch_all(&self.pool)
        .await?;

        let mut assets = Vec::with_capacity(rows.len());
        for row in rows {
            assets.push(row.try_get("asset")?);
        }
        Ok(assets)
    }

    async fn range_totals(&self, book_id: &str, from: &str, to: &str) -> ApiResult<DayTotals> {
        let row = sqlx::query(
            "SELECT
                 COALESCE(SUM(CASE WHEN kind = 'income' THEN amount_cents ELSE 0 END), 0) AS revenue,
                 COALESCE(SUM(CASE WHEN kind = 'expense' THEN amount_cents ELSE 0 END), 0) AS pay
             FROM records
             WHERE book_id = ? AND status = ? AND oper_date BETWEEN ? AND ?",
        )
        .bind(book_id)
        .bind(STATUS_ACTIVE)
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        day_totals_from_row(&row, String::new())
    }

    async fn day_totals(
        &self,
        book_id: &str,
        from: &str,
        to: &str,
        limit: i64,
        offset: i64,
    ) -> ApiResult<Vec<DayTotals>> {
        let rows = sqlx::query(
            "SELECT oper_date,
                 COALESCE(SUM(CASE WHEN kind = 'income' THEN amount_cents ELSE 0 END), 0) AS revenue,
                 COALESCE(SUM(CASE WHEN kind = 'expense' THEN amount_cents ELSE 0 END), 0) AS pay
             FROM records
             WHERE book_id = ? AND status = ? AND oper_date BETWEEN ? AND ?
             GROUP BY oper_date
             ORDER BY oper_date DESC
             LIMIT ? OFFSET ?",
        )
        .bind(book_id)
        .bind(STATUS_ACTIVE)
        .bind(from)
        .bind(to)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let mut days = Vec::with_capacity(rows.len());
        for row in rows {
            let date: String = row.try_get("oper_date")?;
            days.push(day_totals_from_row(&row, date)?);
        }
        Ok(days)
    }

    async fn records_on(&self, book_id: &str, date: &str) -> ApiResult<Vec<RecordListItem>> {
        let sql = format!(
            "SELECT {}
             FROM records r
             INNER JOIN categories c ON c.id = r.category_id
             WHERE r.book_id = ? AND r.status = ? AND r.oper_date = ?
             ORDER BY r.created_at DESC",
            LIST_ITEM_COLUMNS
        );

        let rows = sqlx::query(&sql)
            .bind(book_id)
            .bind(STATUS_ACTIVE)
            .bind(date)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(list_item_from_row).collect()
    }

    async fn top_records(
        &self,
        book_id: &str,
        kind: EntryKind,
        from: &str,
        to: &str,
        limit: i64,
    ) -> ApiResult<Vec<RecordListItem>> {
        let sql = format!(
            "SELECT {}
             FROM records r
             INNER JOIN categories c ON c.id = r.category_id
             WHERE r.book_id = ? AND r.status = ? AND r.kind = ?
               AND r.oper_date BETWEEN ? AND ?
             ORDER BY r.amount_cents DESC, r.created_at ASC
             LIMIT ?",
            LIST_ITEM_COLUMNS
        );

        let rows = sqlx::query(&sql)
            .bind(book_id)
            .bind(STATUS_ACTIVE)
            .bind(kind.to_string())
            .bind(from)
            .bind(to)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(list_item_from_row).collect()
    }

    async fn category_shares(
        &self,
        book_id: &str,
        kind: EntryKind,
        from: &str,
        to: &str,
    ) -> ApiResult<Vec<CategoryShare>> {
        let rows = sqlx::query(
            "SELECT c.title AS name, SUM(r.amount_cents) AS total
             FROM records r
             INNER JOIN categories c ON c.id = r.category_id
             WHERE r.book_id = ? AND r.status = ? AND r.kind = ?
               AND r.oper_date BETWEEN ? AND ?
             GROUP BY c.id, c.title
             ORDER BY total DESC, c.title ASC",
        )
        .bind(book_id)
        .bind(STATUS_ACTIVE)
        .bind(kind.to_string())
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        let mut shares = Vec::with_capacity(rows.len());
        for row in rows {
            shares.push(CategoryShare {
                name: row.try_get("name")?,
                value_cents: row.try_get("total")?,
            });
        }
        Ok(shares)
    }

    async fn sum_kind(
        &self,
        book_id: &str,
        kind: EntryKind,
        from: &str,
        to: &str,
    ) -> ApiResult<i64> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(amount_cents), 0) AS total
             FROM records
             WHERE book_id = ? AND status = ? AND kind = ? AND oper_date BETWEEN ? AND ?",
        )
        .bind(book_id)
        .bind(STATUS_ACTIVE)
        .bind(kind.to_string())
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get("total")?)
    }
}
