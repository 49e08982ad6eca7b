use crate::domain::entities::{
    CategoryShare, DayTotals, EntryKind, Record, RecordDetail, RecordListItem,
};
use crate::infrastructure::http::middleware::error::ApiResult;
use async_trait::async_trait;

#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Insert the record and its annexes in one transaction.
    async fn create_record(&self, record: &Record, images: &[String]) -> ApiResult<()>;

    async fn get_active_record(&self, id: &str) -> ApiResult<Option<Record>>;

    async fn get_record_detail(&self, id: &str) -> ApiResult<Option<RecordDetail>>;

    /// Update the record and replace its annexes in one transaction.
    async fn update_record(&self, record: &Record, images: &[String]) -> ApiResult<()>;

    async fn soft_delete_record(&self, id: &str) -> ApiResult<()>;

    async fn list_annexes(&self, record_id: &str) -> ApiResult<Vec<String>>;

    // Aggregations over active records of a book between two dates (inclusive)

    /// Revenue and pay totals over the whole range; `date` is left empty.
    async fn range_totals(&self, book_id: &str, from: &str, to: &str) -> ApiResult<DayTotals>;

    /// Per-day totals, newest day first.
    async fn day_totals(
        &self,
        book_id: &str,
        from: &str,
        to: &str,
        limit: i64,
        offset: i64,
    ) -> ApiResult<Vec<DayTotals>>;

    async fn records_on(&self, book_id: &str, date: &str) -> ApiResult<Vec<RecordListItem>>;

    async fn top_records(
        &self,
        book_id: &str,
        kind: EntryKind,
        from: &str,
        to: &str,
        limit: i64,
    ) -> ApiResult<Vec<RecordListItem>>;

    async fn category_shares(
        &self,
        book_id: &str,
        kind: EntryKind,
        from: &str,
        to: &str,
    ) -> ApiResult<Vec<CategoryShare>>;

    async fn sum_kind(&self, book_id: &str, kind: EntryKind, from: &str, to: &str)
        -> ApiResult<i64>;
}
