use crate::application::services::book_service::BookService;
use crate::application::services::category_service::CategoryService;
use crate::application::services::lock_service::LockService;
use crate::domain::entities::{Record, RecordDetail, RecordDraft, RecordRequest, DATE_FORMAT};
use crate::domain::ports::clock::Clock;
use crate::domain::ports::record_repository::RecordRepository;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use chrono::NaiveDate;
use std::sync::Arc;

const ADD_RECORD_RESOURCE: &str = "record:add";
/// Attachments allowed per record
pub const MAX_RECORD_IMAGES: usize = 9;

#[derive(Clone)]
pub struct RecordService {
    record_repo: Arc<dyn RecordRepository>,
    books: BookService,
    categories: CategoryService,
    locks: LockService,
    clock: Arc<dyn Clock>,
}

impl RecordService {
    pub fn new(
        record_repo: Arc<dyn RecordRepository>,
        books: BookService,
        categories: CategoryService,
        locks: LockService,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            record_repo,
            books,
            categories,
            locks,
            clock,
        }
    }

    /// Validate a request against the caller's books and categories.
    async fn draft(&self, user_id: &str, request: RecordRequest) -> ApiResult<RecordDraft> {
        if request.amount_cents < 0 {
            return Err(ApiError::BadRequest("Amount must not be negative".to_string()));
        }

        let oper_date = match request.date.as_deref().map(str::trim) {
            Some(date) if !date.is_empty() => NaiveDate::parse_from_str(date, DATE_FORMAT)
                .map_err(|_| {
                    ApiError::BadRequest(format!("Invalid date '{}', expected YYYY-MM-DD", date))
                })?,
            _ => self.clock.today(),
        };

        let images: Vec<String> = request
            .images
            .into_iter()
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .collect();
        if images.len() > MAX_RECORD_IMAGES {
            return Err(ApiError::BadRequest(format!(
                "At most {} images per record",
                MAX_RECORD_IMAGES
            )));
        }

        self.books.member_book(user_id, &request.book_id).await?;

        let category = self.categories.visible(user_id, &request.category_id).await?;
        if category.kind != request.kind {
            return Err(ApiError::BadRequest(format!(
                "Category {} is not a {} category",
                category.title, request.kind
            )));
        }

        Ok(RecordDraft {
            book_id: request.book_id,
            category_id: request.category_id,
            kind: request.kind,
            amount_cents: request.amount_cents,
            oper_date,
            comment: request.comment.trim().to_string(),
            images,
        })
    }

    async fn detail(&self, id: &str) -> ApiResult<RecordDetail> {
        self.record_repo
            .get_record_detail(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Record {} not found", id)))
    }

    /// Create a record. Runs under a per-user lock so a double submit is
    /// rejected instead of booked twice.
    pub async fn add(&self, user_id: &str, request: RecordRequest) -> ApiResult<RecordDetail> {
        let lock = self.locks.request(user_id, ADD_RECORD_RESOURCE);

        self.locks
            .with_lock(lock, move || async move {
                let draft = self.draft(user_id, request).await?;
                let (record, images) = draft.into_record(user_id.to_string());
                self.record_repo.create_record(&record, &images).await?;
                self.detail(&record.id).await
            })
            .await
    }

    /// Creator or book owner may change a record
    async fn editable_record(&self, user_id: &str, id: &str) -> ApiResult<Record> {
        let record = self
            .record_repo
            .get_active_record(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Record {} not found", id)))?;

        let book = self.books.member_book(user_id, &record.book_id).await?;
        if record.user_id != user_id && book.owner_id != user_id {
            return Err(ApiError::Forbidden(
                "Only the author or the book owner can change this record".to_string(),
            ));
        }
        Ok(record)
    }

    pub async fn edit(
        &self,
        user_id: &str,
        id: &str,
        request: RecordRequest,
    ) -> ApiResult<RecordDetail> {
        let mut record = self.editable_record(user_id, id).await?;
        if request.book_id != record.book_id {
            return Err(ApiError::BadRequest(
                "Records cannot be moved to another book".to_string(),
            ));
        }

        let draft = self.draft(user_id, request).await?;
        record.category_id = draft.category_id;
        record.kind = draft.kind;
        record.amount_cents = draft.amount_cents;
        record.oper_date = draft.oper_date.format(DATE_FORMAT).to_string();
        record.comment = draft.comment;
        record.updated_at = chrono::Utc::now().to_rfc3339();

        self.record_repo.update_record(&record, &draft.images).await?;
        self.detail(id).await
    }

    pub async fn remove(&self, user_id: &str, id: &str) -> ApiResult<()> {
        self.editable_record(user_id, id).await?;
        self.record_repo.soft_delete_record(id).await
    }

    pub async fn get(&self, user_id: &str, id: &str) -> ApiResult<RecordDetail> {
        let detail = self.detail(id).await?;
        self.books.member_book(user_id, &detail.book_id).await?;
        Ok(detail)
    }
}
