use crate::domain::entities::{ApplicationStatus, Book, BookApplication, BookMember, BookSummary};
use crate::infrastructure::http::middleware::error::ApiResult;
use async_trait::async_trait;

#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Insert the book and its owner as admin member.
    async fn create_book(&self, book: &Book) -> ApiResult<()>;

    async fn get_active_book(&self, book_id: &str) -> ApiResult<Option<Book>>;

    async fn list_user_books(&self, user_id: &str, admin_only: bool)
        -> ApiResult<Vec<BookSummary>>;

    async fn count_owned_books(&self, user_id: &str) -> ApiResult<i64>;

    async fn soft_delete_book(&self, book_id: &str) -> ApiResult<()>;

    /// Update the title and, when given, replace the member list in the same
    /// transaction.
    async fn update_book(
        &self,
        book_id: &str,
        title: &str,
        members: Option<&[String]>,
    ) -> ApiResult<()>;

    // Membership
    async fn is_member(&self, book_id: &str, user_id: &str) -> ApiResult<bool>;

    async fn list_member_ids(&self, book_id: &str) -> ApiResult<Vec<String>>;

    async fn list_members(&self, book_id: &str) -> ApiResult<Vec<BookMember>>;

    async fn add_member(&self, book_id: &str, user_id: &str) -> ApiResult<()>;

    async fn remove_member(&self, book_id: &str, user_id: &str) -> ApiResult<bool>;

    // Join applications
    async fn create_application(&self, application: &BookApplication) -> ApiResult<()>;

    async fn get_application(&self, id: &str) -> ApiResult<Option<BookApplication>>;

    async fn list_applications(&self, book_id: &str) -> ApiResult<Vec<BookApplication>>;

    /// Close a pending application; approving also adds the applicant as member
    /// in the same transaction.
    async fn close_application(
        &self,
        application: &BookApplication,
        status: ApplicationStatus,
    ) -> ApiResult<()>;
}
