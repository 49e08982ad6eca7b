use crate::application::services::invite_codec::{InviteClaims, InviteCodec};
use crate::application::services::lock_service::LockService;
use crate::domain::entities::{
    validate_book_title, ApplicationStatus, AttendResult, Book, BookApplication, BookMember,
    BookSummary, InviteCode, InviteInfo, ModifyBookRequest,
};
use crate::domain::ports::book_repository::BookRepository;
use crate::domain::ports::clock::Clock;
use crate::domain::ports::user_repository::UserRepository;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Clone)]
pub struct BookService {
    book_repo: Arc<dyn BookRepository>,
    user_repo: Arc<dyn UserRepository>,
    locks: LockService,
    invites: InviteCodec,
    clock: Arc<dyn Clock>,
}

impl BookService {
    pub fn new(
        book_repo: Arc<dyn BookRepository>,
        user_repo: Arc<dyn UserRepository>,
        locks: LockService,
        invites: InviteCodec,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            book_repo,
            user_repo,
            locks,
            invites,
            clock,
        }
    }

    async fn active_book(&self, book_id: &str) -> ApiResult<Book> {
        self.book_repo
            .get_active_book(book_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Book {} not found", book_id)))
    }

    /// Active book owned by `user_id`
    async fn owned_book(&self, user_id: &str, book_id: &str) -> ApiResult<Book> {
        let book = self.active_book(book_id).await?;
        if book.owner_id != user_id {
            return Err(ApiError::Forbidden(
                "Only the book owner can do this".to_string(),
            ));
        }
        Ok(book)
    }

    /// Active book `user_id` is a member of
    pub async fn member_book(&self, user_id: &str, book_id: &str) -> ApiResult<Book> {
        let book = self.active_book(book_id).await?;
        if !self.book_repo.is_member(book_id, user_id).await? {
            return Err(ApiError::Forbidden(
                "You are not a member of this book".to_string(),
            ));
        }
        Ok(book)
    }

    pub async fn list_books(&self, user_id: &str, admin_only: bool) -> ApiResult<Vec<BookSummary>> {
        self.book_repo.list_user_books(user_id, admin_only).await
    }

    pub async fn create_book(&self, user_id: &str, title: &str) -> ApiResult<Book> {
        let title = validate_book_title(title)?;
        let book = Book::new(user_id.to_string(), title);
        self.book_repo.create_book(&book).await?;
        Ok(book)
    }

    /// Rename a book and optionally drop members. Members absent from
    /// `member_ids` are removed; ids that are not members are ignored and the
    /// owner is always kept.
    pub async fn modify_book(
        &self,
        user_id: &str,
        book_id: &str,
        request: ModifyBookRequest,
    ) -> ApiResult<Book> {
        let title = validate_book_title(&request.title)?;
        let requested: Option<HashSet<String>> =
            request.member_ids.map(|ids| ids.into_iter().collect());
        let lock = self.locks.request(user_id, &format!("book:{}:members", book_id));

        self.locks
            .with_lock(lock, move || async move {
                let mut book = self.owned_book(user_id, book_id).await?;

                let members = match &requested {
                    Some(requested) => {
                        let keep: Vec<String> = self
                            .book_repo
                            .list_member_ids(book_id)
                            .await?
                            .into_iter()
                            .filter(|id| *id == book.owner_id || requested.contains(id))
                            .collect();
                        Some(keep)
                    }
                    None => None,
                };

                self.book_repo
                    .update_book(book_id, &title, members.as_deref())
                    .await?;

                tracing::info!("Book modified: id={}, title={}", book_id, title);
                book.title = title;
                Ok::<_, ApiError>(book)
            })
            .await
    }

    pub async fn remove_book(&self, user_id: &str, book_id: &str) -> ApiResult<()> {
        self.owned_book(user_id, book_id).await?;

        if self.book_repo.count_owned_books(user_id).await? <= 1 {
            return Err(ApiError::BadRequest(
                "You must keep at least one book".to_string(),
            ));
        }

        self.book_repo.soft_delete_book(book_id).await
    }

    pub async fn members(&self, user_id: &str, book_id: &str) -> ApiResult<Vec<BookMember>> {
        self.member_book(user_id, book_id).await?;
        self.book_repo.list_members(book_id).await
    }

    /// Leave a book (`quit_id == user_id`) or, as its owner, remove a member.
    pub async fn quit(&self, user_id: &str, book_id: &str, quit_id: &str) -> ApiResult<()> {
        let book = self.active_book(book_id).await?;

        if quit_id == user_id {
            if book.owner_id == user_id {
                return Err(ApiError::BadRequest(
                    "The owner cannot leave their own book".to_string(),
                ));
            }
        } else {
            if book.owner_id != user_id {
                return Err(ApiError::Forbidden(
                    "Only the book owner can remove members".to_string(),
                ));
            }
            if quit_id == book.owner_id {
                return Err(ApiError::BadRequest(
                    "The owner cannot be removed".to_string(),
                ));
            }
        }

        if !self.book_repo.remove_member(book_id, quit_id).await? {
            return Err(ApiError::NotFound(format!(
                "User {} is not a member of this book",
                quit_id
            )));
        }
        Ok(())
    }

    pub async fn issue_invite(&self, user_id: &str, book_id: &str) -> ApiResult<InviteCode> {
        let book = self.owned_book(user_id, book_id).await?;
        let code = self.invites.encode(&InviteClaims {
            issued_at: self.clock.unix_timestamp(),
            book_id: book.id,
            owner_id: book.owner_id,
        })?;

        Ok(InviteCode {
            code,
            expires_in: self.invites.ttl_seconds(),
        })
    }

    /// Book behind a valid invite code, as long as its issuer still owns it.
    async fn resolve_invite(&self, code: &str) -> ApiResult<Book> {
        let claims = self.invites.decode(code, self.clock.unix_timestamp())?;
        let book = self.active_book(&claims.book_id).await?;
        if book.owner_id != claims.owner_id {
            return Err(ApiError::BadRequest("Invite code is no longer valid".to_string()));
        }
        Ok(book)
    }

    pub async fn invite_info(&self, code: &str) -> ApiResult<InviteInfo> {
        let book = self.resolve_invite(code).await?;
        let owner = self
            .user_repo
            .get_user_by_id(&book.owner_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Book owner not found".to_string()))?;

        Ok(InviteInfo {
            book_id: book.id,
            title: book.title,
            nickname: owner.nickname,
        })
    }

    /// Join the book behind an invite code.
    pub async fn attend(&self, user_id: &str, code: &str) -> ApiResult<AttendResult> {
        let book = self.resolve_invite(code).await?;
        let lock = self.locks.request(user_id, &format!("book:{}:attend", book.id));

        self.locks
            .with_lock(lock, || async {
                if book.owner_id == user_id {
                    return Ok::<_, ApiError>(AttendResult {
                        id: book.id.clone(),
                        title: book.title.clone(),
                        owner_id: book.owner_id.clone(),
                        admin: true,
                    });
                }

                if self.book_repo.is_member(&book.id, user_id).await? {
                    return Err(ApiError::Conflict(
                        "You are already a member of this book".to_string(),
                    ));
                }

                self.book_repo.add_member(&book.id, user_id).await?;
                Ok(AttendResult {
                    id: book.id.clone(),
                    title: book.title.clone(),
                    owner_id: book.owner_id.clone(),
                    admin: false,
                })
            })
            .await
    }

    pub async fn apply(
        &self,
        user_id: &str,
        book_id: &str,
        comment: &str,
    ) -> ApiResult<BookApplication> {
        let book = self.active_book(book_id).await?;

        if self.book_repo.is_member(book_id, user_id).await? {
            return Err(ApiError::Conflict(
                "You are already a member of this book".to_string(),
            ));
        }

        let pending = self
            .book_repo
            .list_applications(book_id)
            .await?
            .into_iter()
            .any(|a| a.applicant_id == user_id && a.status == ApplicationStatus::Pending);
        if pending {
            return Err(ApiError::Conflict(
                "An application for this book is already pending".to_string(),
            ));
        }

        let application = BookApplication::new(
            book.id,
            book.owner_id,
            user_id.to_string(),
            comment.trim().to_string(),
        );
        self.book_repo.create_application(&application).await?;
        Ok(application)
    }

    pub async fn list_applications(
        &self,
        user_id: &str,
        book_id: &str,
    ) -> ApiResult<Vec<BookApplication>> {
        self.owned_book(user_id, book_id).await?;
        self.book_repo.list_applications(book_id).await
    }

    /// Approve or reject a pending application. Approval adds the applicant
    /// to the application's book.
    pub async fn examine(
        &self,
        user_id: &str,
        application_id: &str,
        approve: bool,
    ) -> ApiResult<BookApplication> {
        let mut application = self
            .book_repo
            .get_application(application_id)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound(format!("Application {} not found", application_id))
            })?;

        self.owned_book(user_id, &application.book_id).await?;

        if application.status != ApplicationStatus::Pending {
            return Err(ApiError::Conflict(
                "Application has already been examined".to_string(),
            ));
        }

        let status = if approve {
            ApplicationStatus::Approved
        } else {
            ApplicationStatus::Rejected
        };
        self.book_repo.close_application(&application, status).await?;

        application.status = status;
        Ok(application)
    }
}
