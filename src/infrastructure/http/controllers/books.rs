use crate::domain::entities::{
    ApplyRequest, AttendResult, Book, BookApplication, BookMember, BookSummary, CreateBookRequest,
    ExamineRequest, InviteCode, InviteInfo, ModifyBookRequest,
};
use crate::infrastructure::http::middleware::{ApiResult, AppState, AuthenticatedUser};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct ListBooksQuery {
    /// `1`/`true` to only list books the caller administers
    #[serde(default)]
    pub admin: Option<String>,
}

impl ListBooksQuery {
    fn admin_only(&self) -> bool {
        matches!(self.admin.as_deref(), Some("1") | Some("true"))
    }
}

/// GET /api/books
pub async fn list_books(
    State(state): State<AppState>,
    axum::Extension(auth): axum::Extension<AuthenticatedUser>,
    Query(query): Query<ListBooksQuery>,
) -> ApiResult<Json<Vec<BookSummary>>> {
    let books = state
        .book_service
        .list_books(auth.id(), query.admin_only())
        .await?;
    Ok(Json(books))
}

/// POST /api/books
pub async fn create_book(
    State(state): State<AppState>,
    axum::Extension(auth): axum::Extension<AuthenticatedUser>,
    Json(req): Json<CreateBookRequest>,
) -> ApiResult<(StatusCode, Json<Book>)> {
    let book = state.book_service.create_book(auth.id(), &req.title).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// PUT /api/books/:id
pub async fn modify_book(
    State(state): State<AppState>,
    axum::Extension(auth): axum::Extension<AuthenticatedUser>,
    Path(book_id): Path<String>,
    Json(req): Json<ModifyBookRequest>,
) -> ApiResult<Json<Book>> {
    let book = state
        .book_service
        .modify_book(auth.id(), &book_id, req)
        .await?;
    Ok(Json(book))
}

/// DELETE /api/books/:id
pub async fn remove_book(
    State(state): State<AppState>,
    axum::Extension(auth): axum::Extension<AuthenticatedUser>,
    Path(book_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.book_service.remove_book(auth.id(), &book_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/books/:id/members
pub async fn list_members(
    State(state): State<AppState>,
    axum::Extension(auth): axum::Extension<AuthenticatedUser>,
    Path(book_id): Path<String>,
) -> ApiResult<Json<Vec<BookMember>>> {
    let members = state.book_service.members(auth.id(), &book_id).await?;
    Ok(Json(members))
}

/// DELETE /api/books/:id/members/:user_id - Leave a book, or remove a member as owner
pub async fn quit(
    State(state): State<AppState>,
    axum::Extension(auth): axum::Extension<AuthenticatedUser>,
    Path((book_id, quit_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state.book_service.quit(auth.id(), &book_id, &quit_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/books/:id/invite
pub async fn issue_invite(
    State(state): State<AppState>,
    axum::Extension(auth): axum::Extension<AuthenticatedUser>,
    Path(book_id): Path<String>,
) -> ApiResult<Json<InviteCode>> {
    let invite = state.book_service.issue_invite(auth.id(), &book_id).await?;
    Ok(Json(invite))
}

/// GET /api/invites/:code
pub async fn invite_info(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Json<InviteInfo>> {
    let info = state.book_service.invite_info(&code).await?;
    Ok(Json(info))
}

/// POST /api/invites/:code/attend
pub async fn attend(
    State(state): State<AppState>,
    axum::Extension(auth): axum::Extension<AuthenticatedUser>,
    Path(code): Path<String>,
) -> ApiResult<Json<AttendResult>> {
    let result = state.book_service.attend(auth.id(), &code).await?;
    Ok(Json(result))
}

/// POST /api/books/:id/applications
pub async fn apply(
    State(state): State<AppState>,
    axum::Extension(auth): axum::Extension<AuthenticatedUser>,
    Path(book_id): Path<String>,
    Json(req): Json<ApplyRequest>,
) -> ApiResult<(StatusCode, Json<BookApplication>)> {
    let application = state
        .book_service
        .apply(auth.id(), &book_id, &req.comment)
        .await?;
    Ok((StatusCode::CREATED, Json(application)))
}

/// GET /api/books/:id/applications
pub async fn list_applications(
    State(state): State<AppState>,
    axum::Extension(auth): axum::Extension<AuthenticatedUser>,
    Path(book_id): Path<String>,
) -> ApiResult<Json<Vec<BookApplication>>> {
    let applications = state
        .book_service
        .list_applications(auth.id(), &book_id)
        .await?;
    Ok(Json(applications))
}

/// POST /api/applications/:id/examine
pub async fn examine(
    State(state): State<AppState>,
    axum::Extension(auth): axum::Extension<AuthenticatedUser>,
    Path(application_id): Path<String>,
    Json(req): Json<ExamineRequest>,
) -> ApiResult<Json<BookApplication>> {
    let application = state
        .book_service
        .examine(auth.id(), &application_id, req.approve)
        .await?;
    Ok(Json(application))
}
