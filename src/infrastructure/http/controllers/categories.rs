use crate::domain::entities::{CategoryQuery, CategoryRequest, CategoryResponse};
use crate::infrastructure::http::middleware::{ApiResult, AppState, AuthenticatedUser};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

/// GET /api/categories?kind=&custom=
pub async fn list_categories(
    State(state): State<AppState>,
    axum::Extension(auth): axum::Extension<AuthenticatedUser>,
    Query(query): Query<CategoryQuery>,
) -> ApiResult<Json<Vec<CategoryResponse>>> {
    let categories = state.category_service.list(auth.id(), &query).await?;
    Ok(Json(categories))
}

pub async fn create_category(
    State(state): State<AppState>,
    axum::Extension(auth): axum::Extension<AuthenticatedUser>,
    Json(req): Json<CategoryRequest>,
) -> ApiResult<(StatusCode, Json<CategoryResponse>)> {
    let category = state.category_service.create(auth.id(), req).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<AppState>,
    axum::Extension(auth): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(req): Json<CategoryRequest>,
) -> ApiResult<Json<CategoryResponse>> {
    let category = state.category_service.update(auth.id(), &id, req).await?;
    Ok(Json(category))
}

pub async fn remove_category(
    State(state): State<AppState>,
    axum::Extension(auth): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.category_service.remove(auth.id(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
