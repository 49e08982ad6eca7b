use crate::domain::entities::{
    MonthList, MonthListQuery, RecordDetail, RecordRequest, Statistics, StatisticsQuery,
};
use crate::infrastructure::http::middleware::{ApiResult, AppState, AuthenticatedUser};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

/// POST /api/records
pub async fn add_record(
    State(state): State<AppState>,
    axum::Extension(auth): axum::Extension<AuthenticatedUser>,
    Json(req): Json<RecordRequest>,
) -> ApiResult<(StatusCode, Json<RecordDetail>)> {
    let record = state.record_service.add(auth.id(), req).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/records/:id
pub async fn get_record(
    State(state): State<AppState>,
    axum::Extension(auth): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<RecordDetail>> {
    let record = state.record_service.get(auth.id(), &id).await?;
    Ok(Json(record))
}

/// PUT /api/records/:id
pub async fn edit_record(
    State(state): State<AppState>,
    axum::Extension(auth): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(req): Json<RecordRequest>,
) -> ApiResult<Json<RecordDetail>> {
    let record = state.record_service.edit(auth.id(), &id, req).await?;
    Ok(Json(record))
}

/// DELETE /api/records/:id
pub async fn remove_record(
    State(state): State<AppState>,
    axum::Extension(auth): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.record_service.remove(auth.id(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/books/:id/records?month=YYYY-MM&page=&page_size=
pub async fn month_list(
    State(state): State<AppState>,
    axum::Extension(auth): axum::Extension<AuthenticatedUser>,
    Path(book_id): Path<String>,
    Query(query): Query<MonthListQuery>,
) -> ApiResult<Json<MonthList>> {
    let list = state
        .statistics_service
        .month_list(auth.id(), &book_id, &query)
        .await?;
    Ok(Json(list))
}

/// GET /api/books/:id/statistics?kind=&month=YYYY-MM
pub async fn statistics(
    State(state): State<AppState>,
    axum::Extension(auth): axum::Extension<AuthenticatedUser>,
    Path(book_id): Path<String>,
    Query(query): Query<StatisticsQuery>,
) -> ApiResult<Json<Statistics>> {
    let statistics = state
        .statistics_service
        .statistics(auth.id(), &book_id, &query)
        .await?;
    Ok(Json(statistics))
}
