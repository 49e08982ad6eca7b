use crate::domain::entities::MAX_UPLOAD_BYTES;
use crate::infrastructure::http::controllers::{
    books, categories, records, subscriptions, uploads, users,
};
use crate::infrastructure::http::middleware::{require_auth, AppState};
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

/// Room for multipart framing around the largest accepted file
const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    // Routes that require a bearer token
    let protected = Router::new()
        .route("/api/me", get(users::me))
        .route("/api/books", get(books::list_books).post(books::create_book))
        .route(
            "/api/books/:id",
            put(books::modify_book).delete(books::remove_book),
        )
        .route("/api/books/:id/members", get(books::list_members))
        .route("/api/books/:id/members/:user_id", delete(books::quit))
        .route("/api/books/:id/invite", post(books::issue_invite))
        .route("/api/invites/:code/attend", post(books::attend))
        .route(
            "/api/books/:id/applications",
            get(books::list_applications).post(books::apply),
        )
        .route("/api/applications/:id/examine", post(books::examine))
        .route(
            "/api/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/api/categories/:id",
            put(categories::update_category).delete(categories::remove_category),
        )
        .route("/api/records", post(records::add_record))
        .route(
            "/api/records/:id",
            get(records::get_record)
                .put(records::edit_record)
                .delete(records::remove_record),
        )
        .route("/api/books/:id/records", get(records::month_list))
        .route("/api/books/:id/statistics", get(records::statistics))
        .route(
            "/api/uploads",
            post(uploads::upload).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/api/subscription",
            get(subscriptions::get_subscription).put(subscriptions::subscribe),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let upload_prefix = state.upload_public_prefix.clone();
    let upload_files = ServeDir::new(state.upload_dir.clone());

    // Public routes
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/login", post(users::login))
        .route("/api/invites/:code", get(books::invite_info))
        .merge(protected)
        .nest_service(&upload_prefix, upload_files)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_handler() -> &'static str {
    "OK"
}
