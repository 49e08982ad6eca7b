pub mod auth;
pub mod error;

pub use auth::{require_auth, AuthenticatedUser};
pub use error::{ApiError, ApiResult};

use crate::application::services::{
    BookService, CategoryService, RecordService, StatisticsService, SubscriptionService,
    UploadService, UserService,
};
use std::path::PathBuf;

#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub book_service: BookService,
    pub category_service: CategoryService,
    pub record_service: RecordService,
    pub statistics_service: StatisticsService,
    pub upload_service: UploadService,
    pub subscription_service: SubscriptionService,
    /// Directory uploaded files are served from
    pub upload_dir: PathBuf,
    /// URL prefix uploaded files are served under, e.g. `/upload`
    pub upload_public_prefix: String,
}
