pub mod book_service;
pub mod category_service;
pub mod invite_codec;
pub mod lock_service;
pub mod record_service;
pub mod statistics_service;
pub mod subscription_service;
pub mod token_service;
pub mod upload_service;
pub mod user_service;

pub use book_service::BookService;
pub use category_service::CategoryService;
pub use invite_codec::{InviteClaims, InviteCodec};
pub use lock_service::LockService;
pub use record_service::RecordService;
pub use statistics_service::StatisticsService;
pub use subscription_service::SubscriptionService;
pub use token_service::TokenService;
pub use upload_service::UploadService;
pub use user_service::UserService;
