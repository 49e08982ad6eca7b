pub mod book_repository;
pub mod category_repository;
pub mod clock;
pub mod file_storage;
pub mod identity_provider;
pub mod lock_store;
pub mod record_repository;
pub mod subscription_repository;
pub mod user_repository;
