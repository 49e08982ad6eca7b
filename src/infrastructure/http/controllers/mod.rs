pub mod books;
pub mod categories;
pub mod records;
pub mod subscriptions;
pub mod uploads;
pub mod users;
