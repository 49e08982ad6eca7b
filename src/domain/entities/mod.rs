pub mod book;
pub mod category;
pub mod lock;
pub mod record;
pub mod statistics;
pub mod subscription;
pub mod upload;
pub mod user;

pub use book::*;
pub use category::*;
pub use lock::*;
pub use record::*;
pub use statistics::*;
pub use subscription::*;
pub use upload::*;
pub use user::*;
