pub mod memory;
pub mod redis_store;

pub use memory::MemoryLockStore;
pub use redis_store::RedisLockStore;
