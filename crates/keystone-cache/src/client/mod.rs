//! # Client Module
//!
//! Store adapters behind the [`Client`] trait.

pub mod memory;
#[cfg(feature = "redis")]
pub mod redis_client;
pub mod traits;

pub use memory::MemoryClient;
#[cfg(feature = "redis")]
pub use redis_client::RedisClient;
pub use traits::{Client, SharedClient};
