//! Queue implementations - Infrastructure adapters for queue ports

mod factory;
mod memory_queue;
mod sqlite_queue;

pub use factory::QueueFactory;
pub use memory_queue::InMemoryQueue;
pub use sqlite_queue::SqliteQueue;
