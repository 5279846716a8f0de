pub mod observability;
pub mod persistence;
pub mod repositories;

pub use persistence::{Database, SqliteGameLogRepository};
pub use repositories::InMemoryGameLogRepository;
