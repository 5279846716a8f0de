pub mod game_log_repository;

pub use game_log_repository::SqliteGameLogRepository;
