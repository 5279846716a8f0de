//! Repository Pattern Abstractions
//!
//! The prediction pipeline reads from a document store holding player
//! profiles and their season bundles. Two lookups are all it needs:
//! - `find_player`: resolve a player id to its profile
//! - `find_season_bundle`: resolve the profile's bundle reference
//!
//! # Implementations
//!
//! - `SqliteGameLogRepository`: SQLite-backed, JSON documents per bundle
//! - `InMemoryGameLogRepository`: tests and ad-hoc runs
//!
//! # Example
//!
//! ```rust,no_run
//! use foresight::domain::repositories::GameLogRepository;
//! use foresight::infrastructure::InMemoryGameLogRepository;
//!
//! # async {
//! let repo = InMemoryGameLogRepository::new();
//! let player = repo.find_player("doncilu01").await?;
//! # anyhow::Ok(())
//! # };
//! ```

use crate::domain::game::{PlayerProfile, SeasonBundle};
use anyhow::Result;
use async_trait::async_trait;

/// Read access to stored player and season documents.
/// `Ok(None)` means "not found"; `Err` is a store failure.
#[async_trait]
pub trait GameLogRepository: Send + Sync {
    async fn find_player(&self, player_id: &str) -> Result<Option<PlayerProfile>>;

    async fn find_season_bundle(&self, reference: &str) -> Result<Option<SeasonBundle>>;
}
