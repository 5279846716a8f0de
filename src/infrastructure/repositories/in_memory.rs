//! In-Memory Repository Implementation
//!
//! Thread-safe, in-memory implementation of `GameLogRepository`.
//!
//! # Features
//!
//! - **Thread-safe**: Uses `Arc<RwLock>` for concurrent access
//! - **Testing**: Ideal for unit tests and ad-hoc runs over a JSON export
//!
//! # Limitations
//!
//! - Data is lost on application restart
//!
//! For persistence use `SqliteGameLogRepository`.

use crate::domain::game::{DocumentSet, PlayerProfile, SeasonBundle};
use crate::domain::repositories::GameLogRepository;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct InMemoryGameLogRepository {
    players: Arc<RwLock<HashMap<String, PlayerProfile>>>,
    bundles: Arc<RwLock<HashMap<String, SeasonBundle>>>,
}

impl InMemoryGameLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a repository holding every document of an export.
    pub fn from_documents(documents: DocumentSet) -> Self {
        let players = documents
            .players
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();
        let bundles = documents
            .seasons
            .into_iter()
            .map(|b| (b.id.clone(), b))
            .collect();
        Self {
            players: Arc::new(RwLock::new(players)),
            bundles: Arc::new(RwLock::new(bundles)),
        }
    }

    pub async fn insert_player(&self, player: PlayerProfile) {
        self.players.write().await.insert(player.id.clone(), player);
    }

    pub async fn insert_season_bundle(&self, bundle: SeasonBundle) {
        self.bundles.write().await.insert(bundle.id.clone(), bundle);
    }

    pub async fn player_count(&self) -> usize {
        self.players.read().await.len()
    }
}

#[async_trait]
impl GameLogRepository for InMemoryGameLogRepository {
    async fn find_player(&self, player_id: &str) -> Result<Option<PlayerProfile>> {
        Ok(self.players.read().await.get(player_id).cloned())
    }

    async fn find_season_bundle(&self, reference: &str) -> Result<Option<SeasonBundle>> {
        Ok(self.bundles.read().await.get(reference).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_by_id_and_reference() {
        let repo = InMemoryGameLogRepository::new();
        repo.insert_player(PlayerProfile {
            id: "curryst01".to_string(),
            name: Some("Stephen Curry".to_string()),
            seasons_ref: Some("ref-1".to_string()),
        })
        .await;
        repo.insert_season_bundle(SeasonBundle {
            id: "ref-1".to_string(),
            player_id: "curryst01".to_string(),
            seasons: Vec::new(),
        })
        .await;

        assert_eq!(repo.player_count().await, 1);
        let player = repo.find_player("curryst01").await.unwrap().unwrap();
        let reference = player.seasons_ref.unwrap();
        assert!(repo.find_season_bundle(&reference).await.unwrap().is_some());
        assert!(repo.find_player("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let repo = InMemoryGameLogRepository::new();
        let handle = repo.clone();
        handle
            .insert_player(PlayerProfile {
                id: "a".to_string(),
                name: None,
                seasons_ref: None,
            })
            .await;
        assert!(repo.find_player("a").await.unwrap().is_some());
    }
}
