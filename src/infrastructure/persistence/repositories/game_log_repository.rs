use crate::domain::game::{DocumentSet, PlayerProfile, SeasonBundle};
use crate::domain::repositories::GameLogRepository;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

pub struct SqliteGameLogRepository {
    pool: SqlitePool,
}

impl SqliteGameLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn save_player(&self, player: &PlayerProfile) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO players (id, name, seasons_ref)
            VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                seasons_ref = excluded.seasons_ref
            "#,
        )
        .bind(&player.id)
        .bind(&player.name)
        .bind(&player.seasons_ref)
        .execute(&self.pool)
        .await
        .context("Failed to save player")?;

        debug!("Persisted player {}", player.id);
        Ok(())
    }

    pub async fn save_season_bundle(&self, bundle: &SeasonBundle) -> Result<()> {
        let document =
            serde_json::to_string(bundle).context("Failed to serialize season bundle")?;

        sqlx::query(
            r#"
            INSERT INTO season_bundles (id, player_id, document, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                player_id = excluded.player_id,
                document = excluded.document,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&bundle.id)
        .bind(&bundle.player_id)
        .bind(document)
        .bind(chrono::Utc::now().timestamp())
        .execute(&self.pool)
        .await
        .context("Failed to save season bundle")?;

        info!(
            "Persisted season bundle {} ({} entries)",
            bundle.id,
            bundle.seasons.len()
        );
        Ok(())
    }

    /// Upserts every document of an export. Returns (players, bundles).
    pub async fn import_documents(&self, documents: &DocumentSet) -> Result<(usize, usize)> {
        for player in &documents.players {
            self.save_player(player)
                .await
                .with_context(|| format!("Failed to import player {}", player.id))?;
        }
        for bundle in &documents.seasons {
            self.save_season_bundle(bundle)
                .await
                .with_context(|| format!("Failed to import season bundle {}", bundle.id))?;
        }

        info!(
            "Imported {} players and {} season bundles",
            documents.players.len(),
            documents.seasons.len()
        );
        Ok((documents.players.len(), documents.seasons.len()))
    }
}

#[async_trait]
impl GameLogRepository for SqliteGameLogRepository {
    async fn find_player(&self, player_id: &str) -> Result<Option<PlayerProfile>> {
        let row = sqlx::query("SELECT id, name, seasons_ref FROM players WHERE id = ?")
            .bind(player_id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query players")?;

        if let Some(row) = row {
            Ok(Some(PlayerProfile {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                seasons_ref: row.try_get("seasons_ref")?,
            }))
        } else {
            Ok(None)
        }
    }

    async fn find_season_bundle(&self, reference: &str) -> Result<Option<SeasonBundle>> {
        let row = sqlx::query("SELECT document FROM season_bundles WHERE id = ?")
            .bind(reference)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query season_bundles")?;

        match row {
            Some(row) => {
                let document: String = row.try_get("document")?;
                let bundle = serde_json::from_str(&document)
                    .with_context(|| format!("Corrupt season bundle document {reference}"))?;
                Ok(Some(bundle))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::game::{GameRecord, SeasonEntry};
    use crate::infrastructure::persistence::database::Database;
    use chrono::NaiveDate;

    async fn temp_database() -> Database {
        let path = std::env::temp_dir().join(format!("foresight-test-{}.db", uuid::Uuid::new_v4()));
        Database::new(&format!("sqlite://{}", path.display()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_player_and_bundle_round_trip() {
        let db = temp_database().await;
        let repo = SqliteGameLogRepository::new(db.pool.clone());

        let player = PlayerProfile {
            id: "doncilu01".to_string(),
            name: Some("Luka Doncic".to_string()),
            seasons_ref: Some("bundle-1".to_string()),
        };
        let bundle = SeasonBundle {
            id: "bundle-1".to_string(),
            player_id: "doncilu01".to_string(),
            seasons: vec![SeasonEntry {
                season: 2025,
                team: Some("DAL".to_string()),
                games: vec![
                    GameRecord::new(NaiveDate::from_ymd_opt(2024, 10, 24).unwrap())
                        .with_minutes("36:12")
                        .with_stat("pts", 28.0),
                ],
            }],
        };

        repo.save_player(&player).await.unwrap();
        repo.save_season_bundle(&bundle).await.unwrap();

        assert_eq!(repo.find_player("doncilu01").await.unwrap(), Some(player));
        assert_eq!(repo.find_season_bundle("bundle-1").await.unwrap(), Some(bundle));
        assert!(repo.find_player("nobody01").await.unwrap().is_none());
        assert!(repo.find_season_bundle("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_import_documents_from_json() {
        let db = temp_database().await;
        let repo = SqliteGameLogRepository::new(db.pool.clone());

        let documents: DocumentSet = serde_json::from_str(
            r#"{
                "players": [{"bbrID": "hardeja01", "name": "James Harden", "seasons": "harden"}],
                "seasons": [{
                    "_id": "harden",
                    "player_bbrID": "hardeja01",
                    "seasons": [
                        {"season": 2025, "team": "LAC", "games": [
                            {"date": "2024-10-23T00:00:00Z", "mp": "38:02", "home": "", "pts": 20, "ast": 8}
                        ]}
                    ]
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(repo.import_documents(&documents).await.unwrap(), (1, 1));
        let bundle = repo.find_season_bundle("harden").await.unwrap().unwrap();
        let games = bundle.games_for_season(2025).unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].date, NaiveDate::from_ymd_opt(2024, 10, 23).unwrap());
    }

    #[tokio::test]
    async fn test_save_player_upserts() {
        let db = temp_database().await;
        let repo = SqliteGameLogRepository::new(db.pool.clone());

        let mut player = PlayerProfile {
            id: "jamesle01".to_string(),
            name: None,
            seasons_ref: None,
        };
        repo.save_player(&player).await.unwrap();
        player.seasons_ref = Some("lebron-seasons".to_string());
        repo.save_player(&player).await.unwrap();

        let stored = repo.find_player("jamesle01").await.unwrap().unwrap();
        assert_eq!(stored.seasons_ref.as_deref(), Some("lebron-seasons"));
    }
}
