//! Foresight CLI
//!
//! Runs predictions and manages the document store from the command line.
//!
//! # Usage
//! ```sh
//! cargo run -- import --file players.json
//! cargo run -- predict --player doncilu01 --season 2025 pts>25 ast>=8
//! cargo run -- seasons --player doncilu01
//! cargo run -- features --player doncilu01 pts>25 --output features.csv
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use foresight::application::PredictionService;
use foresight::application::ml::write_labeled_csv;
use foresight::config::Config;
use foresight::domain::condition::StatThreshold;
use foresight::domain::game::DocumentSet;
use foresight::domain::prediction::{PredictionRequest, ResponseProfile};
use foresight::domain::repositories::GameLogRepository;
use foresight::infrastructure::{Database, InMemoryGameLogRepository, SqliteGameLogRepository};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(author, version, about = "Next-game stat threshold predictions", long_about = None)]
struct Cli {
    /// Read documents from a JSON export instead of DATABASE_URL
    #[arg(long, global = true)]
    from_json: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict the probability that every threshold holds next game
    Predict {
        #[arg(short, long)]
        player: String,

        /// Defaults to DEFAULT_SEASON
        #[arg(short, long)]
        season: Option<i32>,

        /// Response profile: features | recent
        #[arg(long)]
        profile: Option<String>,

        /// Thresholds such as pts>20 or ast>=5 (trb:10 uses ">")
        #[arg(required = true)]
        thresholds: Vec<String>,
    },
    /// List the seasons stored for a player
    Seasons {
        #[arg(short, long)]
        player: String,
    },
    /// Load a JSON export of players and season bundles into SQLite
    Import {
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Export the engineered, labelled table to CSV
    Features {
        #[arg(short, long)]
        player: String,

        #[arg(short, long)]
        season: Option<i32>,

        #[arg(short, long, default_value = "features.csv")]
        output: PathBuf,

        #[arg(required = true)]
        thresholds: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Commands::Import { file } => {
            let documents = read_documents(&file)?;
            let db = Database::new(&config.database_url).await?;
            let repo = SqliteGameLogRepository::new(db.pool.clone());
            let (players, bundles) = repo.import_documents(&documents).await?;
            println!(
                "Imported {} players and {} season bundles into {}",
                players, bundles, config.database_url
            );
        }
        Commands::Predict {
            player,
            season,
            profile,
            thresholds,
        } => {
            let mut settings = config.pipeline_settings();
            if let Some(profile) = profile {
                settings.profile = ResponseProfile::from_str(&profile)?;
            }
            let repo = open_repository(&config, cli.from_json.as_deref()).await?;
            let service = PredictionService::new(repo, settings, config.default_season);

            let request = PredictionRequest {
                player_id: player,
                season,
                stat_thresholds: parse_thresholds(&thresholds)?,
            };
            let result = service.predict(request).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Seasons { player } => {
            let repo = open_repository(&config, cli.from_json.as_deref()).await?;
            let service =
                PredictionService::new(repo, config.pipeline_settings(), config.default_season);
            let seasons = service.list_seasons(&player).await?;
            println!("{}: {:?}", player, seasons);
        }
        Commands::Features {
            player,
            season,
            output,
            thresholds,
        } => {
            let repo = open_repository(&config, cli.from_json.as_deref()).await?;
            let service =
                PredictionService::new(repo, config.pipeline_settings(), config.default_season);
            let labeled = service
                .engineer(&player, season, &parse_thresholds(&thresholds)?)
                .await?;

            let file = File::create(&output)
                .with_context(|| format!("Failed to create {}", output.display()))?;
            let rows = write_labeled_csv(&labeled, file)?;
            info!("Wrote {} rows to {}", rows, output.display());
        }
    }

    Ok(())
}

fn parse_thresholds(raw: &[String]) -> Result<Vec<StatThreshold>> {
    raw.iter().map(|t| StatThreshold::from_str(t)).collect()
}

fn read_documents(path: &Path) -> Result<DocumentSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

async fn open_repository(
    config: &Config,
    from_json: Option<&Path>,
) -> Result<Arc<dyn GameLogRepository>> {
    match from_json {
        Some(path) => {
            let documents = read_documents(path)?;
            Ok(Arc::new(InMemoryGameLogRepository::from_documents(documents)))
        }
        None => {
            let db = Database::new(&config.database_url).await?;
            Ok(Arc::new(SqliteGameLogRepository::new(db.pool.clone())))
        }
    }
}
