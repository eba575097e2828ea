//! # cats
//!
//! Create, read, update and delete cat documents, one operation per
//! invocation or a whole JSON script at once.
//!
//! ## Usage
//!
//! ```bash
//! cats create barsik --age 3 --feature rudy --feature calm
//! cats set-age barsik 4
//! cats add-feature barsik "loves fish"
//! cats list
//! cats run demo_script.json
//! cats --dry-run run demo_script.json
//! ```
//!
//! A failed connection exits non-zero. A failed operation is logged and the
//! process exits normally.

use clap::{Parser, Subcommand};
use seedbed_shared::docstore::{
    load_script, CatCollection, CatMutator, DocStoreClient, DocStoreConfig, MemoryCatCollection,
    RedisCatCollection, Step,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "cats", version, about = "Manage cat documents")]
struct Cli {
    /// Redis connection URL (overrides REDIS_URL)
    #[arg(long, global = true, value_name = "URL")]
    url: Option<String>,

    /// Database name (overrides DOCSTORE_DATABASE)
    #[arg(long, global = true)]
    database: Option<String>,

    /// Collection name (overrides DOCSTORE_COLLECTION)
    #[arg(long, global = true)]
    collection: Option<String>,

    /// Use a throwaway in-memory collection instead of Redis
    #[arg(long = "dry-run", global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Insert a cat
    Create {
        name: String,

        /// Age in years
        #[arg(long)]
        age: i64,

        /// Distinguishing feature (repeatable)
        #[arg(long = "feature", value_name = "FEATURE")]
        features: Vec<String>,
    },

    /// Print every cat
    List,

    /// Print the first cat with this name
    Get { name: String },

    /// Set the age of the first cat with this name
    SetAge { name: String, age: i64 },

    /// Add a feature to the first cat with this name
    AddFeature { name: String, feature: String },

    /// Delete the first cat with this name
    Delete { name: String },

    /// Delete every cat
    DeleteAll,

    /// Run the steps of a JSON script in order
    Run { script: PathBuf },
}

impl Cli {
    fn docstore_config(&self) -> DocStoreConfig {
        let mut config = DocStoreConfig::from_env();

        if let Some(url) = &self.url {
            config.url = url.clone();
        }
        if let Some(database) = &self.database {
            config.database = database.clone();
        }
        if let Some(collection) = &self.collection {
            config.collection = collection.clone();
        }

        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cats=info,seedbed_shared=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    if cli.dry_run {
        tracing::info!("Dry run, using an in-memory collection");
        dispatch(&CatMutator::new(MemoryCatCollection::new()), cli.command).await;
        return Ok(());
    }

    let config = cli.docstore_config();

    let client = match DocStoreClient::connect(config).await {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "Connection error");
            return Err(e.into());
        }
    };

    let mutator = CatMutator::new(RedisCatCollection::new(client.clone()));
    dispatch(&mutator, cli.command).await;

    drop(mutator);
    client.close();

    Ok(())
}

/// Runs one command; failures are logged by the mutator
async fn dispatch<C: CatCollection>(mutator: &CatMutator<C>, command: Commands) {
    let step = match command {
        Commands::Run { script } => {
            match load_script(&script).await {
                Ok(steps) => {
                    mutator.run(&steps).await;
                }
                Err(e) => tracing::error!(error = %e, "Error loading script"),
            }
            return;
        }
        Commands::Create {
            name,
            age,
            features,
        } => Step::Create {
            name,
            age,
            features,
        },
        Commands::List => Step::ReadAll,
        Commands::Get { name } => Step::Read { name },
        Commands::SetAge { name, age } => Step::SetAge { name, age },
        Commands::AddFeature { name, feature } => Step::AddFeature { name, feature },
        Commands::Delete { name } => Step::Delete { name },
        Commands::DeleteAll => Step::DeleteAll,
    };

    if let Err(e) = mutator.execute(&step).await {
        tracing::debug!(error = %e, "Command failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_create_with_features() {
        let cli = Cli::try_parse_from([
            "cats", "create", "barsik", "--age", "3", "--feature", "rudy", "--feature", "calm",
        ])
        .unwrap();

        match cli.command {
            Commands::Create {
                name,
                age,
                features,
            } => {
                assert_eq!(name, "barsik");
                assert_eq!(age, 3);
                assert_eq!(features, vec!["rudy", "calm"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_overrides() {
        let cli = Cli::try_parse_from([
            "cats",
            "list",
            "--url",
            "redis://cache:6379/",
            "--database",
            "shelter",
            "--collection",
            "kittens",
        ])
        .unwrap();

        let config = cli.docstore_config();
        assert_eq!(config.url, "redis://cache:6379/");
        assert_eq!(config.namespace(), "shelter:kittens");
    }

    #[tokio::test]
    async fn test_dispatch_against_memory() {
        let mutator = CatMutator::new(MemoryCatCollection::new());

        dispatch(
            &mutator,
            Commands::Create {
                name: "murzik".to_string(),
                age: 5,
                features: vec!["grey".to_string()],
            },
        )
        .await;
        dispatch(
            &mutator,
            Commands::AddFeature {
                name: "murzik".to_string(),
                feature: "loves fish".to_string(),
            },
        )
        .await;
        dispatch(
            &mutator,
            Commands::Delete {
                name: "sonia".to_string(),
            },
        )
        .await;

        let murzik = mutator
            .collection()
            .find_one_by_name("murzik")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(murzik.features, vec!["grey", "loves fish"]);
    }
}
