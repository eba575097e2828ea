//! # taskdb
//!
//! Creates the task-management schema and fills it with synthetic data.
//!
//! ## Usage
//!
//! ```bash
//! taskdb create-tables --create-database
//! taskdb seed --users 10 --tasks 30 --rng-seed 7
//! taskdb reset
//! ```
//!
//! Failures are logged and the process still exits normally; the connection
//! is released on every path.

mod config;

use clap::{Parser, Subcommand};
use config::Config;
use rand::rngs::StdRng;
use rand::SeedableRng;
use seedbed_shared::db::connection::{close_connection, connect, sanitize_url};
use seedbed_shared::db::schema::{ensure_database_exists, initialize_schema};
use seedbed_shared::seed::seed_database;
use seedbed_shared::{StoreError, StoreResult};
use sqlx::postgres::PgConnection;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "taskdb",
    version,
    about = "Create and seed the task-management database"
)]
struct Cli {
    /// PostgreSQL connection URL (overrides DATABASE_URL)
    #[arg(long, global = true, value_name = "URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Drop and recreate the status, users and tasks tables
    CreateTables {
        /// Create the database first if it does not exist
        #[arg(long)]
        create_database: bool,
    },

    /// Insert synthetic users and tasks
    Seed(SeedArgs),

    /// Recreate the tables, then seed them
    Reset(SeedArgs),
}

#[derive(clap::Args, Debug)]
struct SeedArgs {
    /// Number of users (overrides SEED_USERS)
    #[arg(long)]
    users: Option<usize>,

    /// Number of tasks (overrides SEED_TASKS)
    #[arg(long)]
    tasks: Option<usize>,

    /// Seed for the random generator, for reproducible data.
    ///
    /// The same seed yields the same emails, so seeding twice with one seed
    /// into the same tables fails on the unique email constraint. Use
    /// `reset`, or a different seed, to seed again.
    #[arg(long, value_name = "SEED")]
    rng_seed: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskdb=info,seedbed_shared=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().with_database_url(cli.database_url);

    tracing::info!("taskdb v{} starting", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(cli.command, config).await {
        report_failure(&e);
    }

    Ok(())
}

async fn run(command: Commands, config: Config) -> StoreResult<()> {
    if let Commands::CreateTables {
        create_database: true,
    } = command
    {
        ensure_database_exists(&config.database.url).await?;
    }

    let mut conn = connect(&config.database).await?;

    let result = match command {
        Commands::CreateTables { .. } => initialize_schema(&mut conn).await,
        Commands::Seed(args) => seed(&mut conn, config, args).await,
        Commands::Reset(args) => match initialize_schema(&mut conn).await {
            Ok(()) => seed(&mut conn, config, args).await,
            Err(e) => Err(e),
        },
    };

    close_connection(conn).await;
    result
}

async fn seed(
    conn: &mut PgConnection,
    config: Config,
    args: SeedArgs,
) -> StoreResult<()> {
    let config = config.with_seed_counts(args.users, args.tasks);

    let mut rng = match args.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let report = seed_database(conn, &config.seed, &mut rng).await?;

    tracing::info!(
        database = %sanitize_url(&config.database.url),
        users = report.user_ids.len(),
        tasks = report.task_count,
        "Seeding finished"
    );

    Ok(())
}

fn report_failure(err: &StoreError) {
    if err.is_connection() {
        tracing::error!(error = %err, "Connection error");
    } else if err.is_operational() {
        tracing::error!(error = %err, "Error");
    } else {
        tracing::error!(error = %err, "Unexpected error");
    }
}
