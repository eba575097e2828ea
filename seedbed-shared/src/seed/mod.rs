/// Synthetic data seeding for the task-management database
///
/// Seeding is all-or-nothing: status ids are read, users are batch-inserted
/// (capturing their generated ids), then tasks referencing both are
/// batch-inserted, all in one transaction. If the `status` table is empty the
/// transaction is rolled back before anything is written.
///
/// # Example
///
/// ```no_run
/// use rand::{rngs::StdRng, SeedableRng};
/// use seedbed_shared::db::connection::{connect, DatabaseConfig};
/// use seedbed_shared::seed::{seed_database, SeedConfig};
///
/// # async fn example() -> Result<(), seedbed_shared::StoreError> {
/// let mut conn = connect(&DatabaseConfig::from_env()).await?;
/// let mut rng = StdRng::from_entropy();
///
/// let report = seed_database(&mut conn, &SeedConfig::default(), &mut rng).await?;
/// println!("Seeded {} users and {} tasks", report.user_ids.len(), report.task_count);
/// # Ok(())
/// # }
/// ```

pub mod generator;
mod words;

use crate::error::{StoreError, StoreResult};
use crate::models::{Status, Task, User};
use generator::{generate_tasks, generate_users};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgConnection;
use sqlx::Connection;
use std::env;
use tracing::{info, warn};

/// How many records to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Number of users
    pub users: usize,

    /// Number of tasks
    pub tasks: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            users: 10,
            tasks: 30,
        }
    }
}

impl SeedConfig {
    /// Loads the configuration from environment variables
    ///
    /// # Environment Variables
    ///
    /// - `SEED_USERS`: Number of users (default: 10)
    /// - `SEED_TASKS`: Number of tasks (default: 30)
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        Self {
            users: env::var("SEED_USERS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.users),
            tasks: env::var("SEED_TASKS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.tasks),
        }
    }
}

/// What a successful seeding run committed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedReport {
    /// Ids of the users created by this run
    pub user_ids: Vec<i32>,

    /// Number of tasks created by this run
    pub task_count: usize,
}

/// Seeds users and tasks in a single transaction
///
/// # Errors
///
/// - `StoreError::PreconditionFailed` if the `status` table is empty (or no
///   users were requested while tasks were); nothing is written
/// - Any classified backend error; the transaction is rolled back
pub async fn seed_database<R: Rng + ?Sized>(
    conn: &mut PgConnection,
    config: &SeedConfig,
    rng: &mut R,
) -> StoreResult<SeedReport> {
    info!(users = config.users, tasks = config.tasks, "Seeding database");

    let mut tx = conn.begin().await?;

    let result = async {
        let status_ids = Status::list_ids(&mut *tx).await?;

        // Checked before any write so a missing schema leaves nothing behind
        if status_ids.is_empty() {
            return Err(StoreError::PreconditionFailed(
                "'status' table is empty, run create-tables first".to_string(),
            ));
        }

        let users = generate_users(rng, config.users);
        let user_ids = User::create_many(&mut *tx, &users).await?;

        let tasks = generate_tasks(rng, config.tasks, &status_ids, &user_ids)?;
        let task_ids = Task::create_many(&mut *tx, &tasks).await?;

        Ok::<_, StoreError>(SeedReport {
            user_ids,
            task_count: task_ids.len(),
        })
    }
    .await;

    match result {
        Ok(report) => {
            tx.commit().await?;
            info!(
                users = report.user_ids.len(),
                tasks = report.task_count,
                "Successfully seeded database"
            );
            Ok(report)
        }
        Err(e) => {
            warn!(error = %e, "Error while seeding database, rolling back");
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Rollback failed");
            }
            Err(e)
        }
    }
}
