/// Configuration for the taskdb tool
///
/// Loaded from environment variables (and `.env`), then overridden by
/// command-line flags.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string
/// - `DATABASE_CONNECT_TIMEOUT_SECS`: Connect timeout (default: 30)
/// - `SEED_USERS`: Users created by `seed` (default: 10)
/// - `SEED_TASKS`: Tasks created by `seed` (default: 30)
/// - `RUST_LOG`: Log filter (default: taskdb=info,seedbed_shared=info)

use seedbed_shared::db::connection::DatabaseConfig;
use seedbed_shared::seed::SeedConfig;
use serde::{Deserialize, Serialize};

/// Complete tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database connection
    pub database: DatabaseConfig,

    /// Seeding volume
    pub seed: SeedConfig,
}

impl Config {
    /// Loads every section from environment variables
    pub fn from_env() -> Self {
        Self {
            database: DatabaseConfig::from_env(),
            seed: SeedConfig::from_env(),
        }
    }

    /// Replaces the database URL when one was given on the command line
    pub fn with_database_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url {
            self.database.url = url;
        }
        self
    }

    /// Replaces seeding volumes given on the command line
    pub fn with_seed_counts(mut self, users: Option<usize>, tasks: Option<usize>) -> Self {
        if let Some(users) = users {
            self.seed.users = users;
        }
        if let Some(tasks) = tasks {
            self.seed.tasks = tasks;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Config {
        Config {
            database: DatabaseConfig::default(),
            seed: SeedConfig::default(),
        }
    }

    #[test]
    fn test_overrides_apply() {
        let config = base()
            .with_database_url(Some("postgresql://u:p@db:5432/tasks".to_string()))
            .with_seed_counts(Some(2), None);

        assert_eq!(config.database.url, "postgresql://u:p@db:5432/tasks");
        assert_eq!(config.seed.users, 2);
        assert_eq!(config.seed.tasks, 30);
    }

    #[test]
    fn test_no_overrides_keep_values() {
        let config = base().with_database_url(None).with_seed_counts(None, None);
        assert_eq!(config.database, DatabaseConfig::default());
        assert_eq!(config.seed, SeedConfig::default());
    }
}
