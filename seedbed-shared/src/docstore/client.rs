/// Document store connection provider
///
/// Wraps a Redis `ConnectionManager`. Connecting is bounded by a fixed
/// timeout and includes a PING so an unreachable server is reported as a
/// connection failure before any operation runs.
///
/// # Example
///
/// ```no_run
/// use seedbed_shared::docstore::client::{DocStoreClient, DocStoreConfig};
///
/// # async fn example() -> Result<(), seedbed_shared::StoreError> {
/// let config = DocStoreConfig::from_env();
/// let client = DocStoreClient::connect(config).await?;
///
/// let healthy = client.ping().await?;
/// println!("Document store healthy: {}", healthy);
/// # Ok(())
/// # }
/// ```

use crate::db::connection::sanitize_url;
use crate::error::{StoreError, StoreResult};
use redis::aio::ConnectionManager;
use redis::{Client, RedisError};
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::Arc;
use std::time::Duration;

/// Document store configuration
///
/// `database` and `collection` together name the key namespace documents
/// live in (`<database>:<collection>:...`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocStoreConfig {
    /// Redis connection URL
    ///
    /// Format: redis://[username:password@]host:port[/db]
    pub url: String,

    /// Logical database name
    pub database: String,

    /// Collection name within the database
    pub collection: String,

    /// Connection timeout in seconds, PING included
    pub connection_timeout_secs: u64,
}

impl Default for DocStoreConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379/".to_string(),
            database: "cats_db".to_string(),
            collection: "cats".to_string(),
            connection_timeout_secs: 5,
        }
    }
}

impl DocStoreConfig {
    /// Creates a configuration from environment variables
    ///
    /// # Environment Variables
    ///
    /// - `REDIS_URL`: Redis connection URL (default: redis://localhost:6379/)
    /// - `DOCSTORE_DATABASE`: Database name (default: cats_db)
    /// - `DOCSTORE_COLLECTION`: Collection name (default: cats)
    /// - `REDIS_CONNECTION_TIMEOUT_SECS`: Connection timeout (default: 5)
    pub fn from_env() -> Self {
        // Load .env if present
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let url = env::var("REDIS_URL").unwrap_or(defaults.url);
        let database = env::var("DOCSTORE_DATABASE").unwrap_or(defaults.database);
        let collection = env::var("DOCSTORE_COLLECTION").unwrap_or(defaults.collection);

        let connection_timeout_secs = env::var("REDIS_CONNECTION_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.connection_timeout_secs);

        Self {
            url,
            database,
            collection,
            connection_timeout_secs,
        }
    }

    /// Key prefix shared by every key of the collection
    pub fn namespace(&self) -> String {
        format!("{}:{}", self.database, self.collection)
    }
}

/// Connected document store handle
///
/// Cloning is cheap; clones share the underlying connection.
#[derive(Clone)]
pub struct DocStoreClient {
    manager: ConnectionManager,
    config: Arc<DocStoreConfig>,
}

impl DocStoreClient {
    /// Connects and verifies the server answers PING
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Connection` if the URL is invalid, the server is
    /// unreachable, or it does not answer within the timeout.
    pub async fn connect(config: DocStoreConfig) -> StoreResult<Self> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| StoreError::Connection(format!("Invalid Redis URL: {}", e)))?;

        let timeout = Duration::from_secs(config.connection_timeout_secs);

        let manager = tokio::time::timeout(timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| {
                StoreError::Connection(format!(
                    "Timed out after {}s connecting to {}",
                    config.connection_timeout_secs,
                    sanitize_url(&config.url)
                ))
            })?
            .map_err(|e| StoreError::Connection(format!("Failed to connect to Redis: {}", e)))?;

        let client = Self {
            manager,
            config: Arc::new(config),
        };

        match tokio::time::timeout(timeout, client.ping()).await {
            Ok(Ok(true)) => {}
            Ok(Ok(false)) => {
                return Err(StoreError::Connection(
                    "Unexpected reply to PING".to_string(),
                ))
            }
            Ok(Err(e)) => return Err(StoreError::Connection(e.to_string())),
            Err(_) => {
                return Err(StoreError::Connection(
                    "PING command timed out".to_string(),
                ))
            }
        }

        tracing::info!(
            url = %sanitize_url(&client.config.url),
            namespace = %client.config.namespace(),
            "Document store connection successful"
        );

        Ok(client)
    }

    /// Sends a PING; true if the server answered PONG
    pub async fn ping(&self) -> StoreResult<bool> {
        let mut conn = self.manager.clone();

        let result: Result<String, RedisError> = redis::cmd("PING").query_async(&mut conn).await;

        match result {
            Ok(pong) if pong == "PONG" => {
                tracing::debug!("Document store health check: PONG received");
                Ok(true)
            }
            Ok(other) => {
                tracing::warn!("Document store health check: unexpected response: {}", other);
                Ok(false)
            }
            Err(e) => {
                tracing::error!("Document store health check failed: {}", e);
                Err(e.into())
            }
        }
    }

    /// Returns a connection handle for issuing commands
    pub fn get_connection(&self) -> ConnectionManager {
        self.manager.clone()
    }

    /// Gets the configuration this client was created with
    pub fn config(&self) -> &DocStoreConfig {
        &self.config
    }

    /// Releases the connection
    ///
    /// The manager closes its socket once the last clone is dropped.
    pub fn close(self) {
        drop(self);
        tracing::info!("Document store connection closed");
    }
}
