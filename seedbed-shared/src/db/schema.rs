/// Schema initializer for the task-management database
///
/// Drops and recreates the `status`, `users` and `tasks` tables and inserts
/// the fixed status rows, all inside a single transaction. Running it twice
/// leaves the schema in the same state: every table is dropped if it exists
/// before being created again.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE status (
///     id SERIAL PRIMARY KEY,
///     name VARCHAR(50) UNIQUE NOT NULL
/// );
///
/// CREATE TABLE users (
///     id SERIAL PRIMARY KEY,
///     fullname VARCHAR(100) NOT NULL,
///     email VARCHAR(100) UNIQUE NOT NULL
/// );
///
/// CREATE TABLE tasks (
///     id SERIAL PRIMARY KEY,
///     title VARCHAR(100) NOT NULL,
///     description TEXT,
///     status_id INTEGER NOT NULL REFERENCES status (id) ON DELETE RESTRICT,
///     user_id INTEGER NOT NULL REFERENCES users (id) ON DELETE CASCADE
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use seedbed_shared::db::connection::{connect, DatabaseConfig};
/// use seedbed_shared::db::schema::initialize_schema;
///
/// # async fn example() -> Result<(), seedbed_shared::StoreError> {
/// let mut conn = connect(&DatabaseConfig::from_env()).await?;
/// initialize_schema(&mut conn).await?;
/// # Ok(())
/// # }
/// ```

use crate::error::StoreResult;
use sqlx::migrate::MigrateDatabase;
use sqlx::postgres::PgConnection;
use sqlx::{Connection, Postgres};
use tracing::{debug, info, warn};

/// Fixed status enumeration, in insertion order
pub const STATUS_NAMES: [&str; 3] = ["new", "in progress", "completed"];

/// Tables managed by the initializer, in creation order
pub const TABLES: [&str; 3] = ["status", "users", "tasks"];

/// DDL executed by [`initialize_schema`], one statement per entry
const SCHEMA_STATEMENTS: &[&str] = &[
    "DROP TABLE IF EXISTS tasks",
    "DROP TABLE IF EXISTS users",
    "DROP TABLE IF EXISTS status",
    r#"
    CREATE TABLE status (
        id   SERIAL PRIMARY KEY,
        name VARCHAR(50) UNIQUE NOT NULL
    )
    "#,
    r#"
    CREATE TABLE users (
        id       SERIAL PRIMARY KEY,
        fullname VARCHAR(100)        NOT NULL,
        email    VARCHAR(100) UNIQUE NOT NULL
    )
    "#,
    r#"
    CREATE TABLE tasks (
        id          SERIAL PRIMARY KEY,
        title       VARCHAR(100) NOT NULL,
        description TEXT,
        status_id   INTEGER      NOT NULL,
        user_id     INTEGER      NOT NULL,

        FOREIGN KEY (status_id)
            REFERENCES status (id)
            ON DELETE RESTRICT,

        FOREIGN KEY (user_id)
            REFERENCES users (id)
            ON DELETE CASCADE
    )
    "#,
];

/// Drops, recreates and seeds the lookup rows of every table atomically
///
/// On failure the transaction is rolled back, the error is logged and
/// returned. No partial schema is ever committed.
///
/// # Errors
///
/// Returns the classified backend error (typically `OperationRejected` for
/// a DDL failure or `Connection` if the server went away).
pub async fn initialize_schema(conn: &mut PgConnection) -> StoreResult<()> {
    info!("Initializing schema");

    let mut tx = conn.begin().await?;

    let result = async {
        for statement in SCHEMA_STATEMENTS {
            sqlx::query(*statement).execute(&mut *tx).await?;
        }

        let mut insert = sqlx::QueryBuilder::<Postgres>::new("INSERT INTO status (name) ");
        insert.push_values(STATUS_NAMES, |mut b, name| {
            b.push_bind(name);
        });
        insert.build().execute(&mut *tx).await?;

        Ok::<_, sqlx::Error>(())
    }
    .await;

    match result {
        Ok(()) => {
            tx.commit().await?;
            info!(tables = ?TABLES, "Tables created successfully");
            info!(statuses = ?STATUS_NAMES, "Statuses added");
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "Error while creating tables, rolling back");
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Rollback failed");
            }
            Err(e.into())
        }
    }
}

/// Creates the database if it doesn't exist
///
/// Connects to the server's maintenance database to do so, which requires
/// the `CREATEDB` privilege.
pub async fn ensure_database_exists(database_url: &str) -> StoreResult<()> {
    info!("Checking if database exists");

    if !Postgres::database_exists(database_url).await? {
        info!("Database does not exist, creating it");
        Postgres::create_database(database_url).await?;
        info!("Database created successfully");
    } else {
        debug!("Database already exists");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_names_are_unique() {
        let mut names = STATUS_NAMES.to_vec();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), STATUS_NAMES.len());
    }

    #[test]
    fn test_tables_dropped_before_created() {
        let first_create = SCHEMA_STATEMENTS
            .iter()
            .position(|s| s.contains("CREATE TABLE"))
            .unwrap();
        let last_drop = SCHEMA_STATEMENTS
            .iter()
            .rposition(|s| s.starts_with("DROP TABLE IF EXISTS"))
            .unwrap();
        assert!(last_drop < first_create);
    }

    #[test]
    fn test_tasks_declare_user_id_column() {
        let tasks = SCHEMA_STATEMENTS
            .iter()
            .find(|s| s.contains("CREATE TABLE tasks"))
            .unwrap();
        assert!(tasks.contains("user_id     INTEGER      NOT NULL"));
        assert!(tasks.contains("ON DELETE CASCADE"));
        assert!(tasks.contains("ON DELETE RESTRICT"));
    }

    // Tests against a live database are in tests/schema_tests.rs
}
