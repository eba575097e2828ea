/// Task status lookup rows
///
/// Statuses are inserted once by the schema initializer and never mutated in
/// normal operation. The seeder reads their ids to assign tasks.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE status (
///     id SERIAL PRIMARY KEY,
///     name VARCHAR(50) UNIQUE NOT NULL
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgConnection;

/// A task status (`new`, `in progress`, `completed`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Status {
    /// Serial id
    pub id: i32,

    /// Unique status name
    pub name: String,
}

impl Status {
    /// Lists all statuses ordered by id
    pub async fn list(conn: &mut PgConnection) -> Result<Vec<Self>, sqlx::Error> {
        let statuses = sqlx::query_as::<_, Status>(
            r#"
            SELECT id, name
            FROM status
            ORDER BY id
            "#,
        )
        .fetch_all(conn)
        .await?;

        Ok(statuses)
    }

    /// Lists the ids of all statuses
    ///
    /// Returns an empty vector when the table exists but holds no rows.
    pub async fn list_ids(conn: &mut PgConnection) -> Result<Vec<i32>, sqlx::Error> {
        let ids = sqlx::query_scalar::<_, i32>("SELECT id FROM status ORDER BY id")
            .fetch_all(conn)
            .await?;

        Ok(ids)
    }

    /// Finds a status by its name
    pub async fn find_by_name(
        conn: &mut PgConnection,
        name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let status = sqlx::query_as::<_, Status>("SELECT id, name FROM status WHERE name = $1")
            .bind(name)
            .fetch_optional(conn)
            .await?;

        Ok(status)
    }

    /// Deletes a status by id
    ///
    /// Fails with a foreign key violation while any task references it.
    pub async fn delete(conn: &mut PgConnection, id: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM status WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts statuses
    pub async fn count(conn: &mut PgConnection) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM status")
            .fetch_one(conn)
            .await?;

        Ok(count)
    }
}
