/// Task rows and their queries
///
/// Every task references a status (deletion restricted) and an owning user
/// (deletion cascades).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id SERIAL PRIMARY KEY,
///     title VARCHAR(100) NOT NULL,
///     description TEXT,
///     status_id INTEGER NOT NULL REFERENCES status (id) ON DELETE RESTRICT,
///     user_id INTEGER NOT NULL REFERENCES users (id) ON DELETE CASCADE
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgConnection;
use sqlx::{Postgres, QueryBuilder};

/// Persisted task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Serial id
    pub id: i32,

    /// Short title
    pub title: String,

    /// Optional long description
    pub description: Option<String>,

    /// Current status
    pub status_id: i32,

    /// Owner
    pub user_id: i32,
}

/// Input for creating a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    /// Short title (at most 100 characters)
    pub title: String,

    /// Optional long description
    pub description: Option<String>,

    /// Must reference an existing status
    pub status_id: i32,

    /// Must reference an existing user
    pub user_id: i32,
}

impl Task {
    /// Inserts tasks in one statement and returns their generated ids
    ///
    /// # Errors
    ///
    /// Returns a foreign key violation if a status or user id does not exist.
    pub async fn create_many(
        conn: &mut PgConnection,
        tasks: &[NewTask],
    ) -> Result<Vec<i32>, sqlx::Error> {
        if tasks.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO tasks (title, description, status_id, user_id) ",
        );
        builder.push_values(tasks, |mut b, task| {
            b.push_bind(&task.title)
                .push_bind(&task.description)
                .push_bind(task.status_id)
                .push_bind(task.user_id);
        });
        builder.push(" RETURNING id");

        let ids = builder
            .build_query_scalar::<i32>()
            .fetch_all(conn)
            .await?;

        Ok(ids)
    }

    /// Lists all tasks ordered by id
    pub async fn list(conn: &mut PgConnection) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status_id, user_id
            FROM tasks
            ORDER BY id
            "#,
        )
        .fetch_all(conn)
        .await?;

        Ok(tasks)
    }

    /// Lists the tasks owned by a user
    pub async fn list_for_user(
        conn: &mut PgConnection,
        user_id: i32,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status_id, user_id
            FROM tasks
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(conn)
        .await?;

        Ok(tasks)
    }

    /// Counts tasks
    pub async fn count(conn: &mut PgConnection) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks")
            .fetch_one(conn)
            .await?;

        Ok(count)
    }
}
