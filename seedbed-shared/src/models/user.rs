/// User rows and their queries
///
/// Users own tasks. Deleting a user cascades to their tasks.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id SERIAL PRIMARY KEY,
///     fullname VARCHAR(100) NOT NULL,
///     email VARCHAR(100) UNIQUE NOT NULL
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use seedbed_shared::models::user::{NewUser, User};
/// use sqlx::postgres::PgConnection;
///
/// # async fn example(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
/// let ids = User::create_many(conn, &[NewUser {
///     fullname: "Jane Doe".to_string(),
///     email: "jane.doe@example.com".to_string(),
/// }]).await?;
///
/// let user = User::find_by_id(conn, ids[0]).await?;
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgConnection;
use sqlx::{Postgres, QueryBuilder};

/// Persisted user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Serial id
    pub id: i32,

    /// Display name
    pub fullname: String,

    /// Email address, unique across users
    pub email: String,
}

/// Input for creating a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    /// Display name (at most 100 characters)
    pub fullname: String,

    /// Email address (at most 100 characters, unique)
    pub email: String,
}

impl User {
    /// Inserts users in one statement and returns their generated ids
    ///
    /// Ids are returned in the same order as `users`. An empty slice inserts
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if an email already exists (unique constraint
    /// violation) or the connection fails.
    pub async fn create_many(
        conn: &mut PgConnection,
        users: &[NewUser],
    ) -> Result<Vec<i32>, sqlx::Error> {
        if users.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::<Postgres>::new("INSERT INTO users (fullname, email) ");
        builder.push_values(users, |mut b, user| {
            b.push_bind(&user.fullname).push_bind(&user.email);
        });
        builder.push(" RETURNING id");

        let ids = builder
            .build_query_scalar::<i32>()
            .fetch_all(conn)
            .await?;

        Ok(ids)
    }

    /// Finds a user by id
    pub async fn find_by_id(conn: &mut PgConnection, id: i32) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, fullname, email
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(user)
    }

    /// Deletes a user by id, cascading to their tasks
    ///
    /// Returns true if the user existed.
    pub async fn delete(conn: &mut PgConnection, id: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts users
    pub async fn count(conn: &mut PgConnection) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(conn)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_serializes() {
        let user = NewUser {
            fullname: "Test User".to_string(),
            email: "test.user@example.com".to_string(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["fullname"], "Test User");
        assert_eq!(json["email"], "test.user@example.com");
    }

    // Tests against a live database are in tests/seed_tests.rs
}
