/// Relational database layer
///
/// # Modules
///
/// - `connection`: Single-connection provider with health check and timeout
/// - `schema`: Idempotent schema initializer (drop, create, seed statuses)
///
/// Row types and their queries are in the `models` module at crate root level.

pub mod connection;
pub mod schema;
