/// Relational models for the task-management database
///
/// # Models
///
/// - `status`: Fixed lookup rows (`new`, `in progress`, `completed`)
/// - `user`: Task owners
/// - `task`: Tasks referencing a status and a user
///
/// All queries take a `&mut PgConnection`, so they run equally on a plain
/// connection or inside a transaction (`&mut *tx`).

pub mod status;
pub mod task;
pub mod user;

pub use status::Status;
pub use task::{NewTask, Task};
pub use user::{NewUser, User};
