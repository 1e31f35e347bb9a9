//! Durable storage for users and tasks.
//!
//! Handlers only see the `Store` trait. `PgStore` backs production deployments,
//! `MemoryStore` serves local runs without a database and the test-suite.
//! Both enforce the same uniqueness rules: one account per email, one task name
//! per owner.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{NewTask, NewUser, Task, TaskInput, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub const DUPLICATE_EMAIL: &str = "Email already registered";
pub const DUPLICATE_TASK: &str = "Task already exists.";

#[async_trait]
pub trait Store: Send + Sync {
    /// Persists a new account. Fails with `BadRequest` if the email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;

    async fn find_user(&self, id: i32) -> Result<Option<User>, AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// All tasks of `owner_id`, ordered by id.
    async fn list_tasks(&self, owner_id: i32) -> Result<Vec<Task>, AppError>;

    async fn find_task(&self, id: i32) -> Result<Option<Task>, AppError>;

    async fn find_task_by_name(&self, owner_id: i32, name: &str)
        -> Result<Option<Task>, AppError>;

    /// Fails with `BadRequest` if the owner already has a task with that name.
    async fn create_task(&self, task: NewTask) -> Result<Task, AppError>;

    /// Overwrites name and description; the owner is left untouched.
    async fn update_task(&self, id: i32, input: &TaskInput) -> Result<Task, AppError>;

    /// Returns whether a task was removed.
    async fn delete_task(&self, id: i32) -> Result<bool, AppError>;
}
