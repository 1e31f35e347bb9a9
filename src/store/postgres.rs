use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};

use super::{Store, DUPLICATE_EMAIL, DUPLICATE_TASK};
use crate::auth::PasswordHash;
use crate::error::AppError;
use crate::models::{NewTask, NewUser, Task, TaskInput, User};

const TASK_COLUMNS: &str = "id, name, description, owner_id, created_at, updated_at";

#[derive(FromRow)]
struct UserRow {
    id: i32,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            password_hash: PasswordHash::from_stored(row.password_hash),
            created_at: row.created_at,
        }
    }
}

/// Store backed by PostgreSQL through a `sqlx` connection pool.
///
/// Uniqueness is enforced by the schema (`users.email`, `tasks(owner_id, name)`),
/// so concurrent inserts cannot slip past an application-level check.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool against `database_url` and applies pending migrations.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Migration failed: {}", e)))?;
        log::info!("database schema is up to date");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Maps a unique constraint violation to a client error carrying `message`.
fn on_unique_violation(error: sqlx::Error, message: &str) -> AppError {
    let unique = matches!(&error, sqlx::Error::Database(db) if db.is_unique_violation());
    if unique {
        AppError::BadRequest(message.into())
    } else {
        error.into()
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (email, password_hash) VALUES ($1, $2)
             RETURNING id, email, password_hash, created_at",
        )
        .bind(&user.email)
        .bind(user.password_hash.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| on_unique_violation(e, DUPLICATE_EMAIL))?;

        Ok(row.into())
    }

    async fn find_user(&self, id: i32) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn list_tasks(&self, owner_id: i32) -> Result<Vec<Task>, AppError> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE owner_id = $1 ORDER BY id",
            TASK_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    async fn find_task(&self, id: i32) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE id = $1",
            TASK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    async fn find_task_by_name(
        &self,
        owner_id: i32,
        name: &str,
    ) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE owner_id = $1 AND name = $2",
            TASK_COLUMNS
        ))
        .bind(owner_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    async fn create_task(&self, task: NewTask) -> Result<Task, AppError> {
        let created = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (name, description, owner_id) VALUES ($1, $2, $3) RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(&task.name)
        .bind(&task.description)
        .bind(task.owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| on_unique_violation(e, DUPLICATE_TASK))?;

        Ok(created)
    }

    async fn update_task(&self, id: i32, input: &TaskInput) -> Result<Task, AppError> {
        let updated = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks SET name = $1, description = $2, updated_at = NOW()
             WHERE id = $3 RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.description)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| on_unique_violation(e, DUPLICATE_TASK))?;

        updated.ok_or_else(|| AppError::NotFound("Task not found".into()))
    }

    async fn delete_task(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
