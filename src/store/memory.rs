use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{Store, DUPLICATE_EMAIL, DUPLICATE_TASK};
use crate::error::AppError;
use crate::models::{NewTask, NewUser, Task, TaskInput, User};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i32, User>,
    tasks: BTreeMap<i32, Task>,
    next_user_id: i32,
    next_task_id: i32,
}

impl Tables {
    fn name_taken(&self, owner_id: i32, name: &str, except: Option<i32>) -> bool {
        self.tasks
            .values()
            .any(|t| t.owner_id == owner_id && t.name == name && Some(t.id) != except)
    }
}

/// In-process store with sequential ids starting at 1.
///
/// Every operation takes the lock once, so check-and-insert is atomic here.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(AppError::BadRequest(DUPLICATE_EMAIL.into()));
        }

        tables.next_user_id += 1;
        let created = User {
            id: tables.next_user_id,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        tables.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_user(&self, id: i32) -> Result<Option<User>, AppError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn list_tasks(&self, owner_id: i32) -> Result<Vec<Task>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .values()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn find_task(&self, id: i32) -> Result<Option<Task>, AppError> {
        Ok(self.tables.read().await.tasks.get(&id).cloned())
    }

    async fn find_task_by_name(
        &self,
        owner_id: i32,
        name: &str,
    ) -> Result<Option<Task>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .values()
            .find(|t| t.owner_id == owner_id && t.name == name)
            .cloned())
    }

    async fn create_task(&self, task: NewTask) -> Result<Task, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&task.owner_id) {
            return Err(AppError::DatabaseError(format!(
                "owner {} does not exist",
                task.owner_id
            )));
        }
        if tables.name_taken(task.owner_id, &task.name, None) {
            return Err(AppError::BadRequest(DUPLICATE_TASK.into()));
        }

        tables.next_task_id += 1;
        let now = Utc::now();
        let created = Task {
            id: tables.next_task_id,
            name: task.name,
            description: task.description,
            owner_id: task.owner_id,
            created_at: now,
            updated_at: now,
        };
        tables.tasks.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_task(&self, id: i32, input: &TaskInput) -> Result<Task, AppError> {
        let mut tables = self.tables.write().await;
        let owner_id = match tables.tasks.get(&id) {
            Some(task) => task.owner_id,
            None => return Err(AppError::NotFound("Task not found".into())),
        };
        if tables.name_taken(owner_id, &input.name, Some(id)) {
            return Err(AppError::BadRequest(DUPLICATE_TASK.into()));
        }

        let task = tables
            .tasks
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
        task.name = input.name.clone();
        task.description = input.description.clone();
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn delete_task(&self, id: i32) -> Result<bool, AppError> {
        Ok(self.tables.write().await.tasks.remove(&id).is_some())
    }
}
