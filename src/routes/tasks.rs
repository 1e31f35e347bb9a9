use crate::{
    auth::Principal,
    error::AppError,
    models::{NewTask, Task, TaskDetail, TaskInput, TaskSummary},
    store::{Store, DUPLICATE_TASK},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `GET /api/tasks/list`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskListResponse {
    pub tasks: Vec<TaskSummary>,
    /// Email of the authenticated owner.
    pub owner: String,
}

/// Body of create and update responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskResponse {
    pub message: String,
    pub task: TaskDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Resolves a task and checks that `principal` owns it.
///
/// A missing task is reported before ownership is considered.
async fn owned_task(store: &dyn Store, id: i32, principal: &Principal) -> Result<Task, AppError> {
    let task = store
        .find_task(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    if !principal.owns(task.owner_id) {
        log::warn!(
            "user {} attempted to access task {} owned by user {}",
            principal.id,
            task.id,
            task.owner_id
        );
        return Err(AppError::Forbidden("You do not own this task.".into()));
    }
    Ok(task)
}

/// Lists every task owned by the authenticated user.
///
/// ## Responses:
/// - `200 OK`: `{"tasks": [{id, name, description}], "owner": <email>}`.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
#[get("/list")]
pub async fn list_tasks(
    store: web::Data<dyn Store>,
    principal: Principal,
) -> Result<impl Responder, AppError> {
    let tasks = store
        .list_tasks(principal.id)
        .await?
        .iter()
        .map(TaskSummary::from)
        .collect();

    Ok(HttpResponse::Ok().json(TaskListResponse {
        tasks,
        owner: principal.email,
    }))
}

/// Creates a new task for the authenticated user.
///
/// ## Request Body:
/// - `name`: required, unique among the caller's tasks.
/// - `description` (optional).
///
/// ## Responses:
/// - `201 Created`: `{"message", "task": {id, name, description, owner}}`.
/// - `400 Bad Request`: Missing/empty name, or the caller already has a task with this name.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
#[post("/create")]
pub async fn create_task(
    store: web::Data<dyn Store>,
    principal: Principal,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    if store
        .find_task_by_name(principal.id, &task_data.name)
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest(DUPLICATE_TASK.into()));
    }

    let task = store
        .create_task(NewTask::new(task_data.into_inner(), principal.id))
        .await?;
    log::info!("user {} created task {}", principal.id, task.id);

    Ok(HttpResponse::Created().json(TaskResponse {
        message: "Task created successfully".to_string(),
        task: TaskDetail::new(task, principal.email),
    }))
}

/// Retrieves a specific task by its ID.
///
/// ## Responses:
/// - `200 OK`: `{id, name, description, owner}`.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `403 Forbidden`: The task belongs to another user.
/// - `404 Not Found`: No task with this ID exists.
#[get("/{id}")]
pub async fn show_task(
    store: web::Data<dyn Store>,
    principal: Principal,
    task_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let task = owned_task(store.get_ref(), task_id.into_inner(), &principal).await?;
    Ok(HttpResponse::Ok().json(TaskDetail::new(task, principal.email)))
}

/// Overwrites the name and description of a task the caller owns.
///
/// The owner never changes. Renaming onto another of the caller's task names is
/// rejected by the store with `400 Bad Request`.
///
/// ## Responses:
/// - `200 OK`: `{"message", "task": {id, name, description, owner}}`.
/// - `403 Forbidden` / `404 Not Found`: As for `show_task`.
#[put("/update/{id}")]
pub async fn update_task(
    store: web::Data<dyn Store>,
    principal: Principal,
    task_id: web::Path<i32>,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let task = owned_task(store.get_ref(), task_id.into_inner(), &principal).await?;
    task_data.validate()?;

    let updated = store.update_task(task.id, &task_data).await?;

    Ok(HttpResponse::Ok().json(TaskResponse {
        message: "Task updated successfully".to_string(),
        task: TaskDetail::new(updated, principal.email),
    }))
}

/// Permanently deletes a task the caller owns.
///
/// ## Responses:
/// - `200 OK`: `{"message": "Task deleted successfully"}`.
/// - `403 Forbidden` / `404 Not Found`: As for `show_task`.
#[delete("/delete/{id}")]
pub async fn delete_task(
    store: web::Data<dyn Store>,
    principal: Principal,
    task_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let task = owned_task(store.get_ref(), task_id.into_inner(), &principal).await?;

    if !store.delete_task(task.id).await? {
        // Removed concurrently between the lookup and the delete.
        return Err(AppError::NotFound("Task not found".into()));
    }
    log::info!("user {} deleted task {}", principal.id, task.id);

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Task deleted successfully".to_string(),
    }))
}
