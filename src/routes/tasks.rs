use crate::{
    auth::{AuthenticatedUser, MessageResponse},
    deadline::Deadline,
    error::AppError,
    models::{TaskInput, TaskPatch},
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use uuid::Uuid;

/// Retrieves the authenticated user's tasks, newest first.
///
/// ## Responses:
/// - `200 OK`: Returns a JSON array of `Task` objects.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
#[get("")]
pub async fn list_tasks(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    deadline: Deadline,
) -> Result<impl Responder, AppError> {
    let tasks = state.tasks.list(user.0.user_id, deadline).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task owned by the authenticated user.
///
/// ## Request Body:
/// - `title` (required, non-empty).
/// - `description` (optional).
///
/// ## Responses:
/// - `201 Created`: Returns the created `Task` with `completed: false`.
/// - `400 Bad Request`: If the title is missing or empty.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    deadline: Deadline,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let task = state
        .tasks
        .create(user.0.user_id, task_data.into_inner(), deadline)
        .await?;
    Ok(HttpResponse::Created().json(task))
}

/// Partially updates a task. Only `title`, `description` and `completed` are
/// applied; any other field in the body is ignored.
///
/// ## Responses:
/// - `200 OK`: Returns the updated `Task`.
/// - `400 Bad Request`: If `title` is present but empty.
/// - `404 Not Found`: If the task does not exist or belongs to another user.
#[put("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    deadline: Deadline,
    task_id: web::Path<Uuid>,
    patch: web::Json<TaskPatch>,
) -> Result<impl Responder, AppError> {
    let task = state
        .tasks
        .update(user.0.user_id, task_id.into_inner(), patch.into_inner(), deadline)
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task.
///
/// ## Responses:
/// - `200 OK`: `{"message": "Task deleted successfully"}`.
/// - `404 Not Found`: If the task does not exist or belongs to another user.
#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    deadline: Deadline,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    state
        .tasks
        .delete(user.0.user_id, task_id.into_inner(), deadline)
        .await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Task deleted successfully")))
}
