use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{Task, TaskInput, TaskStatus, TaskUpdate},
};
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

const TASK_COLUMNS: &str = "id, title, description, status, due_date, user_id, created_at";

/// Retrieves the authenticated user's tasks, newest first.
pub async fn get_tasks(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let tasks: Vec<Task> = sqlx::query_as(&format!(
        "SELECT {} FROM tasks WHERE user_id = $1 ORDER BY created_at DESC",
        TASK_COLUMNS
    ))
    .bind(user.0.id)
    .fetch_all(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task owned by the authenticated user.
///
/// Expects a JSON payload conforming to `TaskInput`; the owner is taken from
/// the authenticated identity, never from the body.
pub async fn create_task(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    // Validate input
    task_data.validate()?;

    let task = Task::new(task_data.into_inner(), user.0.id);

    let created: Task = sqlx::query_as(&format!(
        "INSERT INTO tasks (id, title, description, status, due_date, user_id) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(task.id)
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.status)
    .bind(task.due_date)
    .bind(task.user_id)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Task created successfully",
        "task": created
    })))
}

async fn find_owned_task(
    pool: &PgPool,
    task_id: Uuid,
    owner_id: Uuid,
) -> Result<Task, AppError> {
    let task: Option<Task> = sqlx::query_as(&format!(
        "SELECT {} FROM tasks WHERE id = $1",
        TASK_COLUMNS
    ))
    .bind(task_id)
    .fetch_optional(pool)
    .await?;

    // A task owned by someone else is indistinguishable from a missing one.
    match task {
        Some(task) if task.user_id == owner_id => Ok(task),
        _ => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Retrieves a specific task by its ID. 404 if absent or owned by another
/// user.
pub async fn get_task(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = find_owned_task(&pool, task_id.into_inner(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Partially updates a task. Only the fields present in the payload change.
pub async fn update_task(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskUpdate>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let existing = find_owned_task(&pool, task_id.into_inner(), user.0.id).await?;
    let update = task_data.into_inner();

    let updated: Task = sqlx::query_as(&format!(
        "UPDATE tasks SET title = $1, description = $2, status = $3, due_date = $4 \
         WHERE id = $5 AND user_id = $6 RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(update.title.unwrap_or(existing.title))
    .bind(update.description.unwrap_or(existing.description))
    .bind(update.status.unwrap_or(existing.status))
    .bind(update.due_date.unwrap_or(existing.due_date))
    .bind(existing.id)
    .bind(user.0.id)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Task updated successfully",
        "task": updated
    })))
}

/// Deletes a task by its ID.
pub async fn delete_task(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
        .bind(task_id.into_inner())
        .bind(user.0.id)
        .execute(&**pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Task not found".into()));
    }

    Ok(HttpResponse::NoContent().finish())
}

/// Marks a task as completed.
///
/// Unlike the other task operations this one is not ownership-scoped: any
/// authenticated user may complete any task that exists.
pub async fn complete_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let completed: Option<Task> = sqlx::query_as(&format!(
        "UPDATE tasks SET status = $1 WHERE id = $2 RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(TaskStatus::Completed)
    .bind(task_id.into_inner())
    .fetch_optional(&**pool)
    .await?;

    match completed {
        Some(task) => Ok(HttpResponse::Ok().json(json!({
            "message": "Task marked as completed",
            "task": task
        }))),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}
