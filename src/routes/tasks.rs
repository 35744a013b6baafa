use crate::{
    auth::CurrentPrincipal,
    error::AppError,
    models::{Page, PageQuery, Task, TaskInput},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

const TASK_COLUMNS: &str =
    "id, title, description, status, priority, author_id, assignee_id, created_at, updated_at";

/// Which user column a task listing is keyed on.
#[derive(Debug, Clone, Copy)]
enum TaskOwner {
    Author,
    Assignee,
}

impl TaskOwner {
    fn column(self) -> &'static str {
        match self {
            TaskOwner::Author => "author_id",
            TaskOwner::Assignee => "assignee_id",
        }
    }
}

async fn page_of_tasks(
    pool: &PgPool,
    owner: TaskOwner,
    user_id: i64,
    query: &PageQuery,
) -> Result<Page<Task>, AppError> {
    let column = owner.column();

    let total = sqlx::query_scalar::<_, i64>(&format!(
        "SELECT COUNT(*) FROM tasks WHERE {} = $1",
        column
    ))
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    let tasks = sqlx::query_as::<_, Task>(&format!(
        "SELECT {} FROM tasks WHERE {} = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        TASK_COLUMNS, column
    ))
    .bind(user_id)
    .bind(query.size())
    .bind(query.offset())
    .fetch_all(pool)
    .await?;

    Ok(Page::new(tasks, query, total))
}

/// Creates a new task authored by the authenticated user.
///
/// ## Responses:
/// - `201 Created`: the new `Task`.
/// - `401 Unauthorized`: no valid bearer token.
/// - `422 Unprocessable Entity`: `TaskInput` validation failed.
#[post("")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    task_data: web::Json<TaskInput>,
    principal: CurrentPrincipal,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = Task::new(task_data.into_inner(), principal.0.id);

    let result = sqlx::query_as::<_, Task>(&format!(
        "INSERT INTO tasks (id, title, description, status, priority, author_id, assignee_id, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(task.id)
    .bind(task.title)
    .bind(task.description)
    .bind(task.status)
    .bind(task.priority)
    .bind(task.author_id)
    .bind(task.assignee_id)
    .bind(task.created_at)
    .bind(task.updated_at)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Created().json(result))
}

/// Lists tasks created by a user, newest first.
#[get("/author/{user_id}")]
pub async fn get_tasks_by_author(
    pool: web::Data<PgPool>,
    user_id: web::Path<i64>,
    query: web::Query<PageQuery>,
    _principal: CurrentPrincipal,
) -> Result<impl Responder, AppError> {
    let page = page_of_tasks(&pool, TaskOwner::Author, user_id.into_inner(), &query).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Lists tasks assigned to a user, newest first.
#[get("/assignee/{user_id}")]
pub async fn get_tasks_by_assignee(
    pool: web::Data<PgPool>,
    user_id: web::Path<i64>,
    query: web::Query<PageQuery>,
    _principal: CurrentPrincipal,
) -> Result<impl Responder, AppError> {
    let page = page_of_tasks(&pool, TaskOwner::Assignee, user_id.into_inner(), &query).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Retrieves a specific task by its ID.
#[get("/{id}")]
pub async fn get_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    _principal: CurrentPrincipal,
) -> Result<impl Responder, AppError> {
    let task = sqlx::query_as::<_, Task>(&format!(
        "SELECT {} FROM tasks WHERE id = $1",
        TASK_COLUMNS
    ))
    .bind(task_id.into_inner())
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    Ok(HttpResponse::Ok().json(task))
}

/// Updates an existing task.
///
/// Only the author may update a task; anyone else gets `404 Not Found`.
#[put("/{id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskInput>,
    principal: CurrentPrincipal,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let task_uuid = task_id.into_inner();

    let result = sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks
         SET title = $1, description = $2, status = $3, priority = $4, assignee_id = $5, updated_at = NOW()
         WHERE id = $6 AND author_id = $7
         RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(&task_data.title)
    .bind(&task_data.description)
    .bind(task_data.status)
    .bind(task_data.priority)
    .bind(task_data.assignee_id)
    .bind(task_uuid)
    .bind(principal.0.id)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Task not found or not owned by user".into()))?;

    Ok(HttpResponse::Ok().json(result))
}

/// Deletes a task by its ID. Only the author may delete it.
///
/// ## Responses:
/// - `204 No Content`: on successful deletion.
/// - `404 Not Found`: the task does not exist or is not owned by the caller.
#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    principal: CurrentPrincipal,
) -> Result<impl Responder, AppError> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND author_id = $2")
        .bind(task_id.into_inner())
        .bind(principal.0.id)
        .execute(&**pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(
            "Task not found or not owned by user".into(),
        ));
    }

    Ok(HttpResponse::NoContent().finish())
}
