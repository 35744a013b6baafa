use crate::{
    auth::CurrentPrincipal,
    error::AppError,
    models::{Comment, CommentInput},
};
use actix_web::{get, post, web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Adds a comment to a task on behalf of the authenticated user.
#[post("")]
pub async fn add_comment(
    pool: web::Data<PgPool>,
    comment_data: web::Json<CommentInput>,
    principal: CurrentPrincipal,
) -> Result<impl Responder, AppError> {
    comment_data.validate()?;
    let input = comment_data.into_inner();

    let task_exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM tasks WHERE id = $1)")
            .bind(input.task_id)
            .fetch_one(&**pool)
            .await?;
    if !task_exists {
        return Err(AppError::NotFound("Task not found".into()));
    }

    let comment = sqlx::query_as::<_, Comment>(
        "INSERT INTO comments (id, task_id, author_id, content)
         VALUES ($1, $2, $3, $4)
         RETURNING id, task_id, author_id, content, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(input.task_id)
    .bind(principal.0.id)
    .bind(input.content)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Created().json(comment))
}

/// Lists the comments of a task in the order they were written.
#[get("/task/{task_id}")]
pub async fn get_comments_by_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    _principal: CurrentPrincipal,
) -> Result<impl Responder, AppError> {
    let comments = sqlx::query_as::<_, Comment>(
        "SELECT id, task_id, author_id, content, created_at
         FROM comments WHERE task_id = $1 ORDER BY created_at",
    )
    .bind(task_id.into_inner())
    .fetch_all(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(comments))
}
