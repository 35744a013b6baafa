use crate::{auth::CurrentPrincipal, error::AppError, models::User};
use actix_web::{get, web, HttpResponse, Responder};
use sqlx::PgPool;

/// Returns the principal the request was authenticated as.
#[get("/me")]
pub async fn me(principal: CurrentPrincipal) -> impl Responder {
    HttpResponse::Ok().json(principal.into_inner())
}

/// Look up a user by email.
///
/// ## Responses:
/// - `200 OK`: the `User`.
/// - `401 Unauthorized`: no valid bearer token.
/// - `404 Not Found`: no account with that email.
#[get("/{email}")]
pub async fn get_user_by_email(
    pool: web::Data<PgPool>,
    email: web::Path<String>,
    _principal: CurrentPrincipal,
) -> Result<impl Responder, AppError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, name, created_at FROM users WHERE email = $1",
    )
    .bind(email.into_inner())
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(HttpResponse::Ok().json(user))
}
