use crate::{
    auth::{AuthResponse, LoginRequest, PasswordHasher, RegisterRequest, TokenIssuer},
    error::AppError,
    models::User,
};
use actix_web::{post, web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

/// Register a new user
///
/// Creates a new account and returns it. The password is stored as a bcrypt hash.
#[post("/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    hasher: web::Data<dyn PasswordHasher>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;
    let RegisterRequest {
        email,
        name,
        password,
    } = register_data.into_inner();

    let existing_user = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&**pool)
        .await?;

    if existing_user.is_some() {
        return Err(AppError::BadRequest("Email already registered".into()));
    }

    let hasher = hasher.into_inner();
    let password_hash = web::block(move || hasher.hash(&password))
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))??;

    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (email, name, password_hash) VALUES ($1, $2, $3)
         RETURNING id, email, name, created_at",
    )
    .bind(&email)
    .bind(&name)
    .bind(&password_hash)
    .fetch_one(&**pool)
    .await
    .map_err(|e| match AppError::from(e) {
        // Lost a race with a concurrent registration of the same email.
        AppError::BadRequest(_) => AppError::BadRequest("Email already registered".into()),
        other => other,
    })?;

    log::info!("registered user {}", user.id);
    Ok(HttpResponse::Created().json(user))
}

/// Login user
///
/// Exchanges email and password for a bearer token. Unknown accounts and wrong
/// passwords produce the same `401 Invalid credentials` response.
#[post("/login")]
pub async fn login(
    issuer: web::Data<TokenIssuer>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let issued = issuer
        .authenticate(&login_data.email, &login_data.password)
        .await?;

    Ok(HttpResponse::Ok().json(AuthResponse::from(issued)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{BcryptHasher, MemoryCredentialStore, Principal, TokenCodec};
    use actix_web::{http::StatusCode, test, App};
    use chrono::Duration;
    use serde_json::json;
    use std::sync::Arc;

    fn issuer() -> TokenIssuer {
        let hasher = BcryptHasher::new(4);
        let hash = hasher.hash("Password123!").unwrap();
        let store = MemoryCredentialStore::new()
            .with_principal(Principal::new(1, "login@example.com", hash, "Login"));
        TokenIssuer::new(
            TokenCodec::new(b"routes-test-secret"),
            Arc::new(store),
            Arc::new(hasher),
            Duration::hours(1),
        )
        .unwrap()
    }

    #[actix_rt::test]
    async fn test_login_validation() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(issuer()))
                .service(login),
        )
        .await;

        let cases = [
            (json!({ "email": "invalid-email", "password": "Password123!" }), StatusCode::UNPROCESSABLE_ENTITY),
            (json!({ "email": "login@example.com" }), StatusCode::BAD_REQUEST),
            (json!({ "email": "login@example.com", "password": "nope" }), StatusCode::UNAUTHORIZED),
            (json!({ "email": "login@example.com", "password": "Password123!" }), StatusCode::OK),
        ];

        for (payload, expected) in cases {
            let req = test::TestRequest::post()
                .uri("/login")
                .set_json(&payload)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), expected, "payload: {}", payload);
        }
    }
}
