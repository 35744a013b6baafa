pub mod auth;
pub mod comments;
pub mod health;
pub mod tasks;
pub mod users;

use actix_web::web;

/// Mounts every `/api` route. Authentication is applied by `AuthMiddleware`
/// around the whole app, not per scope.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(auth::login)
            .service(auth::register),
    )
    .service(
        web::scope("/users")
            .service(users::me)
            .service(users::get_user_by_email),
    )
    .service(
        web::scope("/tasks")
            .service(tasks::create_task)
            .service(tasks::get_tasks_by_author)
            .service(tasks::get_tasks_by_assignee)
            .service(tasks::get_task)
            .service(tasks::update_task)
            .service(tasks::delete_task),
    )
    .service(
        web::scope("/comments")
            .service(comments::add_comment)
            .service(comments::get_comments_by_task),
    );
}
