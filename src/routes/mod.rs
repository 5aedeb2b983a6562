pub mod admin;
pub mod auth;
pub mod health;
pub mod tasks;

use actix_web::{error, web, HttpRequest};

use crate::auth::AuthMiddleware;
use crate::error::{AppError, MessageError};

/// Mounts `/health` and the `/api` tree.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health)
        .service(web::scope("/api").configure(api));
}

fn api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .app_data(json_config(render_message))
            .service(auth::register)
            .service(auth::login),
    )
    .service(
        web::scope("/tasks")
            .wrap(AuthMiddleware::authenticated())
            .app_data(json_config(render_error))
            .app_data(path_config("Task not found", render_error))
            .service(tasks::list_tasks)
            .service(tasks::create_task)
            .service(tasks::update_task)
            .service(tasks::delete_task),
    )
    .service(
        web::scope("/admin")
            .wrap(AuthMiddleware::admin())
            .app_data(path_config("User not found", render_message))
            .service(admin::list_users)
            .service(admin::delete_user),
    );
}

fn render_error(err: AppError) -> actix_web::Error {
    err.into()
}

fn render_message(err: AppError) -> actix_web::Error {
    MessageError(err).into()
}

/// Malformed JSON bodies are caller errors, rendered in the scope's dialect.
fn json_config(render: fn(AppError) -> actix_web::Error) -> web::JsonConfig {
    web::JsonConfig::default().error_handler(move |err: error::JsonPayloadError, _req: &HttpRequest| {
        log::debug!("Rejected request body: {}", err);
        render(AppError::InvalidInput(format!("Invalid request body: {}", err)))
    })
}

/// An id that does not parse cannot name an existing resource.
fn path_config(
    not_found: &'static str,
    render: fn(AppError) -> actix_web::Error,
) -> web::PathConfig {
    web::PathConfig::default().error_handler(move |_err: error::PathError, _req: &HttpRequest| {
        render(AppError::NotFound(not_found.into()))
    })
}
