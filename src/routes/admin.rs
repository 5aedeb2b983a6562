use crate::{
    auth::{AdminUser, MessageResponse},
    deadline::Deadline,
    error::MessageError,
    state::AppState,
};
use actix_web::{delete, get, web, HttpResponse, Responder};
use uuid::Uuid;

/// Lists every account as `[{"id", "username"}]`.
#[get("/users")]
pub async fn list_users(
    state: web::Data<AppState>,
    _admin: AdminUser,
    deadline: Deadline,
) -> Result<impl Responder, MessageError> {
    let users = state.admin.list_users(deadline).await?;
    Ok(HttpResponse::Ok().json(users))
}

/// Deletes an account together with its tasks.
///
/// ## Responses:
/// - `200 OK`: `{"message": "User deleted successfully"}`.
/// - `404 Not Found`: `{"message": "User not found"}`.
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<AppState>,
    admin: AdminUser,
    deadline: Deadline,
    user_id: web::Path<Uuid>,
) -> Result<impl Responder, MessageError> {
    let user_id = user_id.into_inner();
    state.admin.delete_user(user_id, deadline).await?;
    log::info!("Administrator {} deleted user {}", admin.0.user_id, user_id);
    Ok(HttpResponse::Ok().json(MessageResponse::new("User deleted successfully")))
}
