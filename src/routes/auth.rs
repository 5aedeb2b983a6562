use crate::{
    auth::{LoginRequest, MessageResponse, RegisterRequest, TokenResponse},
    deadline::Deadline,
    error::{AppError, MessageError},
    state::AppState,
};
use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new user
///
/// Creates a regular account. No token is issued; the client logs in afterwards.
///
/// ## Responses:
/// - `201 Created`: `{"message": "User registered successfully"}`.
/// - `400 Bad Request`: empty username or password, or the username is taken.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    deadline: Deadline,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, MessageError> {
    register_data.validate().map_err(AppError::from)?;

    state
        .users
        .register(&register_data.username, &register_data.password, deadline)
        .await?;

    Ok(HttpResponse::Created().json(MessageResponse::new("User registered successfully")))
}

/// Login user
///
/// Authenticates a user and returns a session token valid for one hour.
///
/// ## Responses:
/// - `200 OK`: `{"token": "..."}`.
/// - `400 Bad Request`: missing fields, or `{"message": "Invalid username or password"}`.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    deadline: Deadline,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, MessageError> {
    login_data.validate().map_err(AppError::from)?;

    let user = state
        .users
        .authenticate(&login_data.username, &login_data.password, deadline)
        .await?;
    let token = state.tokens.issue(user.id, user.role)?;

    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}
