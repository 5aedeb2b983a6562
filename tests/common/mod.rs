#![allow(dead_code)]

use std::time::Duration;

use actix_http::Request;
use actix_web::body::{self, MessageBody};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use serde_json::{json, Value};

use tasktrack::auth::{PasswordHasher, TokenService};
use tasktrack::config::AdminSeed;
use tasktrack::deadline::Deadline;
use tasktrack::routes;
use tasktrack::state::AppState;

pub const SECRET: &str = "integration_test_secret";
pub const ADMIN_USERNAME: &str = "root";
pub const ADMIN_PASSWORD: &str = "root_password";

/// In-memory state with a cheap bcrypt cost.
pub fn test_state() -> AppState {
    AppState::in_memory(
        TokenService::new(SECRET),
        PasswordHasher::new(4),
        Duration::from_secs(30),
    )
}

pub async fn init_app(
    state: AppState,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(state))
            .configure(routes::config),
    )
    .await
}

/// Sends `req` and returns the status with the JSON body (`Null` when the body
/// is not JSON). Errors raised by middleware are rendered the way the server
/// would render them.
pub async fn call<S, B>(app: &S, req: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, bytes) = match test::try_call_service(app, req).await {
        Ok(resp) => {
            let status = resp.status();
            (status, test::read_body(resp).await)
        }
        Err(err) => {
            let resp = err.error_response();
            let status = resp.status();
            (status, body::to_bytes(resp.into_body()).await.unwrap())
        }
    };
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

pub async fn register<S, B>(app: &S, username: &str, password: &str) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();
    call(app, req).await
}

pub async fn login<S, B>(app: &S, username: &str, password: &str) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();
    call(app, req).await
}

/// Registers `username` and returns a fresh bearer token for it.
pub async fn token_for<S, B>(app: &S, username: &str, password: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = register(app, username, password).await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
    let (status, body) = login(app, username, password).await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["token"].as_str().unwrap().to_string()
}

/// Seeds the administrator into `state` and logs in as it.
pub async fn admin_token<S, B>(app: &S, state: &AppState) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let seed = AdminSeed {
        username: ADMIN_USERNAME.into(),
        password: ADMIN_PASSWORD.into(),
    };
    state
        .users
        .seed_admin(&seed, Deadline::after(Duration::from_secs(30)))
        .await
        .unwrap();
    let (status, body) = login(app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
    assert_eq!(status, StatusCode::OK, "admin login failed: {}", body);
    body["token"].as_str().unwrap().to_string()
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}
