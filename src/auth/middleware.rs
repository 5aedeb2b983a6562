use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::token::{Identity, TokenService};
use crate::error::{AppError, MessageError};
use crate::state::AppState;

/// What the gate demands of the caller before the wrapped scope runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Any valid token.
    Authenticated,
    /// A valid token carrying the administrator capability.
    Admin,
}

/// Turns a raw `Authorization` header value into an identity.
///
/// Missing header, a scheme other than `Bearer`, an empty token and an invalid
/// token are all rejected with the same `Unauthenticated` error.
pub fn authenticate(header: Option<&str>, tokens: &TokenService) -> Result<Identity, AppError> {
    let token = header
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthenticated("Please authenticate".into()))?;

    Ok(tokens.verify(token)?)
}

/// Applies `requirement` on top of [`authenticate`].
pub fn authorize(
    header: Option<&str>,
    tokens: &TokenService,
    requirement: Requirement,
) -> Result<Identity, AppError> {
    let identity = authenticate(header, tokens)?;
    if requirement == Requirement::Admin && !identity.is_admin() {
        log::warn!(
            "User {} attempted an administrator operation",
            identity.user_id
        );
        return Err(AppError::Forbidden(
            "Administrator capability required".into(),
        ));
    }
    Ok(identity)
}

pub struct AuthMiddleware {
    requirement: Requirement,
}

impl AuthMiddleware {
    pub fn authenticated() -> Self {
        Self {
            requirement: Requirement::Authenticated,
        }
    }

    pub fn admin() -> Self {
        Self {
            requirement: Requirement::Admin,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            requirement: self.requirement,
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    requirement: Requirement,
}

impl<S> AuthMiddlewareService<S> {
    fn reject(&self, error: AppError) -> Error {
        // Admin routes speak the `{"message": ...}` dialect.
        match self.requirement {
            Requirement::Admin => MessageError(error).into(),
            Requirement::Authenticated => error.into(),
        }
    }
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let outcome = match req.app_data::<web::Data<AppState>>() {
            Some(state) => {
                let auth_header = req
                    .headers()
                    .get(header::AUTHORIZATION)
                    .and_then(|value| value.to_str().ok());
                authorize(auth_header, &state.tokens, self.requirement)
            }
            None => Err(AppError::Internal(
                "AppState is not registered on the application".into(),
            )),
        };

        match outcome {
            Ok(identity) => {
                req.extensions_mut().insert(identity);
                Box::pin(self.service.call(req))
            }
            Err(app_err) => {
                let err = self.reject(app_err);
                Box::pin(async move { Err(err) })
            }
        }
    }
}
