use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::token::Identity;
use crate::error::{AppError, MessageError};

/// The caller's identity, placed in request extensions by `AuthMiddleware`.
///
/// Handlers on routes without the middleware get `401` from this extractor
/// rather than running without an identity.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub Identity);

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Identity>().copied() {
            Some(identity) => ready(Ok(AuthenticatedUser(identity))),
            None => {
                let err = AppError::Unauthenticated("Please authenticate".to_string());
                ready(Err(err.into()))
            }
        }
    }
}

/// An identity holding the administrator capability.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser(pub Identity);

impl FromRequest for AdminUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let err = match req.extensions().get::<Identity>().copied() {
            Some(identity) if identity.is_admin() => return ready(Ok(AdminUser(identity))),
            Some(_) => AppError::Forbidden("Administrator capability required".to_string()),
            None => AppError::Unauthenticated("Please authenticate".to_string()),
        };
        ready(Err(MessageError(err).into()))
    }
}
