//! Request-scoped deadlines.
//!
//! Every storage call and every password hash made on behalf of a request runs
//! under the request's `Deadline`. Handlers obtain one through the `FromRequest`
//! implementation, which reads the configured timeout from `AppState`.

use std::future::{ready, Future, Ready};
use std::time::Duration;

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use tokio::time::Instant;

use crate::error::AppError;
use crate::state::AppState;

/// Returned when the deadline passes before the wrapped operation completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("deadline exceeded")]
pub struct Elapsed;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline(Instant);

impl Deadline {
    pub fn after(timeout: Duration) -> Self {
        Deadline(Instant::now() + timeout)
    }

    pub fn at(instant: Instant) -> Self {
        Deadline(instant)
    }

    pub fn instant(&self) -> Instant {
        self.0
    }

    /// Drives `fut` to completion unless the deadline passes first.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, Elapsed> {
        tokio::time::timeout_at(self.0, fut)
            .await
            .map_err(|_| Elapsed)
    }
}

impl FromRequest for Deadline {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.app_data::<web::Data<AppState>>() {
            Some(state) => ready(Ok(Deadline::after(state.request_timeout))),
            None => ready(Err(AppError::Internal(
                "AppState is not registered on the application".into(),
            )
            .into())),
        }
    }
}
