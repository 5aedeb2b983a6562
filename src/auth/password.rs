use actix_web::web;

use crate::config::DEFAULT_BCRYPT_COST;
use crate::deadline::Deadline;
use crate::error::AppError;

/// bcrypt hashing and verification, run on actix's blocking thread pool so a
/// hash in progress never stalls the worker serving other requests.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub async fn hash(&self, password: &str, deadline: Deadline) -> Result<String, AppError> {
        let password = password.to_owned();
        let cost = self.cost;
        deadline
            .run(web::block(move || bcrypt::hash(password, cost)))
            .await
            .map_err(|_| AppError::Internal("Password hashing exceeded the deadline".into()))??
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    /// A stored hash that bcrypt cannot parse never matches.
    pub async fn verify(
        &self,
        password: &str,
        hashed_password: &str,
        deadline: Deadline,
    ) -> Result<bool, AppError> {
        let password = password.to_owned();
        let hashed_password = hashed_password.to_owned();
        let outcome = deadline
            .run(web::block(move || bcrypt::verify(password, &hashed_password)))
            .await
            .map_err(|_| {
                AppError::Internal("Password verification exceeded the deadline".into())
            })??;

        match outcome {
            Ok(matches) => Ok(matches),
            Err(e) => {
                log::warn!("Stored password hash could not be verified: {}", e);
                Ok(false)
            }
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_BCRYPT_COST)
    }
}
