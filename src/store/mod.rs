//! Persistence ports.
//!
//! The services only see the `UserStore` and `TaskStore` traits. Two adapters are
//! provided: [`memory`] keeps everything in process, [`postgres`] talks to a
//! Postgres database through `sqlx`. Both enforce username uniqueness atomically
//! on insert and scope every task mutation by `(id, owner_id)` in a single step.

pub mod memory;
pub mod postgres;

use std::future::Future;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::deadline::{Deadline, Elapsed};
use crate::models::{Task, TaskPatch, User, UserSummary};

pub use memory::{MemoryTaskStore, MemoryUserStore};
pub use postgres::{PgTaskStore, PgUserStore};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The insert collided with an existing unique value.
    #[error("unique constraint violated")]
    UniqueViolation,

    #[error("storage operation exceeded the request deadline")]
    Timeout,

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<Elapsed> for StoreError {
    fn from(_: Elapsed) -> StoreError {
        StoreError::Timeout
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> StoreError {
        match error.as_database_error() {
            Some(db_error) if db_error.is_unique_violation() => StoreError::UniqueViolation,
            _ => StoreError::Backend(error.to_string()),
        }
    }
}

/// Runs a storage operation under the caller's deadline.
pub async fn within<T, F>(deadline: Deadline, operation: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    deadline.run(operation).await?
}

/// User records. Usernames are unique.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Persists a new user. Fails with `UniqueViolation` if the username is taken.
    async fn insert(&self, user: &User) -> Result<(), StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// All users, oldest first, without credentials.
    async fn list(&self) -> Result<Vec<UserSummary>, StoreError>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Task records. Every lookup and mutation is keyed by id and owner together.
#[async_trait]
pub trait TaskStore: Send + Sync + 'static {
    /// Tasks of `owner_id`, newest first.
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Task>, StoreError>;

    async fn insert(&self, task: &Task) -> Result<(), StoreError>;

    /// Applies `patch` to the task matching both `id` and `owner_id`.
    async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        patch: &TaskPatch,
    ) -> Result<Option<Task>, StoreError>;

    /// Returns whether a task matching both `id` and `owner_id` was removed.
    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<bool, StoreError>;

    /// Removes every task of `owner_id`, returning how many were removed.
    async fn delete_by_owner(&self, owner_id: Uuid) -> Result<u64, StoreError>;
}
