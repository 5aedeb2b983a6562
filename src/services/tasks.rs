use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use super::UserDirectory;
use crate::deadline::Deadline;
use crate::error::AppError;
use crate::models::{Task, TaskInput, TaskPatch};
use crate::store::{within, TaskStore};

/// Per-owner task management. A task owned by someone else is reported exactly
/// like one that does not exist.
#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn TaskStore>,
    owners: UserDirectory,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>, owners: UserDirectory) -> Self {
        Self { store, owners }
    }

    pub async fn list(&self, owner_id: Uuid, deadline: Deadline) -> Result<Vec<Task>, AppError> {
        Ok(within(deadline, self.store.list_by_owner(owner_id)).await?)
    }

    pub async fn create(
        &self,
        owner_id: Uuid,
        input: TaskInput,
        deadline: Deadline,
    ) -> Result<Task, AppError> {
        input.validate()?;

        // Tokens outlive account removal; a deleted owner must not regain tasks.
        if !self.owners.exists(owner_id, deadline).await? {
            log::warn!("Task creation by removed account {}", owner_id);
            return Err(AppError::Unauthenticated("Please authenticate".into()));
        }

        let task = Task::new(input, owner_id);
        within(deadline, self.store.insert(&task)).await?;
        log::debug!("User {} created task {}", owner_id, task.id);
        Ok(task)
    }

    pub async fn update(
        &self,
        owner_id: Uuid,
        task_id: Uuid,
        patch: TaskPatch,
        deadline: Deadline,
    ) -> Result<Task, AppError> {
        patch.validate()?;

        within(deadline, self.store.update(owner_id, task_id, &patch))
            .await?
            .ok_or_else(task_not_found)
    }

    pub async fn delete(
        &self,
        owner_id: Uuid,
        task_id: Uuid,
        deadline: Deadline,
    ) -> Result<(), AppError> {
        if within(deadline, self.store.delete(owner_id, task_id)).await? {
            log::debug!("User {} deleted task {}", owner_id, task_id);
            Ok(())
        } else {
            Err(task_not_found())
        }
    }

    /// Removes every task of `owner_id`, returning how many were removed.
    pub async fn purge_owner(&self, owner_id: Uuid, deadline: Deadline) -> Result<u64, AppError> {
        Ok(within(deadline, self.store.delete_by_owner(owner_id)).await?)
    }
}

fn task_not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}
