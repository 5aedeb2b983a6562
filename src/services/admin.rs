use uuid::Uuid;

use super::{TaskService, UserDirectory};
use crate::deadline::Deadline;
use crate::error::AppError;
use crate::models::UserSummary;

/// Account administration. Callers must hold the administrator capability;
/// that is enforced by the access gate in front of the admin routes.
#[derive(Clone)]
pub struct AdminService {
    directory: UserDirectory,
    tasks: TaskService,
}

impl AdminService {
    pub fn new(directory: UserDirectory, tasks: TaskService) -> Self {
        Self { directory, tasks }
    }

    pub async fn list_users(&self, deadline: Deadline) -> Result<Vec<UserSummary>, AppError> {
        self.directory.list_all(deadline).await
    }

    /// Removes the account, then its tasks. A failed purge is logged and does not
    /// undo the deletion.
    pub async fn delete_user(&self, user_id: Uuid, deadline: Deadline) -> Result<(), AppError> {
        self.directory.delete_by_id(user_id, deadline).await?;

        match self.tasks.purge_owner(user_id, deadline).await {
            Ok(count) => log::info!("Purged {} task(s) of deleted user {}", count, user_id),
            Err(e) => log::error!("Failed to purge tasks of deleted user {}: {}", user_id, e),
        }
        Ok(())
    }
}
