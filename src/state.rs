use std::sync::Arc;
use std::time::Duration;

use crate::auth::{PasswordHasher, TokenService};
use crate::services::{AdminService, TaskService, UserDirectory};
use crate::store::{MemoryTaskStore, MemoryUserStore, TaskStore, UserStore};

/// Shared application state, registered once as `web::Data<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub users: UserDirectory,
    pub tasks: TaskService,
    pub admin: AdminService,
    pub tokens: TokenService,
    /// Budget given to each request for its storage and hashing work.
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(
        user_store: Arc<dyn UserStore>,
        task_store: Arc<dyn TaskStore>,
        tokens: TokenService,
        hasher: PasswordHasher,
        request_timeout: Duration,
    ) -> Self {
        let users = UserDirectory::new(user_store, hasher);
        let tasks = TaskService::new(task_store, users.clone());
        let admin = AdminService::new(users.clone(), tasks.clone());
        Self {
            users,
            tasks,
            admin,
            tokens,
            request_timeout,
        }
    }

    /// State backed by the in-process stores.
    pub fn in_memory(tokens: TokenService, hasher: PasswordHasher, request_timeout: Duration) -> Self {
        Self::new(
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemoryTaskStore::new()),
            tokens,
            hasher,
            request_timeout,
        )
    }
}
