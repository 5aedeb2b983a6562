use std::sync::Arc;

use uuid::Uuid;

use crate::auth::{PasswordHasher, CREDENTIALS_REQUIRED};
use crate::config::AdminSeed;
use crate::deadline::Deadline;
use crate::error::AppError;
use crate::models::{Role, User, UserSummary};
use crate::store::{within, StoreError, UserStore};

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Registration, lookup and credential checks over a `UserStore`.
#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn UserStore>, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }

    /// Creates a regular account and returns its id.
    ///
    /// The existence pre-check gives the common case a cheap answer; the store's
    /// unique insert decides races between concurrent registrations.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        deadline: Deadline,
    ) -> Result<Uuid, AppError> {
        if username.is_empty() || password.is_empty() {
            return Err(AppError::InvalidInput(CREDENTIALS_REQUIRED.into()));
        }
        let user = self.create(username, password, Role::User, deadline).await?;
        log::info!("Registered user {} ({})", user.username, user.id);
        Ok(user.id)
    }

    pub async fn find_by_username(
        &self,
        username: &str,
        deadline: Deadline,
    ) -> Result<User, AppError> {
        within(deadline, self.store.find_by_username(username))
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    pub async fn find_by_id(&self, id: Uuid, deadline: Deadline) -> Result<User, AppError> {
        within(deadline, self.store.find_by_id(id))
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    pub async fn exists(&self, id: Uuid, deadline: Deadline) -> Result<bool, AppError> {
        Ok(within(deadline, self.store.find_by_id(id)).await?.is_some())
    }

    pub async fn list_all(&self, deadline: Deadline) -> Result<Vec<UserSummary>, AppError> {
        Ok(within(deadline, self.store.list()).await?)
    }

    pub async fn delete_by_id(&self, id: Uuid, deadline: Deadline) -> Result<(), AppError> {
        if within(deadline, self.store.delete(id)).await? {
            log::info!("Deleted user {}", id);
            Ok(())
        } else {
            Err(AppError::NotFound("User not found".into()))
        }
    }

    /// Checks a username/password pair. An unknown username and a wrong
    /// password are reported identically.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
        deadline: Deadline,
    ) -> Result<User, AppError> {
        let user = match within(deadline, self.store.find_by_username(username)).await? {
            Some(user) => user,
            None => {
                log::warn!("Login attempt for unknown username");
                return Err(AppError::InvalidInput(INVALID_CREDENTIALS.into()));
            }
        };

        if !self
            .hasher
            .verify(password, &user.password_hash, deadline)
            .await?
        {
            log::warn!("Wrong password for user {}", user.id);
            return Err(AppError::InvalidInput(INVALID_CREDENTIALS.into()));
        }

        log::info!("User {} logged in", user.id);
        Ok(user)
    }

    /// Ensures the configured administrator account exists. An existing account
    /// of the same name is left untouched.
    pub async fn seed_admin(&self, seed: &AdminSeed, deadline: Deadline) -> Result<(), AppError> {
        if let Some(existing) =
            within(deadline, self.store.find_by_username(&seed.username)).await?
        {
            if existing.role != Role::Admin {
                log::warn!(
                    "Account {} exists without the admin role; not promoting it",
                    seed.username
                );
            }
            return Ok(());
        }

        match self
            .create(&seed.username, &seed.password, Role::Admin, deadline)
            .await
        {
            Ok(user) => {
                log::info!("Seeded administrator {} ({})", user.username, user.id);
                Ok(())
            }
            // Lost a race against another instance seeding the same account.
            Err(AppError::Conflict(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn create(
        &self,
        username: &str,
        password: &str,
        role: Role,
        deadline: Deadline,
    ) -> Result<User, AppError> {
        if within(deadline, self.store.find_by_username(username))
            .await?
            .is_some()
        {
            return Err(username_taken());
        }

        let password_hash = self.hasher.hash(password, deadline).await?;
        let user = User::new(username.to_owned(), password_hash, role);

        match within(deadline, self.store.insert(&user)).await {
            Ok(()) => Ok(user),
            Err(StoreError::UniqueViolation) => Err(username_taken()),
            Err(e) => Err(e.into()),
        }
    }
}

fn username_taken() -> AppError {
    AppError::Conflict("Username already exists".into())
}
