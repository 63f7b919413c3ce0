//! User service - registration, login, lookup and block toggling.
//!
//! Composes the repository, the password hasher, the token service and
//! the access policy. Hashing runs on tokio's blocking pool.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{policy, NewUser, Password, Registration, User, UserRole};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UserRepository;

use super::token_service::TokenService;

/// Digest verified against when the email is unknown, so a miss costs
/// the same as a wrong password.
static DUMMY_PASSWORD: Lazy<Option<Password>> =
    Lazy::new(|| Password::new("timing-equalizer-not-a-real-password").ok());

fn dummy_password() -> Password {
    DUMMY_PASSWORD
        .clone()
        .unwrap_or_else(|| Password::from_hash(String::new()))
}

/// Successful login result
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Create an account; the email must not be taken
    async fn register(&self, registration: Registration) -> AppResult<User>;

    /// Check credentials of an active account and issue a token
    async fn login(&self, email: String, password: String) -> AppResult<AuthSession>;

    /// Fetch one user, enforcing owner-or-admin access
    async fn find_by_id(&self, id: Uuid, requester_id: Uuid, requester_role: UserRole)
        -> AppResult<User>;

    /// Every user; callers gate this to admins
    async fn find_all(&self) -> AppResult<Vec<User>>;

    /// Flip the active flag, enforcing owner-or-admin access
    async fn toggle_block(
        &self,
        id: Uuid,
        requester_id: Uuid,
        requester_role: UserRole,
    ) -> AppResult<User>;
}

/// Concrete implementation of UserService.
pub struct UserManager {
    users: Arc<dyn UserRepository>,
    tokens: Arc<TokenService>,
}

impl UserManager {
    pub fn new(users: Arc<dyn UserRepository>, tokens: Arc<TokenService>) -> Self {
        Self { users, tokens }
    }

    /// Load the target, then apply the access policy.
    async fn load_accessible(
        &self,
        id: Uuid,
        requester_id: Uuid,
        requester_role: UserRole,
    ) -> AppResult<User> {
        let user = self.users.find_by_id(id).await?.ok_or_not_found()?;

        if !policy::can_access(requester_id, requester_role, user.id) {
            tracing::warn!(%requester_id, target_id = %id, "Access to user record denied");
            return Err(AppError::AccessDenied);
        }

        Ok(user)
    }
}

async fn hash_blocking(plain: String) -> AppResult<Password> {
    tokio::task::spawn_blocking(move || Password::new(&plain))
        .await
        .map_err(|e| AppError::internal(format!("Hashing task failed: {}", e)))?
}

async fn verify_blocking(stored: Option<Password>, plain: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || stored.unwrap_or_else(dummy_password).verify(&plain))
        .await
        .map_err(|e| AppError::internal(format!("Verification task failed: {}", e)))
}

#[async_trait]
impl UserService for UserManager {
    async fn register(&self, registration: Registration) -> AppResult<User> {
        if self
            .users
            .find_by_email(&registration.email)
            .await?
            .is_some()
        {
            return Err(AppError::DuplicateEmail);
        }

        let password_hash = hash_blocking(registration.password).await?.into_string();

        let user = self
            .users
            .create(NewUser {
                full_name: registration.full_name,
                birth_date: registration.birth_date,
                email: registration.email,
                password_hash,
                role: registration.role.unwrap_or_default(),
            })
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "User registered");
        Ok(user)
    }

    async fn login(&self, email: String, password: String) -> AppResult<AuthSession> {
        let found = self.users.find_by_email(&email).await?;

        let stored = found
            .as_ref()
            .map(|user| Password::from_hash(user.password_hash.clone()));
        let password_valid = verify_blocking(stored, password).await?;

        let user = match found {
            Some(user) if user.is_active && password_valid => user,
            Some(user) => {
                tracing::warn!(user_id = %user.id, active = user.is_active, "Login rejected");
                return Err(AppError::InvalidCredentials);
            }
            None => {
                tracing::warn!("Login rejected: unknown email");
                return Err(AppError::InvalidCredentials);
            }
        };

        let token = self.tokens.issue(user.id, user.role)?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(AuthSession { token, user })
    }

    async fn find_by_id(
        &self,
        id: Uuid,
        requester_id: Uuid,
        requester_role: UserRole,
    ) -> AppResult<User> {
        self.load_accessible(id, requester_id, requester_role).await
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        self.users.find_all().await
    }

    async fn toggle_block(
        &self,
        id: Uuid,
        requester_id: Uuid,
        requester_role: UserRole,
    ) -> AppResult<User> {
        let mut user = self.load_accessible(id, requester_id, requester_role).await?;
        let active = user.toggle_active();

        let user = self.users.save(user).await?;

        tracing::info!(user_id = %id, %requester_id, active, "User block state changed");
        Ok(user)
    }
}
