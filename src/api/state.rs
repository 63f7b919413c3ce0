//! Application state - Dependency injection container.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Database, UserStore};
use crate::services::{TokenService, UserManager, UserService};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// User use cases
    pub user_service: Arc<dyn UserService>,
    /// Token verification for the auth middleware
    pub tokens: Arc<TokenService>,
}

impl AppState {
    /// Wire the SeaORM store, token service and user service together.
    pub fn from_config(database: &Database, config: &Config) -> Self {
        let tokens = Arc::new(TokenService::from_config(config));
        let users = Arc::new(UserStore::new(database.get_connection()));
        let user_service = Arc::new(UserManager::new(users, tokens.clone()));

        Self::new(user_service, tokens)
    }

    /// Create state from already constructed services.
    pub fn new(user_service: Arc<dyn UserService>, tokens: Arc<TokenService>) -> Self {
        Self {
            user_service,
            tokens,
        }
    }
}
