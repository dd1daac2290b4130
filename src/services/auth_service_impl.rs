//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::db::Store;
use crate::services::auth_service::{AuthError, AuthService, LoginResult, UserInfo};

pub struct SeaOrmAuthService {
    store: Store,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError> {
        let Some(user) = self.store.verify_user_password(username, password).await? else {
            warn!(username, "Failed login attempt");
            return Err(AuthError::InvalidCredentials);
        };

        info!(username = %user.username, "User logged in");
        Ok(LoginResult {
            username: user.username,
            api_key: user.api_key,
        })
    }

    async fn verify_api_key(&self, api_key: &str) -> Result<Option<UserInfo>, AuthError> {
        if api_key.is_empty() {
            return Ok(None);
        }

        let user = self.store.verify_api_key(api_key).await?;
        Ok(user.map(|u| UserInfo {
            id: u.id,
            username: u.username,
        }))
    }

    async fn get_user_info(&self, user_id: i32) -> Result<UserInfo, AuthError> {
        let user = self
            .store
            .get_user_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(UserInfo {
            id: user.id,
            username: user.username,
        })
    }

    async fn regenerate_api_key(&self, username: &str) -> Result<LoginResult, AuthError> {
        if self.store.get_user_by_username(username).await?.is_none() {
            return Err(AuthError::UserNotFound);
        }

        let api_key = self.store.regenerate_api_key(username).await?;
        info!(username, "API key regenerated");

        Ok(LoginResult {
            username: username.to_string(),
            api_key,
        })
    }
}
