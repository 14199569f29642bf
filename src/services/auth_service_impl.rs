//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;

use crate::auth::TokenIssuer;
use crate::config::SecurityConfig;
use crate::db::Store;
use crate::services::auth_service::{AccountInfo, AuthError, AuthService, LoginSession};

pub struct SeaOrmAuthService {
    store: Store,
    issuer: TokenIssuer,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, issuer: TokenIssuer, security: SecurityConfig) -> Self {
        Self {
            store,
            issuer,
            security,
        }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, username: &str, password: &str) -> Result<AccountInfo, AuthError> {
        if self
            .store
            .get_account_by_username(username)
            .await?
            .is_some()
        {
            return Err(AuthError::UsernameTaken);
        }

        let account = self
            .store
            .create_account(username, password, &self.security)
            .await?;

        tracing::info!("Account created: {}", account.username);

        Ok(AccountInfo {
            id: account.id,
            username: account.username,
            created_at: account.created_at,
        })
    }

    async fn login(&self, username: &str, password: &str) -> Result<LoginSession, AuthError> {
        // An unknown username and a wrong password land on the same arm.
        let Some(account) = self
            .store
            .verify_account_password(username, password)
            .await?
        else {
            return Err(AuthError::InvalidCredentials);
        };

        let token = self.issuer.issue(account.id, &account.username)?;

        Ok(LoginSession {
            account_id: account.id,
            username: account.username,
            token,
            expires_in_seconds: self.issuer.ttl_seconds(),
        })
    }
}
