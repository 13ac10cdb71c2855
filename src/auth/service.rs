use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::{NewUser, UserModel, UserRole},
    password::{hash_password, verify_password},
    repository::UserRepository,
    token::TokenConfig,
    types::{AuthResponse, Claims, CredentialsRequest, UpdatePasswordRequest},
};
use crate::shared::{AppError, AppState};

fn bad_credentials() -> AppError {
    AppError::Unauthorized("Your email or password is incorrect.".to_string())
}

/// Service for accounts, logins and token checks
pub struct AuthService {
    repository: Arc<dyn UserRepository + Send + Sync>,
    token_config: TokenConfig,
}

impl AuthService {
    pub fn new(
        repository: Arc<dyn UserRepository + Send + Sync>,
        token_config: TokenConfig,
    ) -> Self {
        Self {
            repository,
            token_config,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            Arc::clone(&state.user_repository),
            state.token_config.clone(),
        )
    }

    fn issue_token(&self, user: &UserModel) -> Result<AuthResponse, AppError> {
        let is_admin = user.is_admin();
        let token = self
            .token_config
            .create_token(user.id, user.email.clone(), is_admin)?;

        Ok(AuthResponse {
            token,
            expires_in: self.token_config.expires_in_seconds(),
            user_id: user.id,
            is_admin,
        })
    }

    #[instrument(skip(self, request))]
    pub async fn login(&self, request: CredentialsRequest) -> Result<AuthResponse, AppError> {
        let (email, password) = request.into_parts().ok_or_else(|| {
            AppError::Validation("Email and password are required.".to_string())
        })?;

        let user = self
            .repository
            .get_user_by_email(&email)
            .await?
            .ok_or_else(|| {
                warn!(email = %email, "Login for unknown email");
                bad_credentials()
            })?;

        if !verify_password(&password, &user.password_hash) {
            warn!(user_id = user.id, "Login with wrong password");
            return Err(bad_credentials());
        }

        info!(user_id = user.id, "Login successful");
        self.issue_token(&user)
    }

    /// Creates a regular user account and signs a token for it
    #[instrument(skip(self, request))]
    pub async fn sign_up(&self, request: CredentialsRequest) -> Result<AuthResponse, AppError> {
        let (email, password) = request.into_parts().ok_or_else(|| {
            AppError::Validation("Email and password are required.".to_string())
        })?;

        let user = self
            .create_account(email, &password, UserRole::User)
            .await?;
        info!(user_id = user.id, "User created");
        self.issue_token(&user)
    }

    #[instrument(skip(self, request))]
    pub async fn update_password(
        &self,
        user_id: i64,
        request: UpdatePasswordRequest,
    ) -> Result<(), AppError> {
        let (Some(current), Some(new)) = (
            request.current_password.filter(|p| !p.is_empty()),
            request.new_password.filter(|p| !p.is_empty()),
        ) else {
            return Err(AppError::Validation(
                "Current password and new password are required.".to_string(),
            ));
        };

        let user = self
            .repository
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

        if !verify_password(&current, &user.password_hash) {
            return Err(AppError::Unauthorized(
                "Current password is incorrect.".to_string(),
            ));
        }

        let hash = hash_password(&new)?;
        self.repository.update_password_hash(user_id, &hash).await?;
        info!(user_id, "Password updated");
        Ok(())
    }

    /// Creates the configured admin account if it does not exist yet.
    /// Returns whether an account was created.
    #[instrument(skip(self, password))]
    pub async fn bootstrap_admin(&self, email: &str, password: &str) -> Result<bool, AppError> {
        if self.repository.get_user_by_email(email).await?.is_some() {
            return Ok(false);
        }

        let user = self
            .create_account(email.to_string(), password, UserRole::Admin)
            .await?;
        info!(user_id = user.id, email = %user.email, "Bootstrap admin created");
        Ok(true)
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        self.token_config.validate_token(token)
    }

    async fn create_account(
        &self,
        email: String,
        password: &str,
        role: UserRole,
    ) -> Result<UserModel, AppError> {
        if self.repository.get_user_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("User with this email already exists"));
        }

        let password_hash = hash_password(password)?;
        self.repository
            .create_user(&NewUser {
                email,
                password_hash,
                role,
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::AppStateBuilder;

    fn credentials(email: &str, password: &str) -> CredentialsRequest {
        CredentialsRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[tokio::test]
    async fn bootstrap_admin_then_login() {
        let state = AppStateBuilder::new().build();
        let service = AuthService::from_state(&state);

        assert!(service.bootstrap_admin("to@example.com", "s3cret").await.unwrap());
        assert!(!service.bootstrap_admin("to@example.com", "other").await.unwrap());

        let response = service.login(credentials("to@example.com", "s3cret")).await.unwrap();
        assert!(response.is_admin);
        assert_eq!(response.expires_in, 691_200);

        let claims = service.validate_token(&response.token).unwrap();
        assert_eq!(claims.user_id, response.user_id);
        assert!(claims.is_admin);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_are_unauthorized() {
        let state = AppStateBuilder::new().build();
        let service = AuthService::from_state(&state);
        service.sign_up(credentials("p@example.com", "right")).await.unwrap();

        assert!(matches!(
            service.login(credentials("p@example.com", "wrong")).await,
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            service.login(credentials("nobody@example.com", "right")).await,
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            service.login(CredentialsRequest { email: None, password: None }).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn sign_up_conflicts_on_existing_email() {
        let state = AppStateBuilder::new().build();
        let service = AuthService::from_state(&state);
        let response = service.sign_up(credentials("u@example.com", "pw")).await.unwrap();
        assert!(!response.is_admin);

        assert!(matches!(
            service.sign_up(credentials("u@example.com", "pw2")).await,
            Err(AppError::Conflict { .. })
        ));
    }

    #[tokio::test]
    async fn update_password_checks_the_current_one() {
        let state = AppStateBuilder::new().build();
        let service = AuthService::from_state(&state);
        let user = service.sign_up(credentials("u@example.com", "old")).await.unwrap();

        let wrong = UpdatePasswordRequest {
            current_password: Some("nope".to_string()),
            new_password: Some("new".to_string()),
        };
        assert!(matches!(
            service.update_password(user.user_id, wrong).await,
            Err(AppError::Unauthorized(_))
        ));

        let right = UpdatePasswordRequest {
            current_password: Some("old".to_string()),
            new_password: Some("new".to_string()),
        };
        service.update_password(user.user_id, right).await.unwrap();
        assert!(service.login(credentials("u@example.com", "new")).await.is_ok());
        assert!(service.login(credentials("u@example.com", "old")).await.is_err());
    }
}
