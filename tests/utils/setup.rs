use axum::Router;

use smx_tdb::{
    auth::types::CredentialsRequest, build_router, AppState, AuthService, TokenConfig,
};

pub const ADMIN_EMAIL: &str = "to@example.com";
pub const ADMIN_PASSWORD: &str = "correct horse battery staple";

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub app: Router,
    pub state: AppState,
    /// Token of the bootstrap admin, obtained through a real login
    pub admin_token: String,
}

pub struct TestSetupBuilder {
    token_hours: i64,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self { token_hours: 192 }
    }

    pub async fn build(self) -> TestSetup {
        let state = AppState::in_memory(TokenConfig::new(
            "integration-test-secret".to_string(),
            self.token_hours,
        ));

        let auth = AuthService::from_state(&state);
        auth.bootstrap_admin(ADMIN_EMAIL, ADMIN_PASSWORD)
            .await
            .unwrap();
        let login = auth
            .login(CredentialsRequest {
                email: Some(ADMIN_EMAIL.to_string()),
                password: Some(ADMIN_PASSWORD.to_string()),
            })
            .await
            .unwrap();

        TestSetup {
            app: build_router(state.clone(), None),
            state,
            admin_token: login.token,
        }
    }
}
