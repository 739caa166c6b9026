use axum::Router;

use jobboard::{build_router, AppConfig, AppState};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub app: Router,
}

pub struct TestSetupBuilder {
    config: AppConfig,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn with_session_expiration_days(mut self, days: i64) -> Self {
        self.config.session_expiration_days = days;
        self
    }

    pub fn build(self) -> TestSetup {
        let state = AppState::in_memory(&self.config);
        let app = build_router(state, &self.config);

        TestSetup { app }
    }
}
