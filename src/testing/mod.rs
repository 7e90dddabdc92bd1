//! Test support
//!
//! Builders for state and servers that work without a live database: the
//! pool is created lazily, so routes that fail before their first query
//! (validation, authentication) exercise end to end.

use std::sync::Arc;

use crate::config::Settings;
use crate::email::ConsoleBackend;
use crate::router;
use crate::state::AppState;

/// Settings with deterministic secrets for tests
#[must_use]
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.session.secret = "test-secret".to_string();
    settings.scheduler.token = "test-service-token".to_string();
    settings
}

/// Application state over a lazy pool and the console email backend
#[must_use]
pub fn test_state() -> AppState {
    let settings = test_settings();
    let pool = sqlx::PgPool::connect_lazy(&settings.database.url).expect("lazy pool");
    AppState::new(settings, pool, Arc::new(ConsoleBackend)).expect("test state")
}

/// Full application router wrapped in an `axum-test` server
#[must_use]
pub fn test_server() -> axum_test::TestServer {
    axum_test::TestServer::new(router::build(test_state())).expect("test server")
}
