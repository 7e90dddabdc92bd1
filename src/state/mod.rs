//! Application state
//!
//! Everything a handler needs, acquired once at startup and cloned cheaply
//! into each request: settings, the database pool, the OAuth client, the
//! session-token service, the email sender and the image host client.

use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::SessionTokens;
use crate::config::Settings;
use crate::email::EmailSender;
use crate::images::ImageHostClient;
use crate::oauth::OAuthClient;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    settings: Arc<Settings>,
    pool: PgPool,
    oauth: Arc<OAuthClient>,
    session_tokens: Arc<SessionTokens>,
    email: Arc<dyn EmailSender>,
    images: Arc<ImageHostClient>,
}

impl AppState {
    /// Assemble state from settings, a connected pool and an email backend
    ///
    /// # Errors
    ///
    /// Returns an error if the OAuth client cannot be built from the
    /// configured endpoints.
    pub fn new(
        settings: Settings,
        pool: PgPool,
        email: Arc<dyn EmailSender>,
    ) -> anyhow::Result<Self> {
        let oauth = OAuthClient::new(&settings.oauth)?;
        let session_tokens = SessionTokens::new(&settings.session);
        let images = ImageHostClient::new(&settings.images);

        Ok(Self {
            settings: Arc::new(settings),
            pool,
            oauth: Arc::new(oauth),
            session_tokens: Arc::new(session_tokens),
            email,
            images: Arc::new(images),
        })
    }

    /// Application settings
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Database pool
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// OAuth client
    #[must_use]
    pub fn oauth(&self) -> &OAuthClient {
        &self.oauth
    }

    /// Session-token service
    #[must_use]
    pub fn session_tokens(&self) -> &SessionTokens {
        &self.session_tokens
    }

    /// Email sender
    #[must_use]
    pub fn email(&self) -> &dyn EmailSender {
        self.email.as_ref()
    }

    /// Image host client
    #[must_use]
    pub fn images(&self) -> &ImageHostClient {
        &self.images
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::email::ConsoleBackend;

    #[tokio::test]
    async fn state_builds_and_clones() {
        let settings = Settings::default();
        let pool = PgPool::connect_lazy(&settings.database.url).unwrap();
        let state = AppState::new(settings, pool, Arc::new(ConsoleBackend)).unwrap();

        let cloned = state.clone();
        assert!(Arc::ptr_eq(&state.settings, &cloned.settings));
        assert_eq!(state.settings().server.port, 8080);
    }
}
