//! OAuth client: code exchange and profile resolution
//!
//! The exchange goes through the `oauth2` crate (form-encoded POST with
//! grant type `authorization_code`, the configured redirect URI and client
//! credentials); the profile fetch is a bearer GET through a reused
//! `reqwest::Client`. Neither call retries, and no compensating action is
//! taken when a later step fails after an earlier one succeeded.

use oauth2::{
    AuthUrl, AuthorizationCode, Client, ClientId, ClientSecret, RedirectUrl, RequestTokenError,
    TokenResponse, TokenUrl,
};

use crate::config::OAuthSettings;

use super::types::{OAuthError, OAuthToken, ProviderClient, ProviderProfile};

/// Client for the configured OAuth provider
pub struct OAuthClient {
    client: ProviderClient,
    http: reqwest::Client,
    profile_url: String,
}

impl OAuthClient {
    /// Build a client from provider settings
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::Config`] if any endpoint URL is invalid or the
    /// HTTP client cannot be constructed.
    pub fn new(settings: &OAuthSettings) -> Result<Self, OAuthError> {
        let client: ProviderClient = Client::new(ClientId::new(settings.client_id.clone()))
            .set_client_secret(ClientSecret::new(settings.client_secret.clone()))
            .set_auth_uri(
                AuthUrl::new(settings.auth_url.clone())
                    .map_err(|e| OAuthError::Config(format!("Invalid auth URL: {e}")))?,
            )
            .set_token_uri(
                TokenUrl::new(settings.token_url.clone())
                    .map_err(|e| OAuthError::Config(format!("Invalid token URL: {e}")))?,
            )
            .set_redirect_uri(
                RedirectUrl::new(settings.redirect_uri.clone())
                    .map_err(|e| OAuthError::Config(format!("Invalid redirect URI: {e}")))?,
            );

        // Redirects stay disabled: token endpoints must answer directly.
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| OAuthError::Config(e.to_string()))?;

        Ok(Self {
            client,
            http,
            profile_url: settings.profile_url.clone(),
        })
    }

    /// Exchange an authorization code for provider tokens
    ///
    /// # Errors
    ///
    /// [`OAuthError::TokenExchange`] when the provider rejects the code or
    /// the response lacks a usable access token (the provider's error
    /// description is surfaced when available); [`OAuthError::Transport`]
    /// when the endpoint cannot be reached.
    pub async fn exchange_code(&self, code: &str) -> Result<OAuthToken, OAuthError> {
        let response = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&self.http)
            .await
            .map_err(describe_exchange_error)?;

        let access_token = response.access_token().secret().clone();
        if access_token.is_empty() {
            return Err(OAuthError::TokenExchange(
                "Provider returned an empty access token".to_string(),
            ));
        }

        Ok(OAuthToken {
            access_token,
            refresh_token: response.refresh_token().map(|t| t.secret().clone()),
            id_token: response.extra_fields().id_token.clone(),
        })
    }

    /// Fetch the profile behind an access token
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::ProfileFetch`] on non-success status or an
    /// unreadable body.
    pub async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile, OAuthError> {
        let response = self
            .http
            .get(&self.profile_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| OAuthError::ProfileFetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(OAuthError::ProfileFetch(format!(
                "HTTP {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| OAuthError::ProfileFetch(format!("Failed to parse JSON: {e}")))
    }
}

fn describe_exchange_error<RE>(
    err: RequestTokenError<RE, oauth2::basic::BasicErrorResponse>,
) -> OAuthError
where
    RE: std::error::Error + 'static,
{
    match err {
        RequestTokenError::ServerResponse(response) => {
            let message = response
                .error_description()
                .cloned()
                .unwrap_or_else(|| response.error().to_string());
            OAuthError::TokenExchange(message)
        }
        RequestTokenError::Request(e) => OAuthError::Transport(e.to_string()),
        // Parse failures include the "no access_token in body" case.
        other => OAuthError::TokenExchange(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> OAuthSettings {
        OAuthSettings {
            client_id: "test-client-id".to_string(),
            client_secret: "test-client-secret".to_string(),
            redirect_uri: "http://localhost:3000/auth/callback".to_string(),
            auth_url: "https://provider.test/oauth/authorize".to_string(),
            token_url: "https://provider.test/oauth/token".to_string(),
            profile_url: "https://provider.test/v2/profile".to_string(),
        }
    }

    #[test]
    fn client_builds_from_valid_settings() {
        assert!(OAuthClient::new(&settings()).is_ok());
    }

    #[test]
    fn invalid_token_url_is_a_config_error() {
        let mut bad = settings();
        bad.token_url = "not a url".to_string();

        match OAuthClient::new(&bad) {
            Err(OAuthError::Config(message)) => assert!(message.contains("token URL")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected config error"),
        }
    }
}
