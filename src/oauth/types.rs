//! OAuth types and errors

use oauth2::basic::{
    BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
    BasicTokenType,
};
use oauth2::{
    Client, EndpointNotSet, EndpointSet, ExtraTokenFields, StandardRevocableToken,
    StandardTokenResponse,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OAuth failure taxonomy
///
/// `TokenExchange` means the provider rejected the exchange (bad or expired
/// code) and maps to a 400; `Transport` and `ProfileFetch` are dependency
/// failures and map to a 500.
#[derive(Debug, Error)]
pub enum OAuthError {
    /// Provider rejected the code exchange, or the response carried no
    /// usable access token
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    /// The token endpoint could not be reached (DNS, timeout, reset)
    #[error("Token endpoint unreachable: {0}")]
    Transport(String),

    /// Profile endpoint returned non-success or an unreadable body
    #[error("Failed to fetch profile")]
    ProfileFetch(String),

    /// Invalid provider configuration
    #[error("OAuth configuration error: {0}")]
    Config(String),
}

/// Extra token-response fields the basic client would discard
///
/// The provider returns an OpenID Connect `id_token` alongside the OAuth
/// tokens; it is optional and passed through verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdTokenFields {
    /// Raw ID token, when the provider issued one
    pub id_token: Option<String>,
}

impl ExtraTokenFields for IdTokenFields {}

/// Token response type including the `id_token` field
pub type ProviderTokenResponse = StandardTokenResponse<IdTokenFields, BasicTokenType>;

/// OAuth2 client configured with auth and token endpoints
pub type ProviderClient = Client<
    BasicErrorResponse,
    ProviderTokenResponse,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

/// Tokens returned by a successful code exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthToken {
    /// Access token (always present, never empty)
    pub access_token: String,
    /// Refresh token, when the provider issued one
    pub refresh_token: Option<String>,
    /// OpenID Connect ID token, when the provider issued one
    pub id_token: Option<String>,
}

/// Profile payload from the provider, as returned
///
/// No local validation of shape beyond deserialization; absent fields stay
/// `None` and are defaulted at account-creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderProfile {
    /// Stable external user identifier
    pub user_id: String,
    /// Display name
    pub display_name: Option<String>,
    /// Avatar URL
    pub picture_url: Option<String>,
    /// Status message
    pub status_message: Option<String>,
    /// Email, when the provider shares it
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_deserializes_from_provider_payload() {
        let payload = r#"{
            "userId": "U4af4980629",
            "displayName": "Brown",
            "pictureUrl": "https://profile.example/abc",
            "statusMessage": "Hello"
        }"#;

        let profile: ProviderProfile = serde_json::from_str(payload).unwrap();
        assert_eq!(profile.user_id, "U4af4980629");
        assert_eq!(profile.display_name.as_deref(), Some("Brown"));
        assert!(profile.email.is_none());
    }

    #[test]
    fn profile_tolerates_minimal_payload() {
        let profile: ProviderProfile = serde_json::from_str(r#"{"userId": "U1"}"#).unwrap();
        assert_eq!(profile.user_id, "U1");
        assert!(profile.display_name.is_none());
        assert!(profile.picture_url.is_none());
        assert!(profile.status_message.is_none());
    }

    #[test]
    fn id_token_fields_round_trip() {
        let fields: IdTokenFields = serde_json::from_str(r#"{"id_token": "eyJ..."}"#).unwrap();
        assert_eq!(fields.id_token.as_deref(), Some("eyJ..."));

        let absent: IdTokenFields = serde_json::from_str("{}").unwrap();
        assert!(absent.id_token.is_none());
    }
}
