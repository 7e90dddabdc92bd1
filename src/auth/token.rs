//! Session token signing and verification

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SessionSettings;

/// Session token failure modes
#[derive(Debug, Error)]
pub enum TokenError {
    /// Token is past its `exp` claim
    #[error("Session token has expired")]
    Expired,

    /// Bad format, bad signature, or wrong issuer
    #[error("Invalid session token")]
    Invalid,

    /// Signing failed
    #[error("Failed to create session token")]
    Creation,
}

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Local user database id
    pub sub: i64,
    /// Token id
    pub jti: String,
    /// Issuer
    pub iss: String,
    /// Expiry (unix seconds)
    pub exp: usize,
    /// Issued at (unix seconds)
    pub iat: usize,
}

/// Issues and verifies session tokens against the configured secret
pub struct SessionTokens {
    secret: String,
    ttl_secs: i64,
    issuer: String,
}

impl SessionTokens {
    /// Build from session settings
    #[must_use]
    pub fn new(settings: &SessionSettings) -> Self {
        Self {
            secret: settings.secret.clone(),
            ttl_secs: settings.ttl_secs,
            issuer: settings.issuer.clone(),
        }
    }

    /// Sign a token for a user id
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Creation`] if encoding fails.
    pub fn issue(&self, user_id: i64) -> Result<String, TokenError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.ttl_secs);

        let claims = Claims {
            sub: user_id,
            jti: Uuid::new_v4().to_string(),
            iss: self.issuer.clone(),
            exp: usize::try_from(exp.timestamp()).map_err(|_| TokenError::Creation)?,
            iat: usize::try_from(now.timestamp()).map_err(|_| TokenError::Creation)?,
        };

        let header = Header::new(Algorithm::HS512);
        encode(&header, &claims, &EncodingKey::from_secret(self.secret.as_ref()))
            .map_err(|_| TokenError::Creation)
    }

    /// Verify a token and return its claims
    ///
    /// # Errors
    ///
    /// [`TokenError::Expired`] past the `exp` claim, [`TokenError::Invalid`]
    /// for everything else.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS512);
        validation.set_issuer(&[&self.issuer]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> SessionTokens {
        SessionTokens::new(&SessionSettings {
            secret: "test-secret".to_string(),
            ttl_secs: 3600,
            issuer: "storefront".to_string(),
        })
    }

    #[test]
    fn issued_token_round_trips() {
        let tokens = tokens();
        let token = tokens.issue(42).unwrap();
        let claims = tokens.verify(&token).unwrap();

        assert_eq!(claims.sub, 42);
        assert_eq!(claims.iss, "storefront");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn garbage_is_invalid() {
        assert!(matches!(
            tokens().verify("not-a-token"),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let token = tokens().issue(1).unwrap();

        let other = SessionTokens::new(&SessionSettings {
            secret: "different-secret".to_string(),
            ttl_secs: 3600,
            issuer: "storefront".to_string(),
        });

        assert!(matches!(other.verify(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let expired = SessionTokens::new(&SessionSettings {
            secret: "test-secret".to_string(),
            ttl_secs: -120,
            issuer: "storefront".to_string(),
        });

        let token = expired.issue(1).unwrap();
        assert!(matches!(
            tokens().verify(&token),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn wrong_issuer_is_invalid() {
        let other_issuer = SessionTokens::new(&SessionSettings {
            secret: "test-secret".to_string(),
            ttl_secs: 3600,
            issuer: "someone-else".to_string(),
        });

        let token = other_issuer.issue(1).unwrap();
        assert!(matches!(tokens().verify(&token), Err(TokenError::Invalid)));
    }
}
