//! OAuth provider integration
//!
//! Turns an authorization code into provider tokens and resolves the bearer
//! profile behind them. One configured provider; endpoints come from
//! [`crate::config::OAuthSettings`].

pub mod client;
pub mod types;

pub use client::OAuthClient;
pub use types::{OAuthError, OAuthToken, ProviderProfile};
