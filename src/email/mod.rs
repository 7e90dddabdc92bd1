//! Email sending
//!
//! An [`EmailSender`] trait with two backends: the HTTP sending API the
//! service is configured against, and a console backend for development.
//! Callers that must not fail on email trouble go through
//! [`send_with_retry`], which tries twice and reports the final error.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::config::EmailSettings;

/// Email failure modes
#[derive(Debug, Error)]
pub enum EmailError {
    /// Provider answered with a non-success status
    #[error("Email provider rejected the message: {0}")]
    Provider(String),

    /// Provider unreachable
    #[error("Email provider unreachable: {0}")]
    Transport(String),
}

/// An outgoing email
#[derive(Debug, Clone, Serialize)]
pub struct Email {
    /// Recipient address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// Plain-text body
    pub text: String,
}

impl Email {
    /// Start an empty email
    #[must_use]
    pub fn new() -> Self {
        Self {
            to: String::new(),
            subject: String::new(),
            text: String::new(),
        }
    }

    /// Set the recipient
    #[must_use]
    pub fn to(mut self, to: impl Into<String>) -> Self {
        self.to = to.into();
        self
    }

    /// Set the subject
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Set the plain-text body
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
}

impl Default for Email {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait for sending emails
///
/// Implemented by all backends.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send an email
    ///
    /// # Errors
    ///
    /// Returns [`EmailError`] if the email cannot be sent.
    async fn send(&self, email: Email) -> Result<(), EmailError>;
}

/// Backend for an HTTP email-sending API
pub struct ApiBackend {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    from: String,
}

#[derive(Serialize)]
struct ApiPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

impl ApiBackend {
    /// Build from email settings
    #[must_use]
    pub fn new(settings: &EmailSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
            from: settings.from.clone(),
        }
    }
}

#[async_trait]
impl EmailSender for ApiBackend {
    async fn send(&self, email: Email) -> Result<(), EmailError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&ApiPayload {
                from: &self.from,
                to: &email.to,
                subject: &email.subject,
                text: &email.text,
            })
            .send()
            .await
            .map_err(|e| EmailError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmailError::Provider(format!("HTTP {status}: {body}")));
        }

        Ok(())
    }
}

/// Development backend that logs instead of sending
#[derive(Debug, Default, Clone)]
pub struct ConsoleBackend;

#[async_trait]
impl EmailSender for ConsoleBackend {
    async fn send(&self, email: Email) -> Result<(), EmailError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            body_len = email.text.len(),
            "email (console backend)"
        );
        Ok(())
    }
}

/// Pick a backend from settings: the API when a key is configured, the
/// console otherwise
#[must_use]
pub fn backend_from(settings: &EmailSettings) -> Box<dyn EmailSender> {
    if settings.api_key.is_empty() {
        tracing::warn!("no email API key configured, using console backend");
        Box::new(ConsoleBackend)
    } else {
        Box::new(ApiBackend::new(settings))
    }
}

/// Send with a single retry
///
/// The first failure is logged and retried once; the second failure is
/// returned to the caller (who typically logs and moves on).
///
/// # Errors
///
/// Returns the second attempt's [`EmailError`].
pub async fn send_with_retry(sender: &dyn EmailSender, email: Email) -> Result<(), EmailError> {
    match sender.send(email.clone()).await {
        Ok(()) => Ok(()),
        Err(first) => {
            tracing::warn!(error = %first, to = %email.to, "email send failed, retrying once");
            sender.send(email).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::always;

    #[tokio::test]
    async fn retry_succeeds_after_one_failure() {
        let mut sender = MockEmailSender::new();
        let mut attempts = 0;
        sender
            .expect_send()
            .with(always())
            .times(2)
            .returning(move |_| {
                attempts += 1;
                if attempts == 1 {
                    Err(EmailError::Transport("connection reset".to_string()))
                } else {
                    Ok(())
                }
            });

        let email = Email::new().to("user@example.com").subject("hi").text("hello");
        assert!(send_with_retry(&sender, email).await.is_ok());
    }

    #[tokio::test]
    async fn retry_gives_up_after_second_failure() {
        let mut sender = MockEmailSender::new();
        sender
            .expect_send()
            .times(2)
            .returning(|_| Err(EmailError::Provider("HTTP 500".to_string())));

        let email = Email::new().to("user@example.com");
        assert!(send_with_retry(&sender, email).await.is_err());
    }

    #[tokio::test]
    async fn console_backend_always_succeeds() {
        let email = Email::new().to("user@example.com").subject("s").text("t");
        assert!(ConsoleBackend.send(email).await.is_ok());
    }

    #[test]
    fn builder_fills_fields() {
        let email = Email::new().to("a@b.c").subject("s").text("body");
        assert_eq!(email.to, "a@b.c");
        assert_eq!(email.subject, "s");
        assert_eq!(email.text, "body");
    }
}
