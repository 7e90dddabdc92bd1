//! Image host integration
//!
//! Content images are stored at an external image-hosting API. Upload is a
//! single scoped operation: the multipart field is buffered in memory, sent,
//! and the result (or error) comes back with nothing left to clean up on any
//! exit path. The host hands back a delete URL which is kept so removal can
//! ask the host to discard the file.

use serde::Deserialize;
use thiserror::Error;

use crate::config::ImageHostSettings;

/// Image host failure modes
#[derive(Debug, Error)]
pub enum ImageHostError {
    /// Host answered with a non-success status or an unreadable body
    #[error("Image upload failed: {0}")]
    Upload(String),

    /// Host unreachable
    #[error("Image host unreachable: {0}")]
    Transport(String),
}

/// A successfully hosted image
#[derive(Debug, Clone)]
pub struct HostedImage {
    /// Public URL
    pub url: String,
    /// Token/URL the host accepts for deletion, when provided
    pub delete_token: Option<String>,
}

#[derive(Deserialize)]
struct UploadResponse {
    data: UploadData,
}

#[derive(Deserialize)]
struct UploadData {
    url: String,
    delete_url: Option<String>,
}

/// Client for the image-hosting API
pub struct ImageHostClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl ImageHostClient {
    /// Build from image host settings
    #[must_use]
    pub fn new(settings: &ImageHostSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
        }
    }

    /// Upload an image, returning its public URL and delete token
    ///
    /// # Errors
    ///
    /// [`ImageHostError::Transport`] when the host is unreachable,
    /// [`ImageHostError::Upload`] on non-success status or a malformed
    /// response body.
    pub async fn upload(
        &self,
        file_name: String,
        bytes: Vec<u8>,
    ) -> Result<HostedImage, ImageHostError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new()
            .text("key", self.api_key.clone())
            .part("image", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ImageHostError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ImageHostError::Upload(format!("HTTP {}", response.status())));
        }

        let parsed: UploadResponse = response
            .json()
            .await
            .map_err(|e| ImageHostError::Upload(format!("Failed to parse response: {e}")))?;

        Ok(HostedImage {
            url: parsed.data.url,
            delete_token: parsed.data.delete_url,
        })
    }

    /// Ask the host to discard a previously uploaded image
    ///
    /// Best-effort: callers log failures and move on, the local row is
    /// authoritative.
    ///
    /// # Errors
    ///
    /// [`ImageHostError::Transport`] when the host is unreachable,
    /// [`ImageHostError::Upload`] on non-success status.
    pub async fn delete(&self, delete_token: &str) -> Result<(), ImageHostError> {
        let response = self
            .client
            .get(delete_token)
            .send()
            .await
            .map_err(|e| ImageHostError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ImageHostError::Upload(format!("HTTP {}", response.status())));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_response_parses_with_and_without_delete_url() {
        let full: UploadResponse = serde_json::from_str(
            r#"{"data": {"url": "https://i.example/a.png", "delete_url": "https://i.example/d/1"}}"#,
        )
        .unwrap();
        assert_eq!(full.data.url, "https://i.example/a.png");
        assert_eq!(full.data.delete_url.as_deref(), Some("https://i.example/d/1"));

        let bare: UploadResponse =
            serde_json::from_str(r#"{"data": {"url": "https://i.example/b.png"}}"#).unwrap();
        assert!(bare.data.delete_url.is_none());
    }
}
