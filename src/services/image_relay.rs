use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use tracing::info;

use crate::config::Config;
use crate::error::ApiError;
use crate::models::promotion::ImageUpload;
use crate::services::metrics::RELAY_UPLOADS_COUNTER;

/// Client for the external image host. Takes image bytes, returns a public
/// URL. One attempt per upload, no retry: a relay failure aborts the whole
/// record write.
pub struct ImageRelay {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct RelayResponse {
    data: RelayData,
}

#[derive(Debug, Deserialize)]
struct RelayData {
    url: String,
}

impl ImageRelay {
    /// `None` when the relay is not configured — uploads are then rejected
    /// at validation time instead of silently dropped.
    pub fn from_config(config: &Config) -> Option<Self> {
        let endpoint = config.image_relay_url.clone()?;
        let api_key = config.image_relay_key.clone()?;
        info!("Image relay configured: {endpoint}");
        Some(Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
        })
    }

    /// Upload one image and return its public URL.
    ///
    /// The bytes must decode as an image (jpeg/png/webp/gif); anything else
    /// is a validation error, not an upstream one.
    pub async fn upload(&self, upload: &ImageUpload) -> Result<String, ApiError> {
        image::load_from_memory(&upload.bytes).map_err(|_| {
            ApiError::Validation(format!(
                "{} is not a supported image",
                upload.filename
            ))
        })?;

        let encoded = BASE64.encode(&upload.bytes);
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .form(&[("image", encoded.as_str()), ("name", upload.filename.as_str())])
            .send()
            .await
            .map_err(|e| {
                RELAY_UPLOADS_COUNTER.with_label_values(&["error"]).inc();
                ApiError::Upstream(e.to_string())
            })?;

        if !response.status().is_success() {
            RELAY_UPLOADS_COUNTER.with_label_values(&["error"]).inc();
            return Err(ApiError::Upstream(format!(
                "image host returned {}",
                response.status()
            )));
        }

        let body: RelayResponse = response.json().await.map_err(|e| {
            RELAY_UPLOADS_COUNTER.with_label_values(&["error"]).inc();
            ApiError::Upstream(format!("unexpected image host response: {e}"))
        })?;

        RELAY_UPLOADS_COUNTER.with_label_values(&["ok"]).inc();
        Ok(body.data.url)
    }
}

/// Relay every uploaded image in order, preserving the submitted sequence.
/// With uploads present but no relay configured, the write is rejected.
pub async fn relay_images(
    relay: Option<&ImageRelay>,
    images: &[ImageUpload],
) -> Result<Vec<String>, ApiError> {
    if images.is_empty() {
        return Ok(Vec::new());
    }
    let relay = relay.ok_or_else(|| {
        ApiError::Validation("image uploads are not enabled on this server".into())
    })?;

    let mut urls = Vec::with_capacity(images.len());
    for upload in images {
        urls.push(relay.upload(upload).await?);
    }
    Ok(urls)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_images_needs_no_relay() {
        let urls = relay_images(None, &[]).await.unwrap();
        assert!(urls.is_empty());
    }

    #[tokio::test]
    async fn images_without_a_configured_relay_are_rejected() {
        let upload = ImageUpload {
            bytes: bytes::Bytes::from_static(&[0xff, 0xd8, 0xff]),
            filename: "photo.jpg".into(),
            content_type: "image/jpeg".into(),
        };
        let err = relay_images(None, &[upload]).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
