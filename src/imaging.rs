use crate::config::Config;
use crate::params::{ImageOrientation, ImageQuality};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// The secondary tier truncates prompts to this many characters and only
/// supports the square resolution.
pub const FALLBACK_PROMPT_LIMIT: usize = 400;
const FALLBACK_SIZE: &str = "1024x1024";

/// Image synthesis service with two tiers. The primary tier accepts the full
/// resolution/quality/style matrix; the secondary tier is the degraded
/// fallback the synthesizer retries against when the primary rejects a
/// request.
#[async_trait]
pub trait ImageClient: Send + Sync + Debug {
    /// Requests one image from the primary tier. Returns its URL.
    async fn generate_primary(
        &self,
        prompt: &str,
        orientation: ImageOrientation,
        quality: ImageQuality,
        style: &str,
    ) -> Result<String>;

    /// Requests one image from the secondary tier. The prompt is truncated
    /// and the size fixed to square before sending.
    async fn generate_fallback(&self, prompt: &str) -> Result<String>;
}

pub fn create_image_client(config: &Config) -> Result<Box<dyn ImageClient>> {
    if config.services.api_key.trim().is_empty() {
        return Err(anyhow!(
            "No API credential configured. Set services.api_key in config.yml."
        ));
    }
    Ok(Box::new(OpenAiImageClient::new(
        &config.services.api_key,
        &config.services.image_model,
        &config.services.base_url,
    )))
}

#[derive(Debug)]
struct OpenAiImageClient {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiImageClient {
    fn new(api_key: &str, model: &str, base_url: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    async fn request_image(&self, body: &ImageRequest) -> Result<String> {
        let url = format!("{}/images/generations", self.base_url);

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let error_text = resp.text().await?;
            return Err(anyhow!("Image API error: {}", error_text));
        }

        let result: ImageResponse = resp.json().await?;
        result
            .data
            .first()
            .map(|d| d.url.clone())
            .ok_or_else(|| anyhow!("Image response carried no image URL"))
    }
}

/// Request body for both tiers. The secondary tier omits the model, quality
/// and style fields entirely rather than sending empty values.
#[derive(Serialize)]
struct ImageRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    prompt: String,
    n: u32,
    size: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    quality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    style: Option<String>,
}

impl ImageRequest {
    fn primary(
        model: &str,
        prompt: &str,
        orientation: ImageOrientation,
        quality: ImageQuality,
        style: &str,
    ) -> Self {
        Self {
            model: Some(model.to_string()),
            prompt: prompt.to_string(),
            n: 1,
            size: orientation.size().to_string(),
            quality: Some(quality.as_str().to_string()),
            style: Some(style.to_string()),
        }
    }

    fn fallback(prompt: &str) -> Self {
        Self {
            model: None,
            prompt: prompt.chars().take(FALLBACK_PROMPT_LIMIT).collect(),
            n: 1,
            size: FALLBACK_SIZE.to_string(),
            quality: None,
            style: None,
        }
    }
}

#[derive(Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageDatum>,
}

#[derive(Deserialize)]
struct ImageDatum {
    url: String,
}

#[async_trait]
impl ImageClient for OpenAiImageClient {
    async fn generate_primary(
        &self,
        prompt: &str,
        orientation: ImageOrientation,
        quality: ImageQuality,
        style: &str,
    ) -> Result<String> {
        let body = ImageRequest::primary(&self.model, prompt, orientation, quality, style);
        self.request_image(&body).await
    }

    async fn generate_fallback(&self, prompt: &str) -> Result<String> {
        let body = ImageRequest::fallback(prompt);
        self.request_image(&body).await
    }
}
