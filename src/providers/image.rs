//! Image generation providers: OpenAI Images (URL download), Stability AI
//! (base64 payload) and Replicate (submit, then poll a prediction).

use super::{ensure_success, truncate_for_log, Provider, ProviderChain, ProviderError};
use crate::config::Config;
use crate::errors::AppError;
use crate::image_store::ImageStore;
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

/// Chain of image providers: the request goes in, a relative image URL comes out.
pub type ImageChain = ProviderChain<ImageRequest, String>;

pub const IMAGE_EXHAUSTED_TAG: &str = "placeholder";

const IMAGE_HTTP_TIMEOUT: Duration = Duration::from_secs(120);
const IMAGE_SIDE: u32 = 512;

/// What every image provider needs: the styled prompt and the names used for
/// the output filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub prompt: String,
    pub first_name: String,
    pub last_name: String,
}

async fn download(client: &Client, url: &str) -> Result<Vec<u8>, ProviderError> {
    let response = ensure_success(client.get(url).send().await?).await?;
    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        return Err(ProviderError::EmptyContent);
    }
    Ok(bytes.to_vec())
}

// ============ OpenAI Images ============

#[derive(Debug, Deserialize)]
struct OpenAiImageResponse {
    #[serde(default)]
    data: Vec<OpenAiImage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiImage {
    url: Option<String>,
}

/// Synchronous OpenAI image generation; the image is downloaded from the
/// returned URL.
pub struct DalleProvider {
    client: Client,
    endpoint: String,
    api_key: String,
    size: String,
    store: ImageStore,
}

impl DalleProvider {
    pub fn new(
        client: Client,
        base_url: &str,
        api_key: String,
        size: String,
        store: ImageStore,
    ) -> Self {
        Self {
            client,
            endpoint: format!("{}/v1/images/generations", base_url),
            api_key,
            size,
            store,
        }
    }
}

#[async_trait]
impl Provider<ImageRequest, String> for DalleProvider {
    fn tag(&self) -> &'static str {
        "dalle"
    }

    async fn attempt(&self, request: &ImageRequest) -> Result<String, ProviderError> {
        let body = json!({
            "prompt": request.prompt,
            "n": 1,
            "size": self.size,
        });

        let response = ensure_success(
            self.client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await?,
        )
        .await?;

        let generated: OpenAiImageResponse = response.json().await?;
        let url = generated
            .data
            .into_iter()
            .next()
            .and_then(|image| image.url)
            .ok_or_else(|| ProviderError::Decode("response has no data[0].url".to_string()))?;

        let bytes = download(&self.client, &url).await?;
        Ok(self
            .store
            .save(&request.first_name, &request.last_name, &bytes)
            .await?)
    }
}

// ============ Stability AI ============

#[derive(Debug, Deserialize)]
struct StabilityResponse {
    #[serde(default)]
    artifacts: Vec<StabilityArtifact>,
}

#[derive(Debug, Deserialize)]
struct StabilityArtifact {
    base64: Option<String>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

/// Synchronous Stability AI text-to-image; the image arrives base64-encoded.
pub struct StabilityProvider {
    client: Client,
    endpoint: String,
    api_key: String,
    store: ImageStore,
}

impl StabilityProvider {
    pub fn new(
        client: Client,
        base_url: &str,
        engine: &str,
        api_key: String,
        store: ImageStore,
    ) -> Self {
        Self {
            client,
            endpoint: format!("{}/v1/generation/{}/text-to-image", base_url, engine),
            api_key,
            store,
        }
    }
}

#[async_trait]
impl Provider<ImageRequest, String> for StabilityProvider {
    fn tag(&self) -> &'static str {
        "stability"
    }

    async fn attempt(&self, request: &ImageRequest) -> Result<String, ProviderError> {
        let body = json!({
            "text_prompts": [{ "text": request.prompt, "weight": 1.0 }],
            "cfg_scale": 7,
            "height": IMAGE_SIDE,
            "width": IMAGE_SIDE,
            "samples": 1,
            "steps": 30,
        });

        let response = ensure_success(
            self.client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .header("Accept", "application/json")
                .json(&body)
                .send()
                .await?,
        )
        .await?;

        let generated: StabilityResponse = response.json().await?;
        let artifact = generated
            .artifacts
            .into_iter()
            .next()
            .ok_or(ProviderError::EmptyContent)?;

        if artifact.finish_reason.as_deref() == Some("ERROR") {
            return Err(ProviderError::JobFailed(
                "artifact finished with ERROR".to_string(),
            ));
        }

        let encoded = artifact.base64.ok_or(ProviderError::EmptyContent)?;
        let bytes = general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| ProviderError::Decode(format!("invalid base64 image: {}", e)))?;
        if bytes.is_empty() {
            return Err(ProviderError::EmptyContent);
        }

        Ok(self
            .store
            .save(&request.first_name, &request.last_name, &bytes)
            .await?)
    }
}

// ============ Replicate ============

#[derive(Debug, Deserialize)]
struct Prediction {
    id: String,
    status: String,
    #[serde(default)]
    output: Value,
    #[serde(default)]
    error: Value,
}

impl Prediction {
    /// First image URL of a finished prediction; `output` is either a URL or a
    /// list of URLs depending on the model.
    fn output_url(&self) -> Option<&str> {
        match &self.output {
            Value::String(url) => Some(url.as_str()),
            Value::Array(items) => items.iter().find_map(Value::as_str),
            _ => None,
        }
    }
}

/// Asynchronous Replicate prediction: submit, then poll until it settles.
///
/// Polling is bounded by `max_polls`; running out of polls is a
/// [`ProviderError::Timeout`] and the prediction is cancelled.
pub struct ReplicateProvider {
    client: Client,
    base_url: String,
    api_token: String,
    model_version: String,
    poll_interval: Duration,
    max_polls: u32,
    store: ImageStore,
}

impl ReplicateProvider {
    pub fn new(
        client: Client,
        base_url: &str,
        api_token: String,
        model_version: String,
        poll_interval: Duration,
        max_polls: u32,
        store: ImageStore,
    ) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            api_token,
            model_version,
            poll_interval,
            max_polls,
            store,
        }
    }

    async fn submit(&self, prompt: &str) -> Result<Prediction, ProviderError> {
        let body = json!({
            "version": self.model_version,
            "input": {
                "prompt": prompt,
                "width": IMAGE_SIDE,
                "height": IMAGE_SIDE,
            },
        });

        let response = ensure_success(
            self.client
                .post(format!("{}/v1/predictions", self.base_url))
                .bearer_auth(&self.api_token)
                .json(&body)
                .send()
                .await?,
        )
        .await?;

        Ok(response.json().await?)
    }

    async fn fetch(&self, id: &str) -> Result<Prediction, ProviderError> {
        let response = ensure_success(
            self.client
                .get(format!("{}/v1/predictions/{}", self.base_url, id))
                .bearer_auth(&self.api_token)
                .send()
                .await?,
        )
        .await?;

        Ok(response.json().await?)
    }

    async fn cancel(&self, id: &str) {
        let result = self
            .client
            .post(format!("{}/v1/predictions/{}/cancel", self.base_url, id))
            .bearer_auth(&self.api_token)
            .send()
            .await;
        if let Err(e) = result {
            tracing::debug!("Replicate: cancel of prediction {} failed: {}", id, e);
        }
    }

    /// Polls until the prediction succeeds, fails or the poll budget is spent.
    async fn wait_for(&self, mut prediction: Prediction) -> Result<Prediction, ProviderError> {
        let mut polls = 0;
        loop {
            match prediction.status.as_str() {
                "succeeded" => return Ok(prediction),
                "failed" | "canceled" => {
                    let reason = match &prediction.error {
                        Value::Null => prediction.status.clone(),
                        Value::String(msg) => msg.clone(),
                        other => other.to_string(),
                    };
                    return Err(ProviderError::JobFailed(truncate_for_log(&reason, 500)));
                }
                _ => {}
            }

            if polls >= self.max_polls {
                self.cancel(&prediction.id).await;
                return Err(ProviderError::Timeout(format!(
                    "prediction {} still '{}' after {} polls",
                    prediction.id, prediction.status, polls
                )));
            }

            tokio::time::sleep(self.poll_interval).await;
            polls += 1;
            prediction = self.fetch(&prediction.id).await?;
            tracing::debug!(
                "Replicate: prediction {} is '{}' (poll {}/{})",
                prediction.id,
                prediction.status,
                polls,
                self.max_polls
            );
        }
    }
}

#[async_trait]
impl Provider<ImageRequest, String> for ReplicateProvider {
    fn tag(&self) -> &'static str {
        "replicate"
    }

    async fn attempt(&self, request: &ImageRequest) -> Result<String, ProviderError> {
        let submitted = self.submit(&request.prompt).await?;
        tracing::info!("Replicate: submitted prediction {}", submitted.id);

        let finished = self.wait_for(submitted).await?;
        let url = finished.output_url().ok_or_else(|| {
            ProviderError::Decode("succeeded prediction has no output URL".to_string())
        })?;

        let bytes = download(&self.client, url).await?;
        Ok(self
            .store
            .save(&request.first_name, &request.last_name, &bytes)
            .await?)
    }
}

/// Builds the image chain: DALL-E, then Stability AI, then Replicate. Providers
/// without a key are left out.
pub fn build_image_chain(config: &Config, store: ImageStore) -> Result<ImageChain, AppError> {
    let client = Client::builder()
        .timeout(IMAGE_HTTP_TIMEOUT)
        .build()
        .map_err(|e| {
            AppError::InternalError(format!("Failed to create image provider client: {}", e))
        })?;

    let mut chain = ImageChain::new("image", IMAGE_EXHAUSTED_TAG);

    if let Some(key) = &config.openai_api_key {
        chain.push(Box::new(DalleProvider::new(
            client.clone(),
            &config.openai_base_url,
            key.clone(),
            config.openai_image_size.clone(),
            store.clone(),
        )));
    }
    if let Some(key) = &config.stability_api_key {
        chain.push(Box::new(StabilityProvider::new(
            client.clone(),
            &config.stability_base_url,
            &config.stability_engine,
            key.clone(),
            store.clone(),
        )));
    }
    if let Some(token) = &config.replicate_api_token {
        chain.push(Box::new(ReplicateProvider::new(
            client.clone(),
            &config.replicate_base_url,
            token.clone(),
            config.replicate_model_version.clone(),
            Duration::from_millis(config.replicate_poll_interval_ms),
            config.replicate_max_polls,
            store,
        )));
    }

    tracing::info!("Image provider chain: {:?}", chain.tags());
    Ok(chain)
}
