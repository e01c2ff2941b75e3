//! Text generation through OpenAI-compatible chat completion APIs.

use super::{ensure_success, Provider, ProviderChain, ProviderError};
use crate::config::Config;
use crate::errors::AppError;
use crate::prompt::ReadingPrompt;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Chain of text providers: the prompt goes in, raw model text comes out.
pub type TextChain = ProviderChain<ReadingPrompt, String>;

pub const TEXT_EXHAUSTED_TAG: &str = "none";

const MAX_TOKENS: u32 = 1000;
const TEMPERATURE: f64 = 0.8;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// A chat completion endpoint (OpenAI or an aggregator speaking its protocol).
pub struct ChatCompletionProvider {
    tag: &'static str,
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    timeout: Option<Duration>,
    extra_headers: Vec<(&'static str, String)>,
}

impl ChatCompletionProvider {
    /// Primary provider: OpenAI chat completions, no per-request timeout.
    pub fn openai(client: Client, base_url: &str, api_key: String, model: String) -> Self {
        Self {
            tag: "openai",
            client,
            endpoint: format!("{}/v1/chat/completions", base_url),
            api_key,
            model,
            timeout: None,
            extra_headers: Vec::new(),
        }
    }

    /// Fallback provider: OpenRouter with its own model and a bounded timeout.
    pub fn openrouter(
        client: Client,
        base_url: &str,
        api_key: String,
        model: String,
        timeout: Duration,
    ) -> Self {
        Self {
            tag: "openrouter",
            client,
            endpoint: format!("{}/api/v1/chat/completions", base_url),
            api_key,
            model,
            timeout: Some(timeout),
            extra_headers: vec![("X-Title", "Tattoo Oracle".to_string())],
        }
    }
}

#[async_trait]
impl Provider<ReadingPrompt, String> for ChatCompletionProvider {
    fn tag(&self) -> &'static str {
        self.tag
    }

    async fn attempt(&self, prompt: &ReadingPrompt) -> Result<String, ProviderError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        tracing::info!(
            "Requesting tattoo reading from {} (model={})",
            self.tag,
            self.model
        );

        let mut request = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        for (name, value) in &self.extra_headers {
            request = request.header(*name, value.as_str());
        }

        let response = ensure_success(request.send().await?).await?;
        let completion: ChatCompletionResponse = response.json().await?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(ProviderError::EmptyContent)
    }
}

/// Builds the text chain from the configured keys: OpenAI first, then
/// OpenRouter. Providers without a key are left out.
pub fn build_text_chain(config: &Config) -> Result<TextChain, AppError> {
    let client = Client::builder().build().map_err(|e| {
        AppError::InternalError(format!("Failed to create text provider client: {}", e))
    })?;

    let mut chain = TextChain::new("text", TEXT_EXHAUSTED_TAG);

    if let Some(key) = &config.openai_api_key {
        chain.push(Box::new(ChatCompletionProvider::openai(
            client.clone(),
            &config.openai_base_url,
            key.clone(),
            config.openai_text_model.clone(),
        )));
    }
    if let Some(key) = &config.openrouter_api_key {
        chain.push(Box::new(ChatCompletionProvider::openrouter(
            client.clone(),
            &config.openrouter_base_url,
            key.clone(),
            config.openrouter_model.clone(),
            Duration::from_secs(config.openrouter_timeout_secs),
        )));
    }

    tracing::info!("Text provider chain: {:?}", chain.tags());
    Ok(chain)
}
