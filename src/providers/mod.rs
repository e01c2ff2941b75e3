//! Ordered fallback across interchangeable AI providers.
//!
//! A [`ProviderChain`] tries each [`Provider`] in order and returns the first
//! success together with the provider's tag. Failures are logged and swallowed;
//! there is no retry, backoff or health tracking. The same chain type serves
//! text generation (`text`) and image generation (`image`).

pub mod image;
pub mod text;

use async_trait::async_trait;
use std::fmt;

/// Why a single provider attempt produced nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Connection, TLS or request-building failure.
    Transport(String),
    /// The provider answered with a non-success status.
    Status { status: u16, body: String },
    /// The response body did not have the expected shape.
    Decode(String),
    /// The provider answered successfully but with nothing usable.
    EmptyContent,
    /// An asynchronous job reached a terminal failure state.
    JobFailed(String),
    /// A request or a polling loop ran out of time.
    Timeout(String),
    /// The result could not be written to disk.
    Storage(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Transport(msg) => write!(f, "request failed: {}", msg),
            ProviderError::Status { status, body } => {
                write!(f, "returned status {}: {}", status, body)
            }
            ProviderError::Decode(msg) => write!(f, "unexpected response: {}", msg),
            ProviderError::EmptyContent => write!(f, "returned empty content"),
            ProviderError::JobFailed(msg) => write!(f, "job failed: {}", msg),
            ProviderError::Timeout(msg) => write!(f, "timed out: {}", msg),
            ProviderError::Storage(msg) => write!(f, "could not store result: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(err.to_string())
        } else if err.is_decode() {
            ProviderError::Decode(err.to_string())
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}

impl From<std::io::Error> for ProviderError {
    fn from(err: std::io::Error) -> Self {
        ProviderError::Storage(err.to_string())
    }
}

/// Maps a non-success response to [`ProviderError::Status`], keeping the body
/// for the log line.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(ProviderError::Status {
        status,
        body: truncate_for_log(&body, 500),
    })
}

pub(crate) fn truncate_for_log(value: &str, limit: usize) -> String {
    if value.chars().count() <= limit {
        return value.to_string();
    }
    let truncated: String = value.chars().take(limit).collect();
    format!("{truncated}... (truncated)")
}

/// One external service able to turn a `Req` into an `Out`.
#[async_trait]
pub trait Provider<Req, Out>: Send + Sync
where
    Req: Sync,
    Out: Send,
{
    /// Short provenance label, e.g. `openai`.
    fn tag(&self) -> &'static str;

    /// Makes one attempt. No retries happen inside or around this call.
    async fn attempt(&self, request: &Req) -> Result<Out, ProviderError>;
}

/// Result of running a chain: the first output, or `None` with the chain's
/// exhausted tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainOutcome<Out> {
    pub output: Option<Out>,
    pub provider: &'static str,
}

pub struct ProviderChain<Req, Out> {
    name: &'static str,
    exhausted_tag: &'static str,
    providers: Vec<Box<dyn Provider<Req, Out>>>,
}

impl<Req, Out> ProviderChain<Req, Out>
where
    Req: Sync,
    Out: Send,
{
    /// Creates an empty chain. `name` is used in logs; `exhausted_tag` is the
    /// provenance reported when no provider succeeds.
    pub fn new(name: &'static str, exhausted_tag: &'static str) -> Self {
        Self {
            name,
            exhausted_tag,
            providers: Vec::new(),
        }
    }

    /// Appends a provider; providers run in insertion order.
    pub fn push(&mut self, provider: Box<dyn Provider<Req, Out>>) {
        self.providers.push(provider);
    }

    pub fn with_provider<P>(mut self, provider: P) -> Self
    where
        P: Provider<Req, Out> + 'static,
    {
        self.push(Box::new(provider));
        self
    }

    pub fn tags(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.tag()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn exhausted_tag(&self) -> &'static str {
        self.exhausted_tag
    }

    /// Tries every provider in order and stops at the first success.
    pub async fn run(&self, request: &Req) -> ChainOutcome<Out> {
        for provider in &self.providers {
            let start = std::time::Instant::now();
            match provider.attempt(request).await {
                Ok(output) => {
                    tracing::info!(
                        "✓ {} provider '{}' succeeded ({}ms)",
                        self.name,
                        provider.tag(),
                        start.elapsed().as_millis()
                    );
                    return ChainOutcome {
                        output: Some(output),
                        provider: provider.tag(),
                    };
                }
                Err(e) => {
                    tracing::warn!(
                        "⚠️  {} provider '{}' failed after {}ms: {}",
                        self.name,
                        provider.tag(),
                        start.elapsed().as_millis(),
                        e
                    );
                }
            }
        }

        tracing::warn!(
            "No {} provider produced a result (tried: {:?})",
            self.name,
            self.tags()
        );
        ChainOutcome {
            output: None,
            provider: self.exhausted_tag,
        }
    }
}
