use std::path::PathBuf;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai";
pub const DEFAULT_STABILITY_BASE_URL: &str = "https://api.stability.ai";
pub const DEFAULT_REPLICATE_BASE_URL: &str = "https://api.replicate.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Directory generated images are written to and served from.
    pub images_dir: PathBuf,

    // Text generation
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_text_model: String,
    pub openrouter_api_key: Option<String>,
    pub openrouter_base_url: String,
    pub openrouter_model: String,
    pub openrouter_timeout_secs: u64,

    // Image generation
    pub openai_image_size: String,
    pub stability_api_key: Option<String>,
    pub stability_base_url: String,
    pub stability_engine: String,
    pub replicate_api_token: Option<String>,
    pub replicate_base_url: String,
    pub replicate_model_version: String,
    pub replicate_poll_interval_ms: u64,
    pub replicate_max_polls: u32,
}

impl Default for Config {
    /// No provider keys, public endpoints and the stock models.
    fn default() -> Self {
        Self {
            port: 5000,
            images_dir: PathBuf::from("static/generated_images"),
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_text_model: "gpt-3.5-turbo".to_string(),
            openrouter_api_key: None,
            openrouter_base_url: DEFAULT_OPENROUTER_BASE_URL.to_string(),
            openrouter_model: "mistralai/mistral-7b-instruct".to_string(),
            openrouter_timeout_secs: 60,
            openai_image_size: "512x512".to_string(),
            stability_api_key: None,
            stability_base_url: DEFAULT_STABILITY_BASE_URL.to_string(),
            stability_engine: "stable-diffusion-v1-6".to_string(),
            replicate_api_token: None,
            replicate_base_url: DEFAULT_REPLICATE_BASE_URL.to_string(),
            replicate_model_version:
                "39ed52f2a78e934b3ba6e2a89f5b1c712de7dfea535525255b1aa35c5565e08b".to_string(),
            replicate_poll_interval_ms: 2000,
            replicate_max_polls: 60,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| defaults.port.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            images_dir: std::env::var("GENERATED_IMAGES_DIR")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.images_dir),
            openai_api_key: optional_secret("OPENAI_API_KEY"),
            openai_base_url: base_url("OPENAI_BASE_URL", defaults.openai_base_url)?,
            openai_text_model: non_empty_or("OPENAI_TEXT_MODEL", defaults.openai_text_model),
            openrouter_api_key: optional_secret("OPENROUTER_API_KEY"),
            openrouter_base_url: base_url("OPENROUTER_BASE_URL", defaults.openrouter_base_url)?,
            openrouter_model: non_empty_or("OPENROUTER_MODEL", defaults.openrouter_model),
            openrouter_timeout_secs: positive_number(
                "OPENROUTER_TIMEOUT_SECS",
                defaults.openrouter_timeout_secs,
            )?,
            openai_image_size: non_empty_or("OPENAI_IMAGE_SIZE", defaults.openai_image_size),
            stability_api_key: optional_secret("STABILITY_API_KEY"),
            stability_base_url: base_url("STABILITY_BASE_URL", defaults.stability_base_url)?,
            stability_engine: non_empty_or("STABILITY_ENGINE", defaults.stability_engine),
            replicate_api_token: optional_secret("REPLICATE_API_TOKEN"),
            replicate_base_url: base_url("REPLICATE_BASE_URL", defaults.replicate_base_url)?,
            replicate_model_version: non_empty_or(
                "REPLICATE_MODEL_VERSION",
                defaults.replicate_model_version,
            ),
            replicate_poll_interval_ms: positive_number(
                "REPLICATE_POLL_INTERVAL_MS",
                defaults.replicate_poll_interval_ms,
            )?,
            replicate_max_polls: positive_number(
                "REPLICATE_MAX_POLLS",
                defaults.replicate_max_polls,
            )?,
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Server Port: {}", config.port);
        tracing::debug!("Generated images dir: {}", config.images_dir.display());
        tracing::debug!(
            "Text providers: openai={}, openrouter={}",
            config.openai_api_key.is_some(),
            config.openrouter_api_key.is_some()
        );
        tracing::debug!(
            "Image providers: dalle={}, stability={}, replicate={}",
            config.openai_api_key.is_some(),
            config.stability_api_key.is_some(),
            config.replicate_api_token.is_some()
        );
        if config.openai_api_key.is_none() && config.openrouter_api_key.is_none() {
            tracing::warn!("No text provider key configured; every reading request will fail");
        }

        Ok(config)
    }
}

/// Reads an API key; unset or blank disables the provider.
fn optional_secret(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn non_empty_or(name: &str, default: String) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default)
}

fn base_url(name: &str, default: String) -> anyhow::Result<String> {
    let raw = non_empty_or(name, default);
    validate_base_url(&raw).map_err(|e| anyhow::anyhow!("{} {}", name, e))
}

/// Checks that `raw` is an absolute http(s) URL and strips any trailing slash.
pub fn validate_base_url(raw: &str) -> anyhow::Result<String> {
    let parsed =
        url::Url::parse(raw.trim()).map_err(|e| anyhow::anyhow!("is not a valid URL: {}", e))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        anyhow::bail!("must start with http:// or https://");
    }
    Ok(raw.trim().trim_end_matches('/').to_string())
}

fn positive_number<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr + PartialOrd + Default + Copy,
{
    let Ok(raw) = std::env::var(name) else {
        return Ok(default);
    };
    let value: T = raw
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("{} must be a positive number", name))?;
    if value <= T::default() {
        anyhow::bail!("{} must be a positive number", name);
    }
    Ok(value)
}
