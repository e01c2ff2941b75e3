use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use crate::image_store::ImageStore;
use crate::models::*;
use crate::prompt::{build_reading_prompt, image_generation_prompt};
use crate::providers::image::{build_image_chain, ImageChain, ImageRequest};
use crate::providers::text::{build_text_chain, TextChain};
use crate::validation::{validate_request, MISSING_INPUT_ERROR};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;

pub const TEXT_CHAIN_EXHAUSTED_ERROR: &str =
    "Failed to generate tattoo reading: all AI services unavailable";
pub const INVALID_AI_RESPONSE_ERROR: &str = "Invalid response format from AI";

/// Shared application state injected into handlers.
pub struct AppState {
    /// Text providers, tried in order for every reading.
    pub text_chain: TextChain,
    /// Image providers, tried in order after a reading succeeds.
    pub image_chain: ImageChain,
    /// Where generated images are written.
    pub image_store: ImageStore,
}

impl AppState {
    /// Builds both provider chains from the configured keys.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let image_store = ImageStore::new(config.images_dir.clone());
        let text_chain = build_text_chain(config).context("building text provider chain")?;
        let image_chain = build_image_chain(config, image_store.clone()).with_context(|| {
            format!(
                "building image provider chain for {}",
                config.images_dir.display()
            )
        })?;
        Ok(Self {
            text_chain,
            image_chain,
            image_store,
        })
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health, generate_tattoo),
    components(schemas(
        GenerateTattooRequest,
        TattooReading,
        TattooResponse,
        PersonalizationUsed,
        ErrorResponse
    )),
    tags((name = "tattoo", description = "AI tattoo oracle readings"))
)]
pub struct ApiDoc;

/// Routes that call the AI providers. Rate limiting is layered on by the binary.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/generate_tattoo", post(generate_tattoo))
}

/// Health check endpoint.
///
/// Returns the service status and version.
#[utoipa::path(
    get,
    path = "/health",
    tag = "tattoo",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "tattoo-oracle-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// GET /api-docs/openapi.json
pub async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// POST /api/generate_tattoo
///
/// Validates the seeker's details, asks the text providers for a reading, then
/// asks the image providers for an illustration of its `image_prompt`.
///
/// A missing image is not an error: `image_url` is `null` and the provenance
/// reports `image:placeholder`. Exhausting the text providers, or receiving a
/// reading that is not a JSON object, fails the whole request with a 500.
#[utoipa::path(
    post,
    path = "/api/generate_tattoo",
    tag = "tattoo",
    request_body = GenerateTattooRequest,
    responses(
        (status = 200, description = "Reading generated", body = TattooResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 500, description = "AI services failed", body = ErrorResponse)
    )
)]
pub async fn generate_tattoo(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerateTattooRequest>, JsonRejection>,
) -> Result<Json<TattooResponse>, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!("Unreadable request body: {}", rejection);
        AppError::BadRequest(MISSING_INPUT_ERROR.to_string())
    })?;

    let profile = validate_request(&request)?;
    tracing::info!(
        "POST /api/generate_tattoo - sign={}, life_path={}, personalization={:?}",
        profile.zodiac_sign,
        profile.life_path_number,
        profile.personalization.used()
    );

    // 1. Reading
    let prompt = build_reading_prompt(&profile);
    let text = state.text_chain.run(&prompt).await;
    let Some(raw_reading) = text.output else {
        return Err(AppError::UpstreamFailure(
            TEXT_CHAIN_EXHAUSTED_ERROR.to_string(),
        ));
    };

    let reading = TattooReading::from_model_output(&raw_reading).ok_or_else(|| {
        tracing::warn!(
            "Reading from '{}' is not a JSON object: {}",
            text.provider,
            crate::providers::truncate_for_log(&raw_reading, 300)
        );
        AppError::UpstreamFailure(INVALID_AI_RESPONSE_ERROR.to_string())
    })?;

    // 2. Image
    let image = state
        .image_chain
        .run(&ImageRequest {
            prompt: image_generation_prompt(&reading.image_prompt),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
        })
        .await;

    let ai_provider = format!("text:{},image:{}", text.provider, image.provider);
    tracing::info!("✅ Tattoo reading generated ({})", ai_provider);

    Ok(Json(TattooResponse {
        reading,
        image_url: image.output,
        ai_provider,
        personalization_used: profile.personalization.used(),
    }))
}
