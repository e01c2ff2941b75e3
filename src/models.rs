use crate::astrology::ZodiacSign;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

// ============ Request Models ============

/// Body of `POST /api/generate_tattoo`.
///
/// Fields are kept as raw JSON values so validation can tell "missing" from
/// "wrong type" and answer with the matching fixed message.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct GenerateTattooRequest {
    #[schema(value_type = String, example = "John")]
    pub first_name: Option<Value>,
    #[schema(value_type = String, example = "Doe")]
    pub last_name: Option<Value>,
    /// Date of birth as `dd/mm/yyyy`.
    #[schema(value_type = String, example = "01/01/1990")]
    pub date_of_birth: Option<Value>,
    #[schema(value_type = i64, example = 35)]
    pub age: Option<Value>,

    #[schema(value_type = Option<String>)]
    pub birthplace: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub favorite_element: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub preferred_aesthetic: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub spirit_animal: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub life_theme: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub personal_story: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub cultural_affiliation: Option<Value>,
}

// ============ Domain Models ============

/// Optional personalization details. A field is `Some` only when the caller
/// sent a non-blank string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Personalization {
    pub birthplace: Option<String>,
    pub favorite_element: Option<String>,
    pub preferred_aesthetic: Option<String>,
    pub spirit_animal: Option<String>,
    pub life_theme: Option<String>,
    pub personal_story: Option<String>,
    pub cultural_affiliation: Option<String>,
}

impl Personalization {
    /// Keeps the optional fields that hold non-blank strings.
    pub fn from_request(request: &GenerateTattooRequest) -> Self {
        Self {
            birthplace: supplied_text(&request.birthplace),
            favorite_element: supplied_text(&request.favorite_element),
            preferred_aesthetic: supplied_text(&request.preferred_aesthetic),
            spirit_animal: supplied_text(&request.spirit_animal),
            life_theme: supplied_text(&request.life_theme),
            personal_story: supplied_text(&request.personal_story),
            cultural_affiliation: supplied_text(&request.cultural_affiliation),
        }
    }

    pub fn used(&self) -> PersonalizationUsed {
        PersonalizationUsed {
            birthplace: self.birthplace.is_some(),
            favorite_element: self.favorite_element.is_some(),
            preferred_aesthetic: self.preferred_aesthetic.is_some(),
            spirit_animal: self.spirit_animal.is_some(),
            life_theme: self.life_theme.is_some(),
            personal_story: self.personal_story.is_some(),
            cultural_affiliation: self.cultural_affiliation.is_some(),
        }
    }
}

fn supplied_text(value: &Option<Value>) -> Option<String> {
    value
        .as_ref()
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// A validated request plus the facts derived from it.
#[derive(Debug, Clone)]
pub struct TattooProfile {
    pub first_name: String,
    pub last_name: String,
    /// Date of birth exactly as the caller sent it.
    pub date_of_birth: String,
    pub age: i64,
    pub zodiac_sign: ZodiacSign,
    pub life_path_number: u32,
    pub personalization: Personalization,
}

/// The six fields the text model is asked to produce.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct TattooReading {
    pub symbolic_analysis: String,
    pub core_tattoo_theme: String,
    pub visual_motif_description: String,
    pub placement_suggestion: String,
    pub mystical_insight: String,
    pub image_prompt: String,
}

impl TattooReading {
    /// Parses raw model output. Only a JSON object is accepted; absent or
    /// `null` fields become `""` and other non-string values are stringified.
    pub fn from_model_output(text: &str) -> Option<Self> {
        let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(text) else {
            return None;
        };
        let field = |key: &str| match fields.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };
        Some(Self {
            symbolic_analysis: field("symbolic_analysis"),
            core_tattoo_theme: field("core_tattoo_theme"),
            visual_motif_description: field("visual_motif_description"),
            placement_suggestion: field("placement_suggestion"),
            mystical_insight: field("mystical_insight"),
            image_prompt: field("image_prompt"),
        })
    }
}

// ============ Response Models ============

/// Which optional personalization fields the caller supplied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PersonalizationUsed {
    pub birthplace: bool,
    pub favorite_element: bool,
    pub preferred_aesthetic: bool,
    pub spirit_animal: bool,
    pub life_theme: bool,
    pub personal_story: bool,
    pub cultural_affiliation: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TattooResponse {
    #[serde(flatten)]
    pub reading: TattooReading,
    /// Relative URL of the saved image, `null` when no provider produced one.
    pub image_url: Option<String>,
    /// Provenance, e.g. `text:openai,image:dalle`.
    pub ai_provider: String,
    pub personalization_used: PersonalizationUsed,
}

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
