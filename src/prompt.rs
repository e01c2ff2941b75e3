//! Prompt text sent to the text and image providers.

use crate::models::TattooProfile;
use std::fmt::Write;

pub const SYSTEM_PROMPT: &str =
    "You are a mystical AI tattoo oracle designer. Always respond with valid JSON format.";

/// Appended to the model's image prompt before it reaches an image provider.
pub const IMAGE_STYLE_SUFFIX: &str =
    " - black and white tattoo design, detailed line art, mystical style";

/// System and user messages for one reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingPrompt {
    pub system: String,
    pub user: String,
}

/// Builds the instruction block for a validated profile.
///
/// Optional personalization fields only appear, with their guidance line, when
/// the caller supplied them.
pub fn build_reading_prompt(profile: &TattooProfile) -> ReadingPrompt {
    let mut user = String::with_capacity(3072);

    user.push_str(
        "You are a mystical AI tattoo oracle designer, inspired by tarot reading and symbolic divination.\n\
         Your task is to create a unique, meaningful tattoo design concept based on the following information:\n\n",
    );

    let _ = writeln!(user, "- First Name: {}", profile.first_name);
    let _ = writeln!(user, "- Last Name: {}", profile.last_name);
    let _ = writeln!(user, "- Date of Birth: {}", profile.date_of_birth);
    let _ = writeln!(user, "- Age: {}", profile.age);
    let _ = writeln!(user, "- Zodiac Sign: {}", profile.zodiac_sign);
    let _ = writeln!(user, "- Life Path Number: {}", profile.life_path_number);

    let details = personal_details(profile);
    if !details.is_empty() {
        user.push_str("\nPersonal details shared by the seeker:\n");
        for (label, value, _) in &details {
            let _ = writeln!(user, "- {}: {}", label, value);
        }
        user.push_str("\nHow to weave these details into the design:\n");
        for (_, _, guidance) in &details {
            let _ = writeln!(user, "- {}", guidance);
        }
    }

    user.push_str(
        r#"
Please provide your response in the following JSON format:
{
    "symbolic_analysis": "Interpret name numerology, zodiac sign, and any relevant symbolic meanings derived from DOB and age.",
    "core_tattoo_theme": "Describe the emotional, spiritual, or archetypal essence the tattoo should express.",
    "visual_motif_description": "Provide a vivid, imaginative description of the tattoo's visual elements (symbols, shapes, animals, patterns, etc.).",
    "placement_suggestion": "Recommend ideal body placement and size (e.g., upper forearm, chest, sleeve, ankle).",
    "mystical_insight": "End with a brief fortune-style message tied to the design meaning.",
    "image_prompt": "A detailed prompt for generating the tattoo image, describing the visual elements in a way suitable for AI image generation."
}

Style & Tone:
- Mysterious yet poetic
- Tarot card reader meets visionary tattoo artist
- Use rich metaphors and artistic vocabulary
- Avoid generic or overused symbols, focus on originality and meaningful storytelling
- Each reading should be completely unique and personalized

Make sure the response is valid JSON and each field contains meaningful, unique content based on the person's specific information.
"#,
    );

    ReadingPrompt {
        system: SYSTEM_PROMPT.to_string(),
        user,
    }
}

/// Full prompt handed to an image provider.
pub fn image_generation_prompt(image_prompt: &str) -> String {
    format!("{}{}", image_prompt, IMAGE_STYLE_SUFFIX)
}

fn personal_details(profile: &TattooProfile) -> Vec<(&'static str, &str, &'static str)> {
    let p = &profile.personalization;
    let candidates = [
        (
            "Birthplace",
            p.birthplace.as_deref(),
            "Let the landscape, flora or heritage of the birthplace echo through the motif.",
        ),
        (
            "Favorite Element",
            p.favorite_element.as_deref(),
            "Make the favorite element a visible force in the composition and its symbolism.",
        ),
        (
            "Preferred Aesthetic",
            p.preferred_aesthetic.as_deref(),
            "Render the design in the preferred aesthetic and describe the image prompt in that style.",
        ),
        (
            "Spirit Animal",
            p.spirit_animal.as_deref(),
            "Feature the spirit animal as a guardian figure, reimagined rather than literal.",
        ),
        (
            "Life Theme",
            p.life_theme.as_deref(),
            "Anchor the core tattoo theme in the stated life theme.",
        ),
        (
            "Personal Story",
            p.personal_story.as_deref(),
            "Translate the personal story into hidden symbols the wearer will recognize.",
        ),
        (
            "Cultural Affiliation",
            p.cultural_affiliation.as_deref(),
            "Honor the cultural affiliation respectfully, drawing on its authentic visual language.",
        ),
    ];

    candidates
        .into_iter()
        .filter_map(|(label, value, guidance)| value.map(|v| (label, v, guidance)))
        .collect()
}
