//! Prompt construction for milestone photo and video generation.
//!
//! Pure string assembly: the structured form fields from the frontend are
//! turned into a single natural-language instruction for the image model.
//! When a reference photo is attached the wording asks the model to place
//! "the infant from the reference image" into the themed set and to keep
//! the facial features consistent. Phrases implying identity alteration
//! (face swap, replace the face, ...) trip provider safety filters, so the
//! prompt never uses them.

use serde::{Deserialize, Serialize};

/// Fixed instruction used when animating a generated photo into a short video.
pub const VIDEO_ANIMATION_PROMPT: &str =
    "Subtle cinematic animation of this scene. Focus on lighting and small environment movements.";

/// Themes offered as quick picks in the form. Free text is also accepted.
pub const POPULAR_THEMES: &[&str] = &[
    "Safari Baby",
    "Ursinho Pooh",
    "Stitch",
    "Princesa Disney",
    "Pequeno Príncipe",
    "Dinossauro Baby",
    "Balões e Nuvens",
    "Astronauta",
    "Mickey/Minnie",
    "Jardim Encantado",
    "Fundo do Mar",
    "Super Heróis Baby",
];

/// Gender category used only when no reference photo is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Neutral,
}

impl Gender {
    /// Display label as shown in the form (Portuguese product copy).
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Masculino",
            Gender::Female => "Feminino",
            Gender::Neutral => "Neutro",
        }
    }
}

/// Photography style presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PhotoStyle {
    Studio,
    Minimalist,
    #[default]
    Cozy,
    Luxury,
}

impl PhotoStyle {
    pub fn label(&self) -> &'static str {
        match self {
            PhotoStyle::Studio => "Estúdio Fotográfico",
            PhotoStyle::Minimalist => "Minimalista",
            PhotoStyle::Cozy => "Aconchegante",
            PhotoStyle::Luxury => "Luxo Delicado",
        }
    }

    /// Lighting/set fragment appended to the prompt for this style.
    fn prompt_fragment(&self) -> &'static str {
        match self {
            PhotoStyle::Studio => "Professional studio lighting, soft bokeh, clean backdrop. ",
            PhotoStyle::Minimalist => {
                "Clean minimalist aesthetic, neutral tones, focused on the child. "
            }
            PhotoStyle::Cozy => "Soft textures, cozy home-like atmosphere, warm window lighting. ",
            PhotoStyle::Luxury => {
                "Sophisticated setup, elegant fabrics, delicate gold or silver accents. "
            }
        }
    }
}

/// Form fields for one generation submission. Transient, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    #[serde(default)]
    pub baby_name: String,
    pub age_in_months: u8,
    pub theme: String,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub color_palette: String,
    #[serde(default)]
    pub style: PhotoStyle,
}

/// Build the image-model prompt for a milestone photo.
pub fn build_image_prompt(request: &GenerationRequest, has_reference_photo: bool) -> String {
    let mut prompt = String::new();

    if has_reference_photo {
        prompt.push_str("Professional baby milestone photography. ");
        prompt.push_str("The infant from the reference image is the subject. ");
        prompt.push_str(&format!(
            "Integrate this infant into a beautifully designed {} themed set. ",
            request.theme
        ));
        prompt.push_str(
            "Maintain consistent features and expression as seen in the original photo. ",
        );
        prompt.push_str(&format!(
            "The surrounding environment, lighting, and props should reflect the {} theme. ",
            request.theme
        ));
    } else {
        prompt.push_str(&format!(
            "A professional, high-quality baby milestone photo (mêsversário) for a {} baby. ",
            request.gender.label().to_lowercase()
        ));
        prompt.push_str(&format!(
            "The baby should be the central focus, surrounded by beautiful {} themed decorations. ",
            request.theme
        ));
    }

    if !request.baby_name.trim().is_empty() {
        prompt.push_str(&format!(
            "The name \"{}\" should be subtly integrated into the decor on a small prop. ",
            request.baby_name.trim()
        ));
    }

    prompt.push_str(&format!(
        "Display the number \"{}\" using themed props like balloons or blocks. ",
        request.age_in_months
    ));
    prompt.push_str(&format!("Style: {}. ", request.style.label()));

    if !request.color_palette.trim().is_empty() {
        prompt.push_str(&format!("Dominant palette: {}. ", request.color_palette));
    }

    prompt.push_str(request.style.prompt_fragment());
    prompt.push_str("The final result should be a heartwarming and realistic professional photograph.");

    prompt
}

/// Wrap a user edit instruction for the image-edit call.
pub fn build_edit_prompt(instruction: &str) -> String {
    format!(
        "Professional edit: {}. Maintain subject consistency with the reference image.",
        instruction.trim()
    )
}
