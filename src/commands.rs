use crate::config::{Config, ImageBackend, Settings};
use crate::credentials::{CredentialProvider, StoredKeyCredentials};
use crate::error::{self, GenerationError};
use crate::gemini::{GeminiClient, ImageOutput};
use crate::history::{GenerationResult, HistoryStore};
use crate::huggingface::HuggingFaceClient;
use crate::prompts::{self, GenerationRequest, POPULAR_THEMES};
use std::sync::{Arc, Mutex};
use tauri::{AppHandle, State};
use tracing::info;

/// Shared history store for use in async commands
pub type SharedHistory = Arc<Mutex<HistoryStore>>;

const THEME_REQUIRED_MESSAGE: &str =
    "Por favor, escolha ou digite um tema para o mêsversário.";
const EDIT_REQUIRED_MESSAGE: &str = "Digite o ajuste desejado.";
const KEY_REQUIRED_MESSAGE: &str =
    "Selecione uma chave de API do Google AI Studio para continuar.";

/// Rotating status copy shown by the frontend while a request is pending.
const LOADING_MESSAGES: &[&str] = &[
    "Preparando as luzes mágicas...",
    "Capturando os melhores ângulos...",
    "Eternizando esse sorrisinho...",
    "Quase pronto para o show!",
    "Dando o brilho final no vídeo...",
];

fn gemini_client(config: &Config) -> Result<GeminiClient, GenerationError> {
    GeminiClient::with_models(&config.gemini_api_key, &config.image_model, &config.video_model)
}

async fn run_image_generation(
    config: &Config,
    request: &GenerationRequest,
    reference_photo: Option<&str>,
) -> Result<ImageOutput, GenerationError> {
    let prompt = prompts::build_image_prompt(request, reference_photo.is_some());

    match config.image_backend {
        ImageBackend::Gemini => {
            gemini_client(config)?
                .generate_image(&prompt, reference_photo)
                .await
        }
        // The diffusion endpoint takes a bare prompt; the reference photo
        // is ignored on this backend.
        ImageBackend::HuggingFace => {
            HuggingFaceClient::new(&config.huggingface_token)?
                .generate_image(&prompt)
                .await
        }
    }
}

/// Generate a milestone photo from the form fields and optional reference
/// photo, recording the result in the history on success.
#[tauri::command]
pub async fn generate_image(
    app: AppHandle,
    history: State<'_, SharedHistory>,
    request: GenerationRequest,
    reference_photo: Option<String>,
) -> Result<GenerationResult, String> {
    if request.theme.trim().is_empty() {
        return Err(THEME_REQUIRED_MESSAGE.to_string());
    }

    info!(
        theme = %request.theme,
        age = request.age_in_months,
        has_reference = reference_photo.is_some(),
        "Generating milestone photo"
    );

    let credentials = StoredKeyCredentials::new(app);
    let config = Config::load_or_default();

    let output = run_image_generation(&config, &request, reference_photo.as_deref())
        .await
        .map_err(|e| error::surface(&e, &credentials))?;

    let mut history = history.lock().map_err(|e| e.to_string())?;
    history.record(&output.media_url, &output.prompt_used)
}

/// Apply a natural-language adjustment to a generated photo.
#[tauri::command]
pub async fn edit_image(
    app: AppHandle,
    media_url: String,
    instruction: String,
) -> Result<String, String> {
    if instruction.trim().is_empty() {
        return Err(EDIT_REQUIRED_MESSAGE.to_string());
    }

    info!(prompt_chars = instruction.len(), "Editing milestone photo");

    let credentials = StoredKeyCredentials::new(app);
    let config = Config::load_or_default();
    let edit_prompt = prompts::build_edit_prompt(&instruction);

    let run = async {
        gemini_client(&config)?
            .edit_image(&media_url, &edit_prompt)
            .await
    };

    run.await.map_err(|e| error::surface(&e, &credentials))
}

/// Animate a generated photo into a short video. High-cost operation: the
/// key is checked up front so the user is not sent into a long wait that
/// can only fail.
#[tauri::command]
pub async fn animate_image(app: AppHandle, media_url: String) -> Result<String, String> {
    let credentials = StoredKeyCredentials::new(app);
    if !credentials.has_selected() {
        credentials.prompt_selection();
        return Err(KEY_REQUIRED_MESSAGE.to_string());
    }

    info!("Animating milestone photo");
    let config = Config::load_or_default();

    let run = async {
        gemini_client(&config)?
            .generate_video(
                &media_url,
                prompts::VIDEO_ANIMATION_PROMPT,
                &config.video_aspect_ratio,
            )
            .await
    };

    run.await.map_err(|e| error::surface(&e, &credentials))
}

/// Newest-first generation history.
#[tauri::command]
pub fn get_history(history: State<'_, SharedHistory>) -> Result<Vec<GenerationResult>, String> {
    let history = history.lock().map_err(|e| e.to_string())?;
    Ok(history.entries().to_vec())
}

#[tauri::command]
pub fn toggle_favorite(history: State<'_, SharedHistory>, id: String) -> Result<bool, String> {
    let mut history = history.lock().map_err(|e| e.to_string())?;
    history.toggle_favorite(&id)
}

#[tauri::command]
pub fn clear_history(history: State<'_, SharedHistory>) -> Result<(), String> {
    let mut history = history.lock().map_err(|e| e.to_string())?;
    history.clear()
}

/// Get current settings
#[tauri::command]
pub fn get_settings() -> Result<Settings, String> {
    let config = Config::load_or_default();
    Ok(config.to_settings())
}

/// Update settings
#[tauri::command]
pub fn set_settings(settings: Settings) -> Result<Settings, String> {
    let mut config = Config::load_or_default();
    config.update_from_settings(&settings);
    config.save().map_err(|e| e.to_string())?;
    Ok(config.to_settings())
}

/// Static form vocabulary for the frontend.
#[tauri::command]
pub fn loading_messages() -> Vec<&'static str> {
    LOADING_MESSAGES.to_vec()
}

#[tauri::command]
pub fn popular_themes() -> Vec<&'static str> {
    POPULAR_THEMES.to_vec()
}
