//! Generation error taxonomy and user-facing normalization.
//!
//! The client maps provider responses into structured `GenerationError`
//! variants wherever the signal is recognizable (HTTP 429, key-not-found
//! bodies, refusal text). Errors that arrive as opaque strings fall back to
//! the substring heuristics the product has always used. The normalizer
//! turns either form into the Portuguese message shown in the UI and says
//! whether credential re-selection must be triggered.

use thiserror::Error;
use tracing::error;

use crate::credentials::CredentialProvider;

/// Refusal explanations from the model tend to be long prose; anything this
/// long that matched nothing else is treated as a content refusal. Coarse
/// placeholder heuristic, not a provider contract.
const REFUSAL_TEXT_THRESHOLD: usize = 50;

pub const RATE_LIMIT_MESSAGE: &str = "Limite de uso da API atingido. Aguarde cerca de 1 minuto \
     ou verifique o saldo da sua chave no Google AI Studio.";
pub const INVALID_KEY_MESSAGE: &str =
    "Chave de API expirada ou inválida. Vamos selecionar novamente.";
pub const REFUSAL_MESSAGE: &str = "A IA recusou gerar esta imagem por políticas de segurança. \
     Tente um tema mais simples ou remova a foto de referência.";
pub const UNKNOWN_MESSAGE: &str = "Ocorreu um erro inesperado.";

/// Errors raised by the generation workflow. No operation retries
/// internally; every failure propagates here for normalization.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// HTTP 429 or a quota-exhausted body from the provider.
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// The provider no longer recognizes the API key.
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    /// The model answered with explanatory text instead of media. The
    /// message is exactly the provider's refusal text.
    #[error("{0}")]
    ContentRefused(String),

    /// The provider returned no candidates or no usable media part.
    #[error("A IA não retornou resultados.")]
    NoResult,

    /// The async video job finished without a fetchable video URI.
    #[error("Falha ao gerar o vídeo.")]
    VideoFailed,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Any other provider response, carried as raw text for the
    /// substring-based fallback classification.
    #[error("{0}")]
    Provider(String),
}

/// User-facing classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    RateLimited,
    InvalidCredential,
    ContentRefused,
    Unknown,
}

/// Legacy substring classification for errors that arrive as opaque text.
pub fn classify_text(raw: &str) -> ErrorKind {
    if raw.contains("429") || raw.contains("quota") || raw.contains("RESOURCE_EXHAUSTED") {
        ErrorKind::RateLimited
    } else if raw.contains("Requested entity was not found") {
        ErrorKind::InvalidCredential
    } else if raw.len() > REFUSAL_TEXT_THRESHOLD {
        ErrorKind::ContentRefused
    } else {
        ErrorKind::Unknown
    }
}

/// Classify a generation error, preferring the structured variant over the
/// text heuristics.
pub fn classify(err: &GenerationError) -> ErrorKind {
    match err {
        GenerationError::RateLimited(_) => ErrorKind::RateLimited,
        GenerationError::InvalidCredential(_) => ErrorKind::InvalidCredential,
        GenerationError::ContentRefused(_) => ErrorKind::ContentRefused,
        GenerationError::NoResult | GenerationError::VideoFailed => ErrorKind::Unknown,
        // Transport errors are known not to be refusals, however long their
        // text; only the rate-limit/key substrings are meaningful there.
        GenerationError::Network(e) => match classify_text(&e.to_string()) {
            ErrorKind::ContentRefused => ErrorKind::Unknown,
            kind => kind,
        },
        GenerationError::Provider(raw) => classify_text(raw),
    }
}

impl ErrorKind {
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorKind::RateLimited => RATE_LIMIT_MESSAGE,
            ErrorKind::InvalidCredential => INVALID_KEY_MESSAGE,
            ErrorKind::ContentRefused => REFUSAL_MESSAGE,
            ErrorKind::Unknown => UNKNOWN_MESSAGE,
        }
    }
}

/// Normalize a failure into the message shown to the user, triggering
/// credential re-selection when the key is the problem.
pub fn surface(err: &GenerationError, credentials: &dyn CredentialProvider) -> String {
    error!("Generation failed: {}", err);
    let kind = classify(err);
    if kind == ErrorKind::InvalidCredential {
        credentials.prompt_selection();
    }
    kind.user_message().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::testing::RecordingCredentials;
    use proptest::prelude::*;

    #[test]
    fn test_rate_limit_substrings() {
        for raw in [
            "HTTP 429 Too Many Requests",
            "quota exceeded for project",
            "RESOURCE_EXHAUSTED",
        ] {
            assert_eq!(classify_text(raw), ErrorKind::RateLimited, "{}", raw);
        }
    }

    #[test]
    fn test_invalid_key_substring() {
        assert_eq!(
            classify_text("Requested entity was not found."),
            ErrorKind::InvalidCredential
        );
    }

    #[test]
    fn test_long_text_is_treated_as_refusal() {
        let raw = "I can't create images of real children being altered in this way, \
                   as it goes against my safety guidelines.";
        assert_eq!(classify_text(raw), ErrorKind::ContentRefused);
    }

    #[test]
    fn test_short_unmatched_text_is_unknown() {
        assert_eq!(classify_text("boom"), ErrorKind::Unknown);
    }

    #[test]
    fn test_structured_variants_win_over_heuristics() {
        // Short refusal text would fall through the length heuristic, but
        // the structured variant already knows what it is.
        let err = GenerationError::ContentRefused("no".to_string());
        assert_eq!(classify(&err), ErrorKind::ContentRefused);
        assert_eq!(err.to_string(), "no");
    }

    #[test]
    fn test_surface_rate_limit_message() {
        let credentials = RecordingCredentials::with_key();
        let msg = surface(
            &GenerationError::Provider("got 429 from upstream".to_string()),
            &credentials,
        );
        assert_eq!(msg, RATE_LIMIT_MESSAGE);
        assert_eq!(credentials.prompt_count(), 0);
    }

    #[test]
    fn test_surface_invalid_key_prompts_reselection_once() {
        let credentials = RecordingCredentials::with_key();
        let msg = surface(
            &GenerationError::Provider("Requested entity was not found".to_string()),
            &credentials,
        );
        assert_eq!(msg, INVALID_KEY_MESSAGE);
        assert_eq!(credentials.prompt_count(), 1);
    }

    #[test]
    fn test_surface_refusal_does_not_prompt() {
        let credentials = RecordingCredentials::with_key();
        let msg = surface(
            &GenerationError::ContentRefused("explicação longa da recusa".to_string()),
            &credentials,
        );
        assert_eq!(msg, REFUSAL_MESSAGE);
        assert_eq!(credentials.prompt_count(), 0);
    }

    proptest! {
        #[test]
        fn prop_any_text_containing_429_is_rate_limited(prefix in ".{0,40}", suffix in ".{0,40}") {
            let raw = format!("{}429{}", prefix, suffix);
            prop_assert_eq!(classify_text(&raw), ErrorKind::RateLimited);
        }

        #[test]
        fn prop_not_found_always_wins_over_length(padding in "[bcdfg ]{0,200}") {
            // Padding alphabet cannot spell the rate-limit substrings, so the
            // key error must classify as such no matter how long the text is.
            let raw = format!("Requested entity was not found {}", padding);
            prop_assert_eq!(classify_text(&raw), ErrorKind::InvalidCredential);
        }
    }
}
