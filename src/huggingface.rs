//! Hugging Face inference backend for image generation.
//!
//! Alternate image provider: a Stable Diffusion endpoint that takes a bare
//! prompt and answers with raw PNG bytes. No reference-photo support and no
//! editing; the Gemini backend remains the default when subject consistency
//! matters.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;
use tracing::info;

use crate::error::GenerationError;
use crate::gemini::ImageOutput;

const HF_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/stabilityai/stable-diffusion-2-1";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug)]
pub struct HuggingFaceClient {
    client: reqwest::Client,
    token: String,
}

impl HuggingFaceClient {
    pub fn new(token: &str) -> Result<Self, GenerationError> {
        if token.trim().is_empty() {
            return Err(GenerationError::InvalidCredential(
                "Hugging Face token is required".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            token: token.to_string(),
        })
    }

    pub async fn generate_image(&self, prompt: &str) -> Result<ImageOutput, GenerationError> {
        info!(prompt_chars = prompt.len(), "Hugging Face image generation");

        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .map_err(|e| GenerationError::Provider(format!("Invalid token header: {}", e)))?;

        let response = self
            .client
            .post(HF_ENDPOINT)
            .header(AUTHORIZATION, bearer)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .json(&serde_json::json!({ "inputs": prompt }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status.as_u16() == 429 {
                return Err(GenerationError::RateLimited(format!("{}: {}", status, body)));
            }
            return Err(GenerationError::Provider(format!(
                "Hugging Face API error {}: {}",
                status, body
            )));
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(GenerationError::NoResult);
        }

        Ok(ImageOutput {
            media_url: format!("data:image/png;base64,{}", BASE64.encode(&bytes)),
            prompt_used: prompt.to_string(),
        })
    }
}
