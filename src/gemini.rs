//! Google Gemini API client for milestone photo and video generation.
//!
//! Wraps three provider operations: image generation, image editing (both
//! synchronous `generateContent` calls), and video generation (an async
//! long-running operation that is normalized into a synchronous wait by
//! polling). Media travels in and out as base64 data URLs so the frontend
//! can render results directly.
//!
//! No operation retries internally; failures map to `GenerationError` and
//! are normalized for the user at the command boundary.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::GenerationError;

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const OPERATION_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_VIDEO_MODEL: &str = "veo-3.1-fast-generate-preview";

/// Generation can take a while; generous timeout for each single call.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Fixed sleep between video job status checks.
pub const VIDEO_POLL_INTERVAL: Duration = Duration::from_secs(10);

const DEFAULT_MIME: &str = "image/png";

/// Max error-body characters carried into error messages.
const ERROR_BODY_LIMIT: usize = 200;

#[derive(Debug)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    image_model: String,
    video_model: String,
}

/// A generated image plus the prompt that produced it.
#[derive(Debug, Clone)]
pub struct ImageOutput {
    pub media_url: String,
    pub prompt_used: String,
}

/// Handle for an in-progress asynchronous video render. Discarded once the
/// final media is fetched; never persisted across restarts.
#[derive(Debug, Clone)]
pub struct VideoJob {
    pub name: String,
    pub done: bool,
    pub video_uri: Option<String>,
}

// -- Response types --

#[derive(Debug, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiResponseContent,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponsePart {
    inline_data: Option<GeminiInlineData>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    #[allow(dead_code)]
    mime_type: Option<String>,
    data: String,
}

#[derive(Debug, Deserialize)]
struct OperationStatus {
    name: String,
    #[serde(default)]
    done: bool,
    response: Option<OperationResult>,
    error: Option<OperationFailure>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResult {
    generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateVideoResponse {
    #[serde(default)]
    generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Deserialize)]
struct GeneratedSample {
    video: Option<VideoRef>,
}

#[derive(Debug, Deserialize)]
struct VideoRef {
    uri: String,
}

#[derive(Debug, Deserialize)]
struct OperationFailure {
    message: String,
}

// -- Data URL helpers --

/// MIME type of a `data:` URL, falling back to image/png.
pub fn data_url_mime(url: &str) -> &str {
    url.strip_prefix("data:")
        .and_then(|rest| rest.split_once(';'))
        .map(|(mime, _)| mime)
        .filter(|mime| !mime.is_empty())
        .unwrap_or(DEFAULT_MIME)
}

/// Base64 payload of a `data:` URL; raw base64 passes through unchanged.
pub fn data_url_payload(url: &str) -> &str {
    url.split_once(',').map(|(_, data)| data).unwrap_or(url)
}

fn truncate_body(body: &str) -> String {
    body.chars().take(ERROR_BODY_LIMIT).collect()
}

/// Walk the first candidate's parts for an inline image. A text-only part
/// means the model refused; its text becomes the error message verbatim.
fn extract_media(response: GeminiResponse) -> Result<String, GenerationError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(GenerationError::NoResult)?;

    for part in candidate.content.parts {
        if let Some(inline) = part.inline_data {
            return Ok(format!("data:image/png;base64,{}", inline.data));
        }
        if let Some(text) = part.text {
            return Err(GenerationError::ContentRefused(text));
        }
    }

    Err(GenerationError::NoResult)
}

impl GeminiClient {
    pub fn new(api_key: &str) -> Result<Self, GenerationError> {
        Self::with_models(api_key, DEFAULT_IMAGE_MODEL, DEFAULT_VIDEO_MODEL)
    }

    pub fn with_models(
        api_key: &str,
        image_model: &str,
        video_model: &str,
    ) -> Result<Self, GenerationError> {
        if api_key.trim().is_empty() {
            return Err(GenerationError::InvalidCredential(
                "Gemini API key is required".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            image_model: image_model.to_string(),
            video_model: video_model.to_string(),
        })
    }

    fn api_key_header(&self) -> Result<HeaderValue, GenerationError> {
        HeaderValue::from_str(&self.api_key)
            .map_err(|e| GenerationError::Provider(format!("Invalid API key header: {}", e)))
    }

    /// Map a non-success provider response to a structured error. Rate
    /// limiting and dead keys are recognized here so the normalizer does
    /// not have to rely on substring matching for them.
    async fn into_api_error(response: reqwest::Response) -> GenerationError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let summary = truncate_body(&body);

        if status.as_u16() == 429 || body.contains("RESOURCE_EXHAUSTED") {
            GenerationError::RateLimited(format!("{}: {}", status, summary))
        } else if body.contains("Requested entity was not found") {
            GenerationError::InvalidCredential(summary)
        } else {
            GenerationError::Provider(format!("Gemini API error {}: {}", status, summary))
        }
    }

    pub fn build_image_body(
        prompt: &str,
        reference_photo: Option<&str>,
    ) -> serde_json::Value {
        let mut parts = vec![serde_json::json!({ "text": prompt })];
        if let Some(data_url) = reference_photo {
            parts.push(serde_json::json!({
                "inlineData": {
                    "data": data_url_payload(data_url),
                    "mimeType": data_url_mime(data_url),
                }
            }));
        }

        serde_json::json!({
            "contents": [{ "parts": parts }],
            "generationConfig": {
                "imageConfig": { "aspectRatio": "1:1" }
            }
        })
    }

    async fn generate_content(
        &self,
        body: serde_json::Value,
    ) -> Result<String, GenerationError> {
        let url = format!("{}/{}:generateContent", GEMINI_ENDPOINT, self.image_model);

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header("x-goog-api-key", self.api_key_header()?)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::into_api_error(response).await);
        }

        let parsed: GeminiResponse = response.json().await?;
        extract_media(parsed)
    }

    /// Generate a milestone photo. The reference photo, when present, is
    /// sent inline so the model can keep the subject consistent.
    pub async fn generate_image(
        &self,
        prompt: &str,
        reference_photo: Option<&str>,
    ) -> Result<ImageOutput, GenerationError> {
        info!(
            prompt_chars = prompt.len(),
            has_reference = reference_photo.is_some(),
            "Gemini image generation"
        );

        let body = Self::build_image_body(prompt, reference_photo);
        let media_url = self.generate_content(body).await?;

        Ok(ImageOutput {
            media_url,
            prompt_used: prompt.to_string(),
        })
    }

    /// Apply a natural-language edit to an already generated image.
    pub async fn edit_image(
        &self,
        media_url: &str,
        edit_prompt: &str,
    ) -> Result<String, GenerationError> {
        info!(prompt_chars = edit_prompt.len(), "Gemini image edit");

        let body = serde_json::json!({
            "contents": [{
                "parts": [
                    {
                        "inlineData": {
                            "data": data_url_payload(media_url),
                            "mimeType": data_url_mime(media_url),
                        }
                    },
                    { "text": edit_prompt },
                ]
            }]
        });

        self.generate_content(body).await
    }

    /// Animate a generated photo into a short video. Blocks until the
    /// provider reports the job done, polling every 10 seconds.
    pub async fn generate_video(
        &self,
        media_url: &str,
        prompt: &str,
        aspect_ratio: &str,
    ) -> Result<String, GenerationError> {
        resolve_video(self, media_url, prompt, aspect_ratio, VIDEO_POLL_INTERVAL).await
    }
}

/// Seam over the provider's async video-job API so the polling wait can be
/// exercised against a mock job in tests.
#[async_trait]
pub trait VideoOperations: Send + Sync {
    async fn submit_video(
        &self,
        media_url: &str,
        prompt: &str,
        aspect_ratio: &str,
    ) -> Result<VideoJob, GenerationError>;

    async fn poll_video(&self, job: &VideoJob) -> Result<VideoJob, GenerationError>;

    async fn fetch_video(&self, uri: &str) -> Result<Vec<u8>, GenerationError>;
}

/// Submit a video job and poll until the provider reports completion, then
/// fetch the result as a playable data URL.
///
/// The wait is deliberately unbounded: the provider gives no progress
/// signal and no documented upper bound, so the loop keeps asking until it
/// hears done. One status check per interval, nothing in between.
pub async fn resolve_video(
    ops: &dyn VideoOperations,
    media_url: &str,
    prompt: &str,
    aspect_ratio: &str,
    poll_interval: Duration,
) -> Result<String, GenerationError> {
    let mut job = ops.submit_video(media_url, prompt, aspect_ratio).await?;
    info!(job = %job.name, "Video job submitted");

    while !job.done {
        tokio::time::sleep(poll_interval).await;
        job = ops.poll_video(&job).await?;
        debug!(job = %job.name, done = job.done, "Video job polled");
    }

    let uri = job.video_uri.ok_or(GenerationError::VideoFailed)?;
    let bytes = ops.fetch_video(&uri).await?;
    info!(bytes = bytes.len(), "Video downloaded");

    Ok(format!("data:video/mp4;base64,{}", BASE64.encode(bytes)))
}

#[async_trait]
impl VideoOperations for GeminiClient {
    async fn submit_video(
        &self,
        media_url: &str,
        prompt: &str,
        aspect_ratio: &str,
    ) -> Result<VideoJob, GenerationError> {
        let url = format!(
            "{}/{}:predictLongRunning",
            GEMINI_ENDPOINT, self.video_model
        );

        let body = serde_json::json!({
            "instances": [{
                "prompt": prompt,
                "image": {
                    "bytesBase64Encoded": data_url_payload(media_url),
                    "mimeType": data_url_mime(media_url),
                }
            }],
            "parameters": {
                "aspectRatio": aspect_ratio,
                "resolution": "720p",
                "sampleCount": 1,
            }
        });

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header("x-goog-api-key", self.api_key_header()?)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::into_api_error(response).await);
        }

        let status: OperationStatus = response.json().await?;
        Ok(video_job_from_status(status))
    }

    async fn poll_video(&self, job: &VideoJob) -> Result<VideoJob, GenerationError> {
        let url = format!("{}/{}", OPERATION_ENDPOINT, job.name);

        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", self.api_key_header()?)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::into_api_error(response).await);
        }

        let status: OperationStatus = response.json().await?;
        Ok(video_job_from_status(status))
    }

    async fn fetch_video(&self, uri: &str) -> Result<Vec<u8>, GenerationError> {
        // The download URI requires the API key appended as a query param.
        let separator = if uri.contains('?') { '&' } else { '?' };
        let url = format!("{}{}key={}", uri, separator, urlencoding::encode(&self.api_key));

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(Self::into_api_error(response).await);
        }

        Ok(response.bytes().await?.to_vec())
    }
}

fn video_job_from_status(status: OperationStatus) -> VideoJob {
    let video_uri = status
        .response
        .as_ref()
        .and_then(|r| r.generate_video_response.as_ref())
        .and_then(|r| r.generated_samples.first())
        .and_then(|s| s.video.as_ref())
        .map(|v| v.uri.clone());

    // A failed operation still reports done; the missing URI surfaces it.
    if let Some(failure) = status.error {
        debug!(job = %status.name, error = %failure.message, "Video job reported an error");
    }

    VideoJob {
        name: status.name,
        done: status.done,
        video_uri,
    }
}
