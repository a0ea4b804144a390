use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::domain::ImageRef;
use thiserror::Error;
use tracing::debug;
use url::Url;

pub const DEFAULT_IMAGEN_MODEL: &str = "imagen-4.0-generate-001";
pub const DEFAULT_IMAGEN_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MIME_TYPE: &str = "image/jpeg";
const API_KEY_HEADER: &str = "x-goog-api-key";
const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum IllustrationError {
    #[error("no API key configured for image generation")]
    MissingCredentials,
    #[error("invalid image generation endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("image generation request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("image generation provider returned {status}: {message}")]
    Provider { status: u16, message: String },
    #[error("image generation returned no images")]
    EmptyResult,
    #[error("image payload is not valid base64: {0}")]
    Payload(#[from] base64::DecodeError),
}

/// Produces an illustration of a named subject. Implementations report every
/// failure; callers decide how to degrade.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, subject: &str) -> Result<ImageRef, IllustrationError>;
}

pub fn illustration_prompt(subject: &str) -> String {
    format!(
        "A cute, vibrant, friendly cartoon illustration of a {subject} on a clean white background. High quality, children's book style."
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagenConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Default for ImagenConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_IMAGEN_MODEL.into(),
            base_url: DEFAULT_IMAGEN_BASE_URL.into(),
        }
    }
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    instances: [PredictInstance<'a>; 1],
    parameters: PredictParameters,
}

#[derive(Serialize)]
struct PredictInstance<'a> {
    prompt: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters {
    sample_count: u32,
    aspect_ratio: &'static str,
    output_options: OutputOptions,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OutputOptions {
    mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
    mime_type: Option<String>,
}

/// Image generation through the Gemini API `predict` endpoint of an Imagen model.
pub struct ImagenClient {
    http: Client,
    config: ImagenConfig,
}

impl ImagenClient {
    pub fn new(config: ImagenConfig) -> Self {
        Self::with_http_client(Client::new(), config)
    }

    pub fn with_http_client(http: Client, config: ImagenConfig) -> Self {
        Self { http, config }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }

    pub fn config(&self) -> &ImagenConfig {
        &self.config
    }

    fn api_key(&self) -> Option<&str> {
        self.config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    fn endpoint(&self) -> Result<Url, IllustrationError> {
        let base = format!("{}/", self.config.base_url.trim_end_matches('/'));
        let url = Url::parse(&base)?.join(&format!("v1beta/models/{}:predict", self.config.model))?;
        Ok(url)
    }
}

#[async_trait]
impl ImageGenerator for ImagenClient {
    async fn generate(&self, subject: &str) -> Result<ImageRef, IllustrationError> {
        let api_key = self.api_key().ok_or(IllustrationError::MissingCredentials)?;
        let endpoint = self.endpoint()?;
        let prompt = illustration_prompt(subject);

        debug!(model = %self.config.model, subject, "requesting illustration");
        let res = self
            .http
            .post(endpoint)
            .header(API_KEY_HEADER, api_key)
            .json(&PredictRequest {
                instances: [PredictInstance { prompt: &prompt }],
                parameters: PredictParameters {
                    sample_count: 1,
                    aspect_ratio: "1:1",
                    output_options: OutputOptions {
                        mime_type: DEFAULT_MIME_TYPE,
                    },
                },
            })
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(IllustrationError::Provider {
                status: status.as_u16(),
                message: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let body: PredictResponse = res.json().await?;
        let Some((bytes_b64, mime_type)) = body.predictions.into_iter().find_map(|p| {
            p.bytes_base64_encoded
                .filter(|bytes| !bytes.is_empty())
                .map(|bytes| (bytes, p.mime_type))
        }) else {
            return Err(IllustrationError::EmptyResult);
        };

        if STANDARD.decode(&bytes_b64)?.is_empty() {
            return Err(IllustrationError::EmptyResult);
        }

        Ok(ImageRef::from_base64(
            mime_type.as_deref().unwrap_or(DEFAULT_MIME_TYPE),
            &bytes_b64,
        ))
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
