//! Reqwest-backed Gemini text generator.
//!
//! This adapter owns transport details only: request serialisation, timeout
//! and HTTP error mapping, and decoding the first candidate's text.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use super::dto::{GenerateContentRequestDto, GenerateContentResponseDto};
use crate::domain::ports::{TextGenerationError, TextGenerator};

/// Base URL of the Generative Language API.
pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used when none is configured.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Text generator that posts prompts to one Gemini model.
pub struct GeminiHttpGenerator {
    client: Client,
    url: Url,
    api_key: String,
}

impl GeminiHttpGenerator {
    /// Build an adapter for `model` under `endpoint` with a request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`TextGenerationError::Transport`] when the endpoint cannot
    /// carry a path or the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        model: &str,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TextGenerationError> {
        let url = generate_content_url(endpoint, model)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(map_transport_error)?;
        Ok(Self {
            client,
            url,
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiHttpGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, TextGenerationError> {
        let response = self
            .client
            .post(self.url.clone())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&GenerateContentRequestDto::from_prompt(prompt))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_text(body.as_ref())
    }
}

fn generate_content_url(mut endpoint: Url, model: &str) -> Result<Url, TextGenerationError> {
    let model = model.trim();
    if model.is_empty() {
        return Err(TextGenerationError::transport("model name must not be blank"));
    }
    endpoint
        .path_segments_mut()
        .map_err(|()| TextGenerationError::transport("endpoint cannot carry a path"))?
        .pop_if_empty()
        .push("models")
        .push(&format!("{model}:generateContent"));
    Ok(endpoint)
}

fn parse_text(body: &[u8]) -> Result<String, TextGenerationError> {
    let decoded: GenerateContentResponseDto = serde_json::from_slice(body).map_err(|error| {
        TextGenerationError::decode(format!("invalid generateContent payload: {error}"))
    })?;
    decoded
        .into_text()
        .ok_or_else(TextGenerationError::empty_response)
}

fn map_transport_error(error: reqwest::Error) -> TextGenerationError {
    TextGenerationError::transport(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> TextGenerationError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_owned()
    } else {
        preview
    };
    TextGenerationError::status(status.as_u16(), message)
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
