//! Driven port for the generative-language collaborator.
//!
//! The contract is text in, text out. Prompt construction and fallback
//! wording belong to the domain; adapters only move text over the wire.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by text generation adapters.
    pub enum TextGenerationError {
        /// No API key is configured, so no request was attempted.
        MissingApiKey => "text generation API key is not configured",
        /// The request could not be sent or timed out.
        Transport { message: String } => "text generation transport failed: {message}",
        /// The service answered with a non-success status.
        Status { status: u16, message: String } =>
            "text generation service returned {status}: {message}",
        /// The response body could not be decoded.
        Decode { message: String } => "text generation response invalid: {message}",
        /// The service answered without any text.
        EmptyResponse => "text generation service returned no text",
    }
}

/// Produces free text from a prompt.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, TextGenerationError>;
}

/// Generator used when no API key is configured.
///
/// Every call fails with [`TextGenerationError::MissingApiKey`] without
/// touching the network.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredTextGenerator;

#[async_trait]
impl TextGenerator for UnconfiguredTextGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, TextGenerationError> {
        Err(TextGenerationError::missing_api_key())
    }
}
