//! Assistive text for workers: gig descriptions and dispute mediation.
//!
//! Both tools build a prompt, hand it to the [`TextGenerator`] port, and
//! return the generated text. Failures never reach the caller; they are
//! logged and replaced with a fixed, readable fallback.

use std::fmt;
use std::sync::Arc;

use tracing::error;

use crate::domain::ports::{TextGenerationError, TextGenerator};

/// Returned when no generator API key is configured.
pub const MISSING_API_KEY_TEXT: &str =
    "API Key not configured. Please set the GIG_MARKET_GEMINI_API_KEY environment variable.";

/// Returned when a gig description could not be generated.
pub const DESCRIPTION_FALLBACK_TEXT: &str =
    "Sorry, I couldn't generate a description at this time. Please try again later.";

/// Returned when a mediation suggestion could not be generated.
pub const MEDIATION_FALLBACK_TEXT: &str =
    "I am unable to provide a suggestion right now. Please consider contacting platform support directly.";

/// Output language for generated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AssistantLanguage {
    /// `en`
    #[default]
    English,
    /// `fr`
    French,
    /// `es`
    Spanish,
    /// `ht`
    HaitianCreole,
}

impl AssistantLanguage {
    /// Resolve an interface language code. Unknown codes fall back to
    /// English.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "fr" => Self::French,
            "es" => Self::Spanish,
            "ht" => Self::HaitianCreole,
            _ => Self::English,
        }
    }

    /// Two-letter interface code.
    pub fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::French => "fr",
            Self::Spanish => "es",
            Self::HaitianCreole => "ht",
        }
    }

    /// Language name as written into prompts.
    pub fn name(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::French => "French",
            Self::Spanish => "Spanish",
            Self::HaitianCreole => "Haitian Creole",
        }
    }
}

impl fmt::Display for AssistantLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Prompt asking for a short gig description.
pub fn gig_description_prompt(keywords: &str, language: AssistantLanguage) -> String {
    format!(
        "Generate a compelling and professional gig description for a service provider in \
         Haiti. The description should be welcoming, highlight quality, and be written in \
         {language}. Use the following keywords to guide the description: \"{keywords}\". \
         The description should be one short paragraph."
    )
}

/// Prompt asking for a neutral mediation suggestion.
pub fn dispute_resolution_prompt(details: &str, language: AssistantLanguage) -> String {
    format!(
        "Act as a neutral, friendly mediator for a dispute between a customer and a service \
         worker on a gig platform in Haiti. The goal is to suggest a fair and peaceful \
         resolution. The dispute is as follows: \"{details}\". Provide a calm, step-by-step \
         suggestion for how they can resolve this, written in {language}. Start by \
         acknowledging both parties' perspectives."
    )
}

/// Assistive text tools backed by a [`TextGenerator`].
#[derive(Clone)]
pub struct AssistantService {
    generator: Arc<dyn TextGenerator>,
}

impl AssistantService {
    /// Build the service around `generator`.
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Draft a gig description from free-form keywords.
    pub async fn describe_gig(&self, keywords: &str, language: AssistantLanguage) -> String {
        let prompt = gig_description_prompt(keywords, language);
        self.complete(&prompt, "gig description", DESCRIPTION_FALLBACK_TEXT)
            .await
    }

    /// Suggest how a customer and worker might settle a dispute.
    pub async fn suggest_resolution(&self, details: &str, language: AssistantLanguage) -> String {
        let prompt = dispute_resolution_prompt(details, language);
        self.complete(&prompt, "dispute resolution", MEDIATION_FALLBACK_TEXT)
            .await
    }

    async fn complete(&self, prompt: &str, feature: &'static str, fallback: &str) -> String {
        match self.generator.generate(prompt).await {
            Ok(text) => text,
            Err(TextGenerationError::MissingApiKey) => {
                error!(feature, "text generation is not configured");
                MISSING_API_KEY_TEXT.to_owned()
            }
            Err(err) => {
                error!(feature, error = %err, "text generation failed");
                fallback.to_owned()
            }
        }
    }
}
