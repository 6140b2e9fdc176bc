//! Marketplace configuration loaded via OrthoConfig.
//!
//! Values come from `GIG_MARKET_*` environment variables or a configuration
//! file; anything unset falls back to the defaults below.

use std::sync::Arc;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::ports::{TextGenerationError, TextGenerator, UnconfiguredTextGenerator};
use crate::outbound::gemini::{DEFAULT_GEMINI_ENDPOINT, DEFAULT_GEMINI_MODEL, GeminiHttpGenerator};
use crate::outbound::memory::{
    CatalogueError, InMemoryMarketplace, LatencyProfile, PaymentSimulator,
};

const DEFAULT_GEMINI_TIMEOUT_SECS: u64 = 30;

/// Settings for the in-memory marketplace and the assistive text client.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "GIG_MARKET")]
pub struct MarketplaceSettings {
    /// Base simulated latency in milliseconds.
    #[ortho_config(default = 500)]
    pub latency_ms: u64,
    /// Share of payments that succeed, in percent.
    #[ortho_config(default = 80)]
    pub payment_success_percent: u8,
    /// Seed for reproducible payment outcomes.
    pub payment_seed: Option<u64>,
    /// Gemini API key. Assistive text is disabled without one.
    pub gemini_api_key: Option<String>,
    /// Gemini model name.
    pub gemini_model: Option<String>,
    /// Generative Language API base URL.
    pub gemini_endpoint: Option<String>,
    /// Request timeout for text generation, in seconds.
    pub gemini_timeout_secs: Option<u64>,
}

impl MarketplaceSettings {
    /// Latency profile scaled from the configured base delay.
    pub fn latency(&self) -> LatencyProfile {
        LatencyProfile::new(Duration::from_millis(self.latency_ms))
    }

    /// Payment simulator honouring the success rate and optional seed.
    pub fn payments(&self) -> PaymentSimulator {
        PaymentSimulator::new(self.payment_success_percent, self.payment_seed)
    }

    /// Return the configured model, falling back to the default.
    pub fn gemini_model(&self) -> &str {
        self.gemini_model
            .as_deref()
            .map(str::trim)
            .filter(|model| !model.is_empty())
            .unwrap_or(DEFAULT_GEMINI_MODEL)
    }

    /// Return the configured endpoint, falling back to the default.
    pub fn gemini_endpoint(&self) -> &str {
        self.gemini_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_GEMINI_ENDPOINT)
    }

    /// Return the text generation timeout.
    pub fn gemini_timeout(&self) -> Duration {
        Duration::from_secs(
            self.gemini_timeout_secs
                .unwrap_or(DEFAULT_GEMINI_TIMEOUT_SECS),
        )
    }

    /// Return the API key when one is set and not blank.
    pub fn gemini_api_key(&self) -> Option<&str> {
        self.gemini_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Seeded marketplace with the configured latency and payment rate.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError`] if the bundled catalogue fails to load.
    pub fn marketplace(&self) -> Result<InMemoryMarketplace, CatalogueError> {
        Ok(InMemoryMarketplace::seeded()?
            .with_latency(self.latency())
            .with_payments(self.payments()))
    }

    /// Text generator for assistive tools.
    ///
    /// Without an API key this is an [`UnconfiguredTextGenerator`], so the
    /// tools answer with a configuration hint instead of calling out.
    ///
    /// # Errors
    ///
    /// Returns [`TextGenerationError::Transport`] when the endpoint is not a
    /// valid URL or the HTTP client cannot be built.
    pub fn text_generator(&self) -> Result<Arc<dyn TextGenerator>, TextGenerationError> {
        let Some(api_key) = self.gemini_api_key() else {
            return Ok(Arc::new(UnconfiguredTextGenerator));
        };
        let endpoint = Url::parse(self.gemini_endpoint()).map_err(|error| {
            TextGenerationError::transport(format!("invalid Gemini endpoint: {error}"))
        })?;
        let generator = GeminiHttpGenerator::new(
            endpoint,
            self.gemini_model(),
            api_key,
            self.gemini_timeout(),
        )?;
        Ok(Arc::new(generator))
    }
}
