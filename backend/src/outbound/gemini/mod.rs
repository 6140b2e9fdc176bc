//! Gemini outbound adapter.
//!
//! This module provides a thin HTTP implementation of the `TextGenerator`
//! port against the Generative Language `generateContent` endpoint.

mod dto;
mod http_generator;

pub use http_generator::{DEFAULT_GEMINI_ENDPOINT, DEFAULT_GEMINI_MODEL, GeminiHttpGenerator};
