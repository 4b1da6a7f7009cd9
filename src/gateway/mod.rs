//! Model gateway: the single seam between the chain and remote models.
//!
//! The orchestrator only ever talks to [`ModelGateway`]; it never sees an
//! HTTP client or an API key. Production code uses [`RemoteGateway`], tests
//! inject a recording fake. Every call is a single blocking-until-answered
//! request: no retries, no caching.

pub mod remote;

pub use remote::RemoteGateway;

use crate::error::GatewayError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Text-generation providers the chain routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    /// OpenAI chat completions (initial description, image summary).
    OpenAi,
    /// Anthropic messages (refinement, UI narrative, code generation).
    Anthropic,
}

impl Provider {
    /// Provider name as understood by `edgequake_llm::ProviderFactory`.
    pub fn name(self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn api_key_var(self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Output size of the generated mockup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageSize {
    #[default]
    Square1024,
    Portrait1024x1792,
    Landscape1792x1024,
}

impl ImageSize {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageSize::Square1024 => "1024x1024",
            ImageSize::Portrait1024x1792 => "1024x1792",
            ImageSize::Landscape1792x1024 => "1792x1024",
        }
    }
}

/// Rendering quality of the generated mockup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageQuality {
    #[default]
    Standard,
    Hd,
}

impl ImageQuality {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageQuality::Standard => "standard",
            ImageQuality::Hd => "hd",
        }
    }
}

/// Uniform interface to the remote text and image models.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Send `prompt` as a single user message and return the first
    /// completion's text.
    async fn generate_text(
        &self,
        provider: Provider,
        model: &str,
        prompt: &str,
        max_tokens: Option<usize>,
    ) -> Result<String, GatewayError>;

    /// Generate one image and return its hosted URL.
    async fn generate_image(
        &self,
        prompt: &str,
        size: ImageSize,
        quality: ImageQuality,
    ) -> Result<String, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_names_match_factory() {
        assert_eq!(Provider::OpenAi.name(), "openai");
        assert_eq!(Provider::Anthropic.name(), "anthropic");
        assert_eq!(Provider::Anthropic.to_string(), "anthropic");
    }

    #[test]
    fn image_defaults() {
        assert_eq!(ImageSize::default().as_str(), "1024x1024");
        assert_eq!(ImageQuality::default().as_str(), "standard");
    }
}
