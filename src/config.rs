//! Configuration types for the idea-to-app generation chain.
//!
//! All behaviour is controlled through [`PipelineConfig`], built via its
//! [`PipelineConfigBuilder`]. API keys live in an explicit [`Credentials`]
//! value read once at process start and handed to the gateway; nothing in
//! the library reaches for a global client.

use crate::error::Idea2AppError;
use crate::gateway::{ImageQuality, ImageSize, ModelGateway, Provider};
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Older `.env` files name the Anthropic key this way.
pub const CLAUDE_API_KEY_VAR: &str = "CLAUDE_API_KEY";

/// API keys for the two text providers.
///
/// A missing key is not an error here: the first gateway call that needs it
/// fails with an authentication error instead.
#[derive(Clone, Default)]
pub struct Credentials {
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
}

impl Credentials {
    /// Read `OPENAI_API_KEY` and `ANTHROPIC_API_KEY`, falling back to
    /// `CLAUDE_API_KEY` for the Anthropic key. Empty values count as absent.
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        Self {
            openai_api_key: read(Provider::OpenAi.api_key_var()),
            anthropic_api_key: read(Provider::Anthropic.api_key_var())
                .or_else(|| read(CLAUDE_API_KEY_VAR)),
        }
    }

    /// Key for `provider`, if configured.
    pub fn key_for(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::OpenAi => self.openai_api_key.as_deref(),
            Provider::Anthropic => self.anthropic_api_key.as_deref(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |k: &Option<String>| k.as_ref().map(|_| "<redacted>");
        f.debug_struct("Credentials")
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("anthropic_api_key", &redact(&self.anthropic_api_key))
            .finish()
    }
}

/// Model identifiers for each chain step.
///
/// The provider behind each step is fixed; only the model id can change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainModels {
    /// Step 1, OpenAI.
    pub description: String,
    /// Steps 2, 3, 5a and 5b, Anthropic.
    pub anthropic: String,
    /// Step 4 summary, OpenAI.
    pub summary: String,
    /// Step 4 image.
    pub image: String,
}

impl Default for ChainModels {
    fn default() -> Self {
        Self {
            description: "gpt-4-turbo-preview".into(),
            anthropic: "claude-3-opus-20240229".into(),
            summary: "gpt-3.5-turbo".into(),
            image: "dall-e-3".into(),
        }
    }
}

/// Configuration for one generation request.
///
/// # Example
/// ```rust
/// use edgequake_idea2app::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .api_timeout_secs(120)
///     .concurrent_branches(true)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_tokens, 2000);
/// ```
#[derive(Clone)]
pub struct PipelineConfig {
    /// Model ids per step. Default: see [`ChainModels::default`].
    pub models: ChainModels,

    /// Provider API keys. Default: read from the environment.
    pub credentials: Credentials,

    /// Timeout for a single remote call, in seconds. Default: 180.
    ///
    /// Long code-generation answers from large models can take well over a
    /// minute; without a bound a hung connection would hang the request.
    pub api_timeout_secs: u64,

    /// Output-token cap for the Anthropic steps. Default: 2000.
    pub max_tokens: usize,

    /// Mockup size. Default: 1024x1024.
    pub image_size: ImageSize,

    /// Mockup quality. Default: standard.
    pub image_quality: ImageQuality,

    /// Run the image branch and both code generations concurrently.
    /// Default: false (strictly sequential).
    pub concurrent_branches: bool,

    /// Pre-constructed gateway. Takes precedence over building a
    /// [`crate::gateway::RemoteGateway`] from `credentials`.
    pub gateway: Option<Arc<dyn ModelGateway>>,

    /// Per-step progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            models: ChainModels::default(),
            credentials: Credentials::from_env(),
            api_timeout_secs: 180,
            max_tokens: 2000,
            image_size: ImageSize::default(),
            image_quality: ImageQuality::default(),
            concurrent_branches: false,
            gateway: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("models", &self.models)
            .field("credentials", &self.credentials)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("max_tokens", &self.max_tokens)
            .field("image_size", &self.image_size)
            .field("image_quality", &self.image_quality)
            .field("concurrent_branches", &self.concurrent_branches)
            .field("gateway", &self.gateway.as_ref().map(|_| "<dyn ModelGateway>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ChainProgressCallback>"),
            )
            .finish()
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn models(mut self, models: ChainModels) -> Self {
        self.config.models = models;
        self
    }

    pub fn description_model(mut self, model: impl Into<String>) -> Self {
        self.config.models.description = model.into();
        self
    }

    pub fn anthropic_model(mut self, model: impl Into<String>) -> Self {
        self.config.models.anthropic = model.into();
        self
    }

    pub fn summary_model(mut self, model: impl Into<String>) -> Self {
        self.config.models.summary = model.into();
        self
    }

    pub fn image_model(mut self, model: impl Into<String>) -> Self {
        self.config.models.image = model.into();
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.config.credentials = credentials;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn image_size(mut self, size: ImageSize) -> Self {
        self.config.image_size = size;
        self
    }

    pub fn image_quality(mut self, quality: ImageQuality) -> Self {
        self.config.image_quality = quality;
        self
    }

    pub fn concurrent_branches(mut self, v: bool) -> Self {
        self.config.concurrent_branches = v;
        self
    }

    pub fn gateway(mut self, gateway: Arc<dyn ModelGateway>) -> Self {
        self.config.gateway = Some(gateway);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, Idea2AppError> {
        let c = &self.config;
        if c.api_timeout_secs == 0 {
            return Err(Idea2AppError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        if c.max_tokens == 0 {
            return Err(Idea2AppError::InvalidConfig("Max tokens must be ≥ 1".into()));
        }
        let m = &c.models;
        for (step, id) in [
            ("description", &m.description),
            ("anthropic", &m.anthropic),
            ("summary", &m.summary),
            ("image", &m.image),
        ] {
            if id.trim().is_empty() {
                return Err(Idea2AppError::InvalidConfig(format!(
                    "Model id for '{}' must not be empty",
                    step
                )));
            }
        }
        Ok(self.config)
    }
}
