//! Production gateway: edgequake-llm for text, the OpenAI images API for
//! mockups.
//!
//! Providers are built per call from the key held in [`Credentials`]; the
//! process environment is never consulted here. A missing key surfaces as
//! [`GatewayError::Auth`] on the first call that needs it rather than at
//! start-up. Every call runs under `api_timeout`; expiry maps to
//! [`GatewayError::Timeout`].

use super::{ImageQuality, ImageSize, ModelGateway, Provider};
use crate::config::Credentials;
use crate::error::GatewayError;
use async_trait::async_trait;
use edgequake_llm::{
    AnthropicProvider, ChatMessage, CompletionOptions, LLMProvider, OpenAIProvider,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

const OPENAI_IMAGES_URL: &str = "https://api.openai.com/v1/images/generations";
const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

/// Gateway backed by the real provider APIs.
pub struct RemoteGateway {
    credentials: Credentials,
    api_timeout: Duration,
    http: reqwest::Client,
    image_model: String,
    images_url: String,
}

impl RemoteGateway {
    /// Create a gateway. The HTTP client is built once and its connection
    /// pool is shared by every call.
    pub fn new(credentials: Credentials, api_timeout: Duration) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(api_timeout)
            .build()
            .map_err(|e| GatewayError::Network {
                provider: Provider::OpenAi.name().to_string(),
                detail: e.to_string(),
            })?;

        Ok(Self {
            credentials,
            api_timeout,
            http,
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            images_url: OPENAI_IMAGES_URL.to_string(),
        })
    }

    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    /// Point image generation at an OpenAI-compatible endpoint.
    pub fn with_images_url(mut self, url: impl Into<String>) -> Self {
        self.images_url = url.into();
        self
    }

    fn require_key(&self, provider: Provider) -> Result<&str, GatewayError> {
        self.credentials
            .key_for(provider)
            .ok_or_else(|| GatewayError::Auth {
                provider: provider.name().to_string(),
                detail: format!("{} is not set", provider.api_key_var()),
            })
    }

    /// Chat provider for `provider`, authenticated with the configured key.
    fn text_provider(
        &self,
        provider: Provider,
        model: &str,
    ) -> Result<Arc<dyn LLMProvider>, GatewayError> {
        let api_key = self.require_key(provider)?;
        let llm: Arc<dyn LLMProvider> = match provider {
            Provider::OpenAi => Arc::new(OpenAIProvider::new(api_key).with_model(model)),
            Provider::Anthropic => Arc::new(AnthropicProvider::new(api_key).with_model(model)),
        };
        Ok(llm)
    }
}

#[async_trait]
impl ModelGateway for RemoteGateway {
    async fn generate_text(
        &self,
        provider: Provider,
        model: &str,
        prompt: &str,
        max_tokens: Option<usize>,
    ) -> Result<String, GatewayError> {
        let llm = self.text_provider(provider, model)?;

        let messages = vec![ChatMessage::user(prompt)];
        let options = CompletionOptions {
            max_tokens,
            ..Default::default()
        };

        let start = Instant::now();
        let response = tokio::time::timeout(self.api_timeout, llm.chat(&messages, Some(&options)))
            .await
            .map_err(|_| GatewayError::Timeout {
                provider: provider.name().to_string(),
                secs: self.api_timeout.as_secs(),
            })?
            .map_err(|e| classify_llm_error(provider, &e.to_string(), self.api_timeout))?;

        debug!(
            "{}/{}: {} input tokens, {} output tokens, {:?}",
            provider,
            model,
            response.prompt_tokens,
            response.completion_tokens,
            start.elapsed()
        );

        if response.content.trim().is_empty() {
            return Err(GatewayError::EmptyResponse {
                provider: provider.name().to_string(),
            });
        }
        Ok(response.content)
    }

    async fn generate_image(
        &self,
        prompt: &str,
        size: ImageSize,
        quality: ImageQuality,
    ) -> Result<String, GatewayError> {
        let provider = Provider::OpenAi.name().to_string();
        let api_key = self.require_key(Provider::OpenAi)?;

        let request = ImageRequest {
            model: &self.image_model,
            prompt,
            size: size.as_str(),
            quality: quality.as_str(),
            n: 1,
        };

        let response = self
            .http
            .post(&self.images_url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout {
                        provider: provider.clone(),
                        secs: self.api_timeout.as_secs(),
                    }
                } else {
                    GatewayError::Network {
                        provider: provider.clone(),
                        detail: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(if status.as_u16() == 401 || status.as_u16() == 403 {
                GatewayError::Auth {
                    provider,
                    detail: format!("HTTP {}: {}", status, body),
                }
            } else {
                GatewayError::Provider {
                    provider,
                    message: format!("HTTP {}: {}", status, body),
                }
            });
        }

        let parsed: ImageResponse = response.json().await.map_err(|e| GatewayError::Provider {
            provider: provider.clone(),
            message: format!("Failed to parse image response: {}", e),
        })?;

        parsed
            .data
            .into_iter()
            .find_map(|d| d.url)
            .ok_or(GatewayError::EmptyResponse { provider })
    }
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'a str,
    quality: &'a str,
    n: u8,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    url: Option<String>,
}

/// Map an edgequake-llm error message onto the gateway taxonomy.
///
/// The provider errors only expose a rendered message, so classification is
/// by the status codes and phrases the providers actually return.
fn classify_llm_error(provider: Provider, message: &str, timeout: Duration) -> GatewayError {
    let lower = message.to_lowercase();
    let name = provider.name().to_string();
    if lower.contains("401")
        || lower.contains("403")
        || lower.contains("unauthorized")
        || lower.contains("api key")
        || lower.contains("api_key")
        || lower.contains("authentication")
    {
        GatewayError::Auth {
            provider: name,
            detail: message.to_string(),
        }
    } else if lower.contains("timed out") || lower.contains("timeout") {
        GatewayError::Timeout {
            provider: name,
            secs: timeout.as_secs(),
        }
    } else if lower.contains("connection") || lower.contains("dns") || lower.contains("network") {
        GatewayError::Network {
            provider: name,
            detail: message.to_string(),
        }
    } else {
        GatewayError::Provider {
            provider: name,
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway(credentials: Credentials) -> RemoteGateway {
        RemoteGateway::new(credentials, Duration::from_secs(5)).expect("client builds")
    }

    #[test]
    fn missing_key_fails_text_call_with_auth() {
        let gw = gateway(Credentials::default());
        let err = tokio_test::block_on(gw.generate_text(
            Provider::Anthropic,
            "claude-3-opus-20240229",
            "hello",
            Some(10),
        ))
        .unwrap_err();
        match err {
            GatewayError::Auth { provider, detail } => {
                assert_eq!(provider, "anthropic");
                assert!(detail.contains("ANTHROPIC_API_KEY"));
            }
            other => panic!("expected Auth, got {other:?}"),
        }
    }

    #[test]
    fn explicit_keys_build_providers_without_env() {
        std::env::remove_var("OPENAI_API_KEY");
        std::env::remove_var("ANTHROPIC_API_KEY");
        let gw = gateway(Credentials {
            openai_api_key: Some("sk-explicit".into()),
            anthropic_api_key: Some("sk-ant-explicit".into()),
        });

        let openai = gw
            .text_provider(Provider::OpenAi, "gpt-4-turbo-preview")
            .expect("explicit OpenAI key is enough");
        assert_eq!(openai.name(), "openai");
        assert_eq!(openai.model(), "gpt-4-turbo-preview");

        let anthropic = gw
            .text_provider(Provider::Anthropic, "claude-3-opus-20240229")
            .expect("explicit Anthropic key is enough");
        assert_eq!(anthropic.model(), "claude-3-opus-20240229");
    }

    #[test]
    fn env_key_does_not_stand_in_for_missing_credential() {
        std::env::set_var("ANTHROPIC_API_KEY", "sk-ant-from-env");
        let gw = gateway(Credentials {
            openai_api_key: Some("sk-explicit".into()),
            anthropic_api_key: None,
        });
        let err = gw
            .text_provider(Provider::Anthropic, "claude-3-opus-20240229")
            .err()
            .expect("no Anthropic key configured");
        assert!(matches!(err, GatewayError::Auth { .. }), "got {err:?}");
    }

    #[test]
    fn missing_key_fails_image_call_with_auth() {
        let gw = gateway(Credentials::default());
        let err = tokio_test::block_on(gw.generate_image(
            "a phone",
            ImageSize::default(),
            ImageQuality::default(),
        ))
        .unwrap_err();
        assert!(matches!(err, GatewayError::Auth { .. }), "got {err:?}");
    }

    #[test]
    fn image_request_body_shape() {
        let req = ImageRequest {
            model: "dall-e-3",
            prompt: "p",
            size: ImageSize::Square1024.as_str(),
            quality: ImageQuality::Standard.as_str(),
            n: 1,
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["model"], "dall-e-3");
        assert_eq!(v["size"], "1024x1024");
        assert_eq!(v["quality"], "standard");
        assert_eq!(v["n"], 1);
    }

    #[test]
    fn image_response_parsing() {
        let body = r#"{"created":1,"data":[{"url":"https://img.example/1.png","revised_prompt":"x"}]}"#;
        let parsed: ImageResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            parsed.data[0].url.as_deref(),
            Some("https://img.example/1.png")
        );
    }

    #[test]
    fn llm_error_classification() {
        let t = Duration::from_secs(30);
        assert!(matches!(
            classify_llm_error(Provider::OpenAi, "HTTP 401 Unauthorized", t),
            GatewayError::Auth { .. }
        ));
        assert!(matches!(
            classify_llm_error(
                Provider::OpenAi,
                "Configuration error: OPENAI_API_KEY required for OpenAI LLM provider",
                t
            ),
            GatewayError::Auth { .. }
        ));
        assert!(matches!(
            classify_llm_error(Provider::Anthropic, "request timed out", t),
            GatewayError::Timeout { .. }
        ));
        assert!(matches!(
            classify_llm_error(Provider::Anthropic, "connection refused", t),
            GatewayError::Network { .. }
        ));
        assert!(matches!(
            classify_llm_error(Provider::OpenAi, "model overloaded", t),
            GatewayError::Provider { .. }
        ));
    }
}
