use std::env;

use tracing::warn;
use url::Url;

use crate::error::ProviderConfigError;

pub const API_KEY_ENV: &str = "ADVENTURE_AI_API_KEY";
pub const BASE_URL_ENV: &str = "ADVENTURE_AI_BASE_URL";
pub const MODEL_ENV: &str = "ADVENTURE_AI_MODEL";

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Credentials and endpoint for an OpenAI-compatible chat completions API.
#[derive(Clone)]
pub struct ProviderConfig {
    base_url: String,
    api_key: String,
    model: String,
}

impl ProviderConfig {
    /// Validate and build a config. A blank base URL or model falls back to the default.
    ///
    /// # Errors
    ///
    /// Returns `ProviderConfigError::MissingApiKey` for a blank key and
    /// `ProviderConfigError::InvalidBaseUrl` if `base_url` does not parse.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, ProviderConfigError> {
        let api_key = api_key.into().trim().to_owned();
        if api_key.is_empty() {
            return Err(ProviderConfigError::MissingApiKey);
        }
        let base_url = or_default(base_url.into(), DEFAULT_BASE_URL);
        if Url::parse(&base_url).is_err() {
            return Err(ProviderConfigError::InvalidBaseUrl);
        }
        let model = or_default(model.into(), DEFAULT_MODEL);

        Ok(Self {
            base_url,
            api_key,
            model,
        })
    }

    /// Read the config from the environment. `None` when no usable key is set.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var(API_KEY_ENV).ok()?;
        let base_url = env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let model = env::var(MODEL_ENV).unwrap_or_else(|_| DEFAULT_MODEL.into());
        match Self::new(base_url, api_key, model) {
            Ok(config) => Some(config),
            Err(ProviderConfigError::MissingApiKey) => None,
            Err(err) => {
                warn!(error = %err, "ignoring provider configuration from environment");
                None
            }
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

fn or_default(value: String, default: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        default.to_owned()
    } else {
        value.to_owned()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}
