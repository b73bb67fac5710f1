use async_trait::async_trait;
use lesson_core::model::{GeneratedContent, QuizQuestion};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::config::ProviderConfig;
use super::parse::{parse_lesson_material, parse_quiz_question};
use super::placeholder::{placeholder_material, placeholder_quiz};
use super::ContentProvider;
use crate::error::ProviderError;

const MATERIAL_TEMPERATURE: f32 = 0.4;
const QUIZ_TEMPERATURE: f32 = 0.6;

/// Content provider backed by an OpenAI-compatible chat completions endpoint.
///
/// Without a config every call returns placeholder content instead of failing.
#[derive(Clone)]
pub struct GenerativeContentProvider {
    client: Client,
    config: Option<ProviderConfig>,
}

impl GenerativeContentProvider {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(ProviderConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<ProviderConfig>) -> Self {
        if config.is_none() {
            warn!("no content provider API key configured; serving placeholder lessons");
        }
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    /// Send `prompt` and return the raw text of the first choice.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` when the provider is disabled, the request fails,
    /// or the response is empty.
    pub async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, ProviderError> {
        let config = self.config.as_ref().ok_or(ProviderError::Disabled)?;

        let payload = ChatRequest {
            model: config.model().to_owned(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt.to_owned(),
            }],
            temperature,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .client
            .post(config.completions_url())
            .bearer_auth(config.api_key())
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(ProviderError::EmptyResponse)?;

        Ok(content.trim().to_owned())
    }
}

#[async_trait]
impl ContentProvider for GenerativeContentProvider {
    async fn generate_lesson_material(
        &self,
        prompt: &str,
        item_key: &str,
    ) -> Option<GeneratedContent> {
        if !self.enabled() {
            return Some(placeholder_material(item_key));
        }

        let result = self
            .complete(prompt, MATERIAL_TEMPERATURE)
            .await
            .and_then(|text| parse_lesson_material(&text, item_key));
        match result {
            Ok(content) => {
                debug!(item_key, "generated lesson material");
                Some(content)
            }
            Err(err) => {
                warn!(item_key, error = %err, "failed to generate lesson material");
                None
            }
        }
    }

    async fn generate_quiz_question(&self, prompt: &str) -> Option<QuizQuestion> {
        if !self.enabled() {
            return Some(placeholder_quiz());
        }

        let result = self
            .complete(prompt, QUIZ_TEMPERATURE)
            .await
            .and_then(|text| parse_quiz_question(&text));
        match result {
            Ok(quiz) => Some(quiz),
            Err(err) => {
                warn!(error = %err, "failed to generate quiz question");
                None
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_provider_serves_placeholders() {
        let provider = GenerativeContentProvider::new(None);
        assert!(!provider.enabled());

        let content = provider
            .generate_lesson_material("prompt", "อะ")
            .await
            .unwrap();
        assert_eq!(content.item_key, "อะ");
        assert_eq!(content.display_script(), "◌ะ");
        assert!(provider.generate_quiz_question("prompt").await.is_some());
    }

    #[tokio::test]
    async fn disabled_provider_refuses_raw_completion() {
        let provider = GenerativeContentProvider::new(None);
        let err = provider.complete("prompt", 0.4).await.unwrap_err();
        assert!(matches!(err, ProviderError::Disabled));
    }

    #[tokio::test]
    async fn unreachable_endpoint_yields_none() {
        let config = ProviderConfig::new("http://127.0.0.1:9", "key", "model").unwrap();
        let provider = GenerativeContentProvider::new(Some(config));
        assert!(provider.generate_lesson_material("prompt", "ก").await.is_none());
        assert!(provider.generate_quiz_question("prompt").await.is_none());
    }

    #[test]
    fn request_serializes_json_response_format() {
        let payload = ChatRequest {
            model: "m".into(),
            messages: vec![ChatMessage {
                role: "user",
                content: "hi".into(),
            }],
            temperature: 0.5,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["response_format"]["type"], "json_object");
        assert_eq!(value["messages"][0]["role"], "user");
    }
}
