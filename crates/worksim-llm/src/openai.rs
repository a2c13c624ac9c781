//! OpenAI-compatible chat completions backend

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;

use worksim_core::{Error, Result};

use crate::backend::ChatBackend;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const PERPLEXITY_BASE_URL: &str = "https://api.perplexity.ai";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Backend for the OpenAI chat completions API.
///
/// Perplexity speaks the same wire protocol; [`OpenAiBackend::perplexity`]
/// is the same client pointed at their base URL.
pub struct OpenAiBackend {
    client: Client,
    base_url: String,
}

impl OpenAiBackend {
    pub fn new() -> Result<Self> {
        Self::with_base_url(OPENAI_BASE_URL)
    }

    pub fn perplexity() -> Result<Self> {
        Self::with_base_url(PERPLEXITY_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn perform(&self, model: &str, api_key: &str, prompt: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(Error::ProviderCall(format!(
                "chat completions request failed with status {}: {}",
                status, error_text
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::ProviderCall("empty choices in completion response".to_string()))
    }
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    async fn complete(&self, model: &str, api_key: Option<&str>, prompt: &str) -> Result<String> {
        let api_key =
            api_key.ok_or_else(|| Error::MissingCredential("openai-compatible".to_string()))?;

        match timeout(REQUEST_TIMEOUT, self.perform(model, api_key, prompt)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout("chat completions request timed out".to_string())),
        }
    }
}
