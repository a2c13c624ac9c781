//! Anthropic Claude backend

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;

use worksim_core::{Error, Result};

use crate::backend::ChatBackend;

const CLAUDE_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

/// Backend for the Anthropic messages API
pub struct ClaudeBackend {
    client: Client,
    base_url: String,
}

impl ClaudeBackend {
    pub fn new() -> Result<Self> {
        Self::with_base_url(CLAUDE_BASE_URL)
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
        let request = MessagesRequest {
            model,
            max_tokens: MAX_TOKENS,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let url = format!("{}/v1/messages", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
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
                "messages request failed with status {}: {}",
                status, error_text
            )));
        }

        let messages: MessagesResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        messages
            .content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or_else(|| Error::ProviderCall("no text block in messages response".to_string()))
    }
}

#[async_trait]
impl ChatBackend for ClaudeBackend {
    async fn complete(&self, model: &str, api_key: Option<&str>, prompt: &str) -> Result<String> {
        let api_key = api_key.ok_or_else(|| Error::MissingCredential("claude".to_string()))?;

        match timeout(REQUEST_TIMEOUT, self.perform(model, api_key, prompt)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout("messages request timed out".to_string())),
        }
    }
}
