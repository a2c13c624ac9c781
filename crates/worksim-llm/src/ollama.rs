//! Ollama local-model backend

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;

use worksim_core::{Error, LocalModels, Result};

use crate::backend::ChatBackend;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
/// Local generation is slow on CPU-only hosts; give it longer than remote
/// providers before declaring a timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct OllamaMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaResponseMessage,
}

#[derive(Deserialize)]
struct OllamaResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct OllamaTagsResponse {
    models: Option<Vec<OllamaModelTag>>,
}

#[derive(Deserialize)]
struct OllamaModelTag {
    name: String,
}

/// Backend for a locally-hosted Ollama runtime.
///
/// Keyless. The invoker holds the single-flight gate while a call is in
/// flight; this backend itself is just the wire client. Also exposes the
/// registry endpoints used for health probing and model listing.
pub struct OllamaBackend {
    client: Client,
    base_url: String,
}

impl OllamaBackend {
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Base URL from `WORKSIM_OLLAMA_URL`, falling back to localhost
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("WORKSIM_OLLAMA_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::with_base_url(&base_url)
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

    async fn perform(&self, model: &str, prompt: &str) -> Result<String> {
        let request = OllamaChatRequest {
            model,
            messages: vec![OllamaMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
        };

        let url = format!("{}/api/chat", self.base_url);
        let response = self
            .client
            .post(&url)
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
                "ollama chat request failed with status {}: {}",
                status, error_text
            )));
        }

        let chat: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        Ok(chat.message.content)
    }

    /// Whether the local runtime answers its registry endpoint
    pub async fn is_reachable(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        let probe = self.client.get(&url).send();
        matches!(
            timeout(PROBE_TIMEOUT, probe).await,
            Ok(Ok(response)) if response.status().is_success()
        )
    }

    /// Installed model names from the local registry. Errors degrade to an
    /// empty list plus message rather than failing the request.
    pub async fn list_models(&self) -> LocalModels {
        let url = format!("{}/api/tags", self.base_url);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                return LocalModels {
                    models: Vec::new(),
                    error: Some(e.to_string()),
                };
            }
        };

        if !response.status().is_success() {
            return LocalModels {
                models: Vec::new(),
                error: Some(format!("ollama tags request failed: {}", response.status())),
            };
        }

        match response.json::<OllamaTagsResponse>().await {
            Ok(tags) => LocalModels {
                models: tags
                    .models
                    .unwrap_or_default()
                    .into_iter()
                    .map(|tag| tag.name)
                    .collect(),
                error: None,
            },
            Err(e) => LocalModels {
                models: Vec::new(),
                error: Some(e.to_string()),
            },
        }
    }
}

#[async_trait]
impl ChatBackend for OllamaBackend {
    async fn complete(&self, model: &str, _api_key: Option<&str>, prompt: &str) -> Result<String> {
        match timeout(REQUEST_TIMEOUT, self.perform(model, prompt)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout("ollama chat request timed out".to_string())),
        }
    }
}
