//! LLM provider routing
//!
//! A model identifier plus the caller-supplied key map resolves to exactly one
//! `(provider, model, key)` binding. Routing is total: unknown model ids fall
//! back to OpenAI rather than failing, so a misspelled model surfaces as a
//! provider-side error instead of a routing error.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Supported LLM providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// OpenAI (GPT and o-series models), also the default route
    OpenAi,
    /// Google Gemini
    Gemini,
    /// Anthropic Claude
    Claude,
    /// Perplexity (sonar models)
    Perplexity,
    /// Locally-hosted Ollama, single-flight guarded
    Ollama,
}

/// Prefix table driving model-id routing. Adding a provider is a data change.
const PREFIX_TABLE: &[(&str, Provider)] = &[
    ("gpt", Provider::OpenAi),
    ("o1", Provider::OpenAi),
    ("o3", Provider::OpenAi),
    ("o4", Provider::OpenAi),
    ("gemini", Provider::Gemini),
    ("claude", Provider::Claude),
    ("perplexity", Provider::Perplexity),
    ("sonar", Provider::Perplexity),
    ("ollama", Provider::Ollama),
];

impl Provider {
    /// Canonical provider name
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Gemini => "gemini",
            Provider::Claude => "claude",
            Provider::Perplexity => "perplexity",
            Provider::Ollama => "ollama",
        }
    }

    /// Label under which the caller-supplied key map holds this provider's
    /// API key. `None` for the local provider, which needs no key.
    pub fn key_label(&self) -> Option<&'static str> {
        match self {
            Provider::OpenAi => Some("gpt"),
            Provider::Gemini => Some("gemini"),
            Provider::Claude => Some("claude"),
            Provider::Perplexity => Some("perplexity"),
            Provider::Ollama => None,
        }
    }

    /// Whether this provider requires an API key
    pub fn requires_key(&self) -> bool {
        self.key_label().is_some()
    }

    /// Whether this provider runs on local compute and must go through the
    /// single-flight gate
    pub fn is_local(&self) -> bool {
        matches!(self, Provider::Ollama)
    }

    /// Get all supported providers
    pub fn all() -> Vec<Provider> {
        vec![
            Provider::OpenAi,
            Provider::Gemini,
            Provider::Claude,
            Provider::Perplexity,
            Provider::Ollama,
        ]
    }

    /// Parse an explicit provider name. Unlike [`route_model`] this is not
    /// total: callers passing a provider by name (config, CLI flags) get a
    /// typed error for anything unrecognized.
    pub fn from_name(s: &str) -> Result<Provider> {
        match s.to_lowercase().as_str() {
            "openai" | "gpt" => Ok(Provider::OpenAi),
            "gemini" | "google" => Ok(Provider::Gemini),
            "claude" | "anthropic" => Ok(Provider::Claude),
            "perplexity" | "sonar" => Ok(Provider::Perplexity),
            "ollama" | "local" => Ok(Provider::Ollama),
            other => Err(Error::UnsupportedProvider(other.to_string())),
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A fully resolved invocation target: which provider, which model name the
/// provider knows the model by, and the key to authenticate with (if any).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderBinding {
    pub provider: Provider,
    pub model: String,
    pub api_key: Option<String>,
}

/// Resolve a model identifier and caller-supplied key map to a provider
/// binding.
///
/// Matching is a case-insensitive prefix scan over [`PREFIX_TABLE`]; the
/// `ollama-` prefix is stripped so the local runtime sees its own model name
/// (`ollama-llama3.3` becomes `llama3.3`). Anything unmatched routes to
/// OpenAI with the id passed through untouched.
pub fn route_model(model_id: &str, api_keys: Option<&HashMap<String, String>>) -> ProviderBinding {
    let model_lower = model_id.to_lowercase();

    let provider = PREFIX_TABLE
        .iter()
        .find(|(prefix, _)| model_lower.starts_with(*prefix))
        .map(|(_, provider)| *provider)
        .unwrap_or(Provider::OpenAi);

    let model = if provider == Provider::Ollama {
        model_id.strip_prefix("ollama-").unwrap_or(model_id).to_string()
    } else {
        model_id.to_string()
    };

    let api_key = provider
        .key_label()
        .and_then(|label| api_keys.and_then(|keys| keys.get(label)))
        .cloned();

    ProviderBinding {
        provider,
        model,
        api_key,
    }
}
