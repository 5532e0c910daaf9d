//! Model providers
//!
//! Provides the provider capability interface and its implementations:
//! - Ollama servers (local, addressed by host)
//! - OpenAI-compatible hosted APIs (OpenAI, DeepSeek)
//!
//! Which identifiers map to which client is decided by a
//! [`ProviderRegistry`] built once at startup and passed to the commands.

mod catalog;
mod ollama;
mod openai;
mod provider;
mod registry;

pub use catalog::{find_provider_info, ProviderInfo, CATALOG};
pub use ollama::OllamaProvider;
pub use openai::OpenAiCompatibleProvider;
pub use provider::ModelProvider;
pub use registry::{ProviderConstructor, ProviderRegistry};

#[cfg(test)]
pub(crate) use registry::tests::StubProvider;

use crate::config::ProviderConfig;
use std::collections::BTreeMap;
use std::time::Duration;

/// Upper bound on a single provider request
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("No client for provider '{id}' (supported: {supported})")]
    UnknownProvider { id: String, supported: String },

    #[error("{provider} requires {what}")]
    MissingCredentials {
        provider: String,
        what: &'static str,
    },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{provider} API error {status}: {body}")]
    Api {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("Unexpected response from {provider}: {message}")]
    InvalidResponse { provider: String, message: String },
}

/// One generation call
#[derive(Debug, Clone)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub api_key: &'a str,
    pub host: &'a str,
    pub options: Option<&'a BTreeMap<String, String>>,
}

impl<'a> GenerateRequest<'a> {
    pub fn new(model: &'a str, prompt: &'a str, config: &'a ProviderConfig) -> Self {
        Self {
            model,
            prompt,
            api_key: &config.api_key,
            host: &config.host,
            options: None,
        }
    }

    pub fn with_options(mut self, options: &'a BTreeMap<String, String>) -> Self {
        if !options.is_empty() {
            self.options = Some(options);
        }
        self
    }

    /// Options as JSON, with numbers and booleans recognized
    pub(crate) fn json_options(&self) -> serde_json::Map<String, serde_json::Value> {
        self.options
            .map(|options| {
                options
                    .iter()
                    .map(|(k, v)| (k.clone(), option_value(v)))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Interpret a free-form option string as the JSON value an API expects
fn option_value(raw: &str) -> serde_json::Value {
    let trimmed = raw.trim();
    if let Ok(b) = trimmed.parse::<bool>() {
        return serde_json::Value::Bool(b);
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return serde_json::Value::from(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if f.is_finite() {
            return serde_json::Value::from(f);
        }
    }
    serde_json::Value::String(raw.to_string())
}

/// Join a base URL and an API path without doubling the slash
pub(crate) fn endpoint(host: &str, path: &str) -> String {
    format!("{}/{}", host.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Turn a non-success response into an API error
pub(crate) fn check_status(
    provider: &str,
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, ProviderError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().unwrap_or_default();
    Err(ProviderError::Api {
        provider: provider.to_string(),
        status,
        body,
    })
}
