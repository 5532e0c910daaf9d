//! Ollama provider implementation
//!
//! Talks to a local (or self-hosted) Ollama server: `/api/tags` for the model
//! list and non-streaming `/api/generate` for completions.

use super::{
    check_status, endpoint, GenerateRequest, ModelProvider, ProviderError, REQUEST_TIMEOUT,
};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

const PROVIDER_NAME: &str = "Ollama";

pub struct OllamaProvider {
    client: Client,
}

impl OllamaProvider {
    pub fn new() -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client })
    }

    pub fn boxed() -> Result<Box<dyn ModelProvider>, ProviderError> {
        Ok(Box::new(Self::new()?))
    }

    fn require_host(host: &str) -> Result<&str, ProviderError> {
        if host.trim().is_empty() {
            return Err(ProviderError::MissingCredentials {
                provider: PROVIDER_NAME.to_string(),
                what: "a host",
            });
        }
        Ok(host.trim())
    }
}

impl ModelProvider for OllamaProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn get_models(&self, _api_key: &str, host: &str) -> Result<Vec<String>, ProviderError> {
        let url = endpoint(Self::require_host(host)?, "api/tags");
        debug!(%url, "listing ollama models");

        let response = check_status(PROVIDER_NAME, self.client.get(&url).send()?)?;
        let tags: TagsResponse = response.json()?;
        Ok(tags.into_names())
    }

    fn generate(&self, request: &GenerateRequest<'_>) -> Result<String, ProviderError> {
        let url = endpoint(Self::require_host(request.host)?, "api/generate");
        debug!(%url, model = request.model, "ollama generate");

        let options = request.json_options();
        let body = GenerateBody {
            model: request.model,
            prompt: request.prompt,
            stream: false,
            options: if options.is_empty() { None } else { Some(options) },
        };

        let response = check_status(PROVIDER_NAME, self.client.post(&url).json(&body).send()?)?;
        let generated: GenerateResponse = response.json()?;
        Ok(generated.response)
    }
}

// Ollama API request/response types

#[derive(Serialize)]
struct GenerateBody<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Deserialize)]
struct TagModel {
    name: String,
}

impl TagsResponse {
    fn into_names(self) -> Vec<String> {
        self.models.into_iter().map(|m| m.name).collect()
    }
}
