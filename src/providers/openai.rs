//! OpenAI-compatible provider implementation
//!
//! Implements the ModelProvider trait for OpenAI-style HTTP APIs.
//! Works with OpenAI, DeepSeek and other endpoints exposing `/v1/models` and
//! `/v1/chat/completions`.

use super::{
    check_status, endpoint, GenerateRequest, ModelProvider, ProviderError, REQUEST_TIMEOUT,
};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub struct OpenAiCompatibleProvider {
    client: Client,
    name: &'static str,
    default_host: &'static str,
}

impl OpenAiCompatibleProvider {
    pub fn new(name: &'static str, default_host: &'static str) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            name,
            default_host,
        })
    }

    pub fn openai() -> Result<Box<dyn ModelProvider>, ProviderError> {
        Ok(Box::new(Self::new("OpenAI", "https://api.openai.com")?))
    }

    pub fn deepseek() -> Result<Box<dyn ModelProvider>, ProviderError> {
        Ok(Box::new(Self::new("DeepSeek", "https://api.deepseek.com")?))
    }

    fn require_key<'a>(&self, api_key: &'a str) -> Result<&'a str, ProviderError> {
        if api_key.trim().is_empty() {
            return Err(ProviderError::MissingCredentials {
                provider: self.name.to_string(),
                what: "an API key",
            });
        }
        Ok(api_key.trim())
    }

    /// Configured host, or the provider's public endpoint when none is stored
    fn base<'a>(&self, host: &'a str) -> &'a str {
        if host.trim().is_empty() {
            self.default_host
        } else {
            host.trim()
        }
    }
}

impl ModelProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        self.name
    }

    fn get_models(&self, api_key: &str, host: &str) -> Result<Vec<String>, ProviderError> {
        let api_key = self.require_key(api_key)?;
        let url = endpoint(self.base(host), "v1/models");
        debug!(%url, provider = self.name, "listing models");

        let response = self.client.get(&url).bearer_auth(api_key).send()?;
        let models: ModelsResponse = check_status(self.name, response)?.json()?;
        Ok(models.into_ids())
    }

    fn generate(&self, request: &GenerateRequest<'_>) -> Result<String, ProviderError> {
        let api_key = self.require_key(request.api_key)?;
        let url = endpoint(self.base(request.host), "v1/chat/completions");
        debug!(%url, provider = self.name, model = request.model, "chat completion");

        let body = CompletionRequest {
            model: request.model,
            messages: vec![Message {
                role: "user",
                content: request.prompt,
            }],
            extra: request.json_options(),
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()?;
        let completion: CompletionResponse = check_status(self.name, response)?.json()?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::InvalidResponse {
                provider: self.name.to_string(),
                message: "no completion choices returned".to_string(),
            })
    }
}

// OpenAI API request/response types

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    id: String,
}

impl ModelsResponse {
    fn into_ids(self) -> Vec<String> {
        let mut ids: Vec<String> = self.data.into_iter().map(|m| m.id).collect();
        ids.sort();
        ids
    }
}
