//! Schema types for the configuration document
//!
//! Field names follow the on-disk YAML layout (`apiKey`, and `provider` for an
//! agent's provider configuration reference).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::error::ConfigError;

/// Whether a provider is reached through a hosted API or a local model server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Hosted,
    Local,
}

impl ProviderKind {
    /// Kind for a provider identifier, used when a stored entry predates the
    /// explicit `kind` field.
    pub fn for_provider(provider: &str) -> Self {
        match provider.to_lowercase().as_str() {
            "ollama" => Self::Local,
            _ => Self::Hosted,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hosted => "hosted",
            Self::Local => "local",
        }
    }
}

/// A named set of credentials and endpoint for one provider kind
///
/// Missing fields read as empty so one hand-edited entry cannot make the
/// whole file unreadable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "apiKey", default)]
    pub api_key: String,
    #[serde(default)]
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ProviderKind>,
}

impl ProviderConfig {
    /// Create a configuration with its kind fixed at creation time
    pub fn new(provider: impl Into<String>, name: impl Into<String>, kind: ProviderKind) -> Self {
        Self {
            provider: provider.into(),
            name: name.into(),
            api_key: String::new(),
            host: String::new(),
            kind: Some(kind),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Effective kind: the stored tag, or the one implied by `provider`
    pub fn kind(&self) -> ProviderKind {
        self.kind
            .unwrap_or_else(|| ProviderKind::for_provider(&self.provider))
    }

    pub fn is_local(&self) -> bool {
        self.kind() == ProviderKind::Local
    }

    /// The field that identifies a change for this kind: host for local
    /// servers, the API key otherwise.
    pub fn relevant_field(&self) -> &str {
        match self.kind() {
            ProviderKind::Local => &self.host,
            ProviderKind::Hosted => &self.api_key,
        }
    }

    /// API key with everything but the last four characters hidden
    pub fn masked_api_key(&self) -> String {
        let count = self.api_key.chars().count();
        if count == 0 {
            return String::new();
        }
        if count <= 4 {
            return "*".repeat(count);
        }
        let tail: String = self.api_key.chars().skip(count - 4).collect();
        format!("{}{}", "*".repeat(count - 4), tail)
    }
}

/// A named binding of a provider configuration and a model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub model: String,
    #[serde(rename = "provider", alias = "providerConfigName", default)]
    pub provider_config_name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

impl Agent {
    pub fn new(
        name: impl Into<String>,
        model: impl Into<String>,
        provider_config_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            provider_config_name: provider_config_name.into(),
            options: BTreeMap::new(),
        }
    }

    pub fn with_options(mut self, options: BTreeMap<String, String>) -> Self {
        self.options = options;
        self
    }
}

/// The whole configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub agents: Vec<Agent>,
}

impl ConfigDocument {
    pub fn provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.name == name)
    }

    pub fn provider_index(&self, name: &str) -> Option<usize> {
        self.providers.iter().position(|p| p.name == name)
    }

    pub fn agent(&self, name: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.name == name)
    }

    pub fn agent_index(&self, name: &str) -> Option<usize> {
        self.agents.iter().position(|a| a.name == name)
    }

    /// Look up a provider configuration that a command needs to use
    pub fn require_provider(&self, name: &str) -> Result<&ProviderConfig, ConfigError> {
        if self.providers.is_empty() {
            return Err(ConfigError::NotConfigured);
        }
        self.provider(name)
            .ok_or_else(|| ConfigError::UnknownProviderConfig(name.to_string()))
    }

    /// Follow an agent to its provider configuration
    pub fn resolve_agent(&self, name: &str) -> Result<(&Agent, &ProviderConfig), ConfigError> {
        let agent = self
            .agent(name)
            .ok_or_else(|| ConfigError::UnknownAgent(name.to_string()))?;
        let provider = self.require_provider(&agent.provider_config_name)?;
        Ok((agent, provider))
    }
}
