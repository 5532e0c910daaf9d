//! Provider registry
//!
//! Maps provider identifiers to clients. Built once at startup from an
//! explicit constructor list and passed to the commands that need it.

use super::{ModelProvider, OllamaProvider, OpenAiCompatibleProvider, ProviderError};
use std::collections::BTreeMap;

pub type ProviderConstructor = fn() -> Result<Box<dyn ModelProvider>, ProviderError>;

/// Clients compiled into the binary
const BUILTIN: &[(&str, ProviderConstructor)] = &[
    ("ollama", OllamaProvider::boxed),
    ("openai", OpenAiCompatibleProvider::openai),
    ("deepseek", OpenAiCompatibleProvider::deepseek),
];

#[derive(Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, Box<dyn ModelProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Result<Self, ProviderError> {
        Self::from_constructors(BUILTIN)
    }

    pub fn from_constructors(
        constructors: &[(&str, ProviderConstructor)],
    ) -> Result<Self, ProviderError> {
        let mut registry = Self::new();
        for (id, construct) in constructors {
            registry.register(*id, construct()?);
        }
        Ok(registry)
    }

    pub fn register(&mut self, id: impl Into<String>, provider: Box<dyn ModelProvider>) {
        self.providers.insert(id.into().to_lowercase(), provider);
    }

    /// Client for a provider identifier
    pub fn get(&self, id: &str) -> Result<&dyn ModelProvider, ProviderError> {
        self.providers
            .get(&id.to_lowercase())
            .map(|p| p.as_ref())
            .ok_or_else(|| ProviderError::UnknownProvider {
                id: id.to_string(),
                supported: self.ids().collect::<Vec<_>>().join(", "),
            })
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }
}
