//! Provider kinds offered during setup

use crate::config::ProviderKind;
use std::fmt;

/// Static description of a provider kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderInfo {
    /// Identifier stored in `ProviderConfig::provider`
    pub id: &'static str,
    pub display_name: &'static str,
    pub signup_url: &'static str,
    /// Where API keys are created; empty for local servers
    pub api_key_url: &'static str,
    pub default_host: &'static str,
    pub kind: ProviderKind,
}

impl ProviderInfo {
    /// Page to open in the browser when setting this provider up
    pub fn setup_url(&self) -> &'static str {
        if self.api_key_url.is_empty() {
            self.signup_url
        } else {
            self.api_key_url
        }
    }
}

impl fmt::Display for ProviderInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name, self.signup_url)
    }
}

pub const CATALOG: &[ProviderInfo] = &[
    ProviderInfo {
        id: "openai",
        display_name: "OpenAI",
        signup_url: "https://platform.openai.com/signup",
        api_key_url: "https://platform.openai.com/api-keys",
        default_host: "https://api.openai.com",
        kind: ProviderKind::Hosted,
    },
    ProviderInfo {
        id: "anthropic",
        display_name: "Anthropic",
        signup_url: "https://www.anthropic.com/signup",
        api_key_url: "https://console.anthropic.com/settings/keys",
        default_host: "https://api.anthropic.com",
        kind: ProviderKind::Hosted,
    },
    ProviderInfo {
        id: "google",
        display_name: "Google",
        signup_url: "https://cloud.google.com/",
        api_key_url: "https://console.cloud.google.com/apis/credentials",
        default_host: "https://generativelanguage.googleapis.com",
        kind: ProviderKind::Hosted,
    },
    ProviderInfo {
        id: "deepseek",
        display_name: "DeepSeek",
        signup_url: "https://platform.deepseek.com/signup",
        api_key_url: "https://platform.deepseek.com/api-keys",
        default_host: "https://api.deepseek.com",
        kind: ProviderKind::Hosted,
    },
    ProviderInfo {
        id: "cohere",
        display_name: "Cohere",
        signup_url: "https://dashboard.cohere.com/signup",
        api_key_url: "https://dashboard.cohere.com/api-keys",
        default_host: "https://api.cohere.com",
        kind: ProviderKind::Hosted,
    },
    ProviderInfo {
        id: "huggingface",
        display_name: "Hugging Face",
        signup_url: "https://huggingface.co/join",
        api_key_url: "https://huggingface.co/settings/tokens",
        default_host: "https://api-inference.huggingface.co",
        kind: ProviderKind::Hosted,
    },
    ProviderInfo {
        id: "ollama",
        display_name: "Ollama (local)",
        signup_url: "https://github.com/ollama/ollama",
        api_key_url: "",
        default_host: "http://localhost:11434",
        kind: ProviderKind::Local,
    },
];

pub fn find_provider_info(id: &str) -> Option<&'static ProviderInfo> {
    CATALOG.iter().find(|p| p.id.eq_ignore_ascii_case(id))
}
