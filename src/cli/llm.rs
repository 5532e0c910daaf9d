use anyhow::Result;
use tracing::debug;

use super::LlmArgs;
use crate::config::{ConfigDocument, ConfigError, ConfigStore};
use crate::providers::{GenerateRequest, ProviderRegistry};

/// What a prompt is sent through
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    Agent(&'a str),
    Config { name: &'a str, model: &'a str },
}

impl<'a> Target<'a> {
    fn from_args(args: &'a LlmArgs) -> Result<Self, ConfigError> {
        match (args.agent.as_deref(), args.config.as_deref(), args.model.as_deref()) {
            (Some(agent), _, _) => Ok(Target::Agent(agent)),
            (None, Some(name), Some(model)) => Ok(Target::Config { name, model }),
            _ => Err(ConfigError::Validation(
                "Pass --agent, or --config together with --model".into(),
            )),
        }
    }
}

pub fn run_llm(store: &ConfigStore, registry: &ProviderRegistry, args: LlmArgs) -> Result<()> {
    let target = Target::from_args(&args)?;
    let doc = store.load();
    let response = generate(&doc, registry, target, &args.prompt)?;
    println!("{}", response);
    Ok(())
}

/// Send `prompt` to the model behind `target`
pub fn generate(
    doc: &ConfigDocument,
    registry: &ProviderRegistry,
    target: Target<'_>,
    prompt: &str,
) -> Result<String> {
    if prompt.trim().is_empty() {
        return Err(ConfigError::Validation("Prompt cannot be empty".into()).into());
    }
    if doc.providers.is_empty() {
        return Err(ConfigError::NotConfigured.into());
    }

    let (config, model, options) = match target {
        Target::Agent(name) => {
            let (agent, config) = doc.resolve_agent(name)?;
            (config, agent.model.as_str(), Some(&agent.options))
        }
        Target::Config { name, model } => (doc.require_provider(name)?, model, None),
    };

    let client = registry.get(&config.provider)?;
    debug!(provider = %config.provider, config = %config.name, model, "sending prompt");

    let mut request = GenerateRequest::new(model, prompt, config);
    if let Some(options) = options {
        request = request.with_options(options);
    }
    Ok(client.generate(&request)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Agent, ProviderConfig, ProviderKind};
    use crate::providers::{ProviderError, StubProvider};
    use std::collections::BTreeMap;

    fn doc() -> ConfigDocument {
        let mut options = BTreeMap::new();
        options.insert("temperature".to_string(), "0.2".to_string());
        ConfigDocument {
            providers: vec![
                ProviderConfig::new("ollama", "box", ProviderKind::Local)
                    .with_host("http://localhost:11434"),
                ProviderConfig::new("anthropic", "claude", ProviderKind::Hosted)
                    .with_api_key("sk-0123456789"),
            ],
            agents: vec![
                Agent::new("writer", "llama3", "box").with_options(options),
                Agent::new("orphan", "llama3", "gone"),
                Agent::new("poet", "claude-3", "claude"),
            ],
        }
    }

    fn registry() -> ProviderRegistry {
        let mut registry = ProviderRegistry::new();
        registry.register("ollama", Box::new(StubProvider::new(&["llama3"])));
        registry
    }

    #[test]
    fn test_generate_through_agent() {
        let out = generate(&doc(), &registry(), Target::Agent("writer"), "hello").unwrap();
        assert_eq!(out, "llama3 says: hello");
    }

    #[test]
    fn test_generate_through_config_and_model() {
        let target = Target::Config {
            name: "box",
            model: "mistral",
        };
        let out = generate(&doc(), &registry(), target, "hi").unwrap();
        assert_eq!(out, "mistral says: hi");
    }

    #[test]
    fn test_generate_resolution_errors() {
        let doc = doc();
        let registry = registry();

        let err = generate(&doc, &registry, Target::Agent("nobody"), "hi").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::UnknownAgent(_))
        ));

        let err = generate(&doc, &registry, Target::Agent("orphan"), "hi").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::UnknownProviderConfig(name)) if name == "gone"
        ));

        let err = generate(&doc, &registry, Target::Agent("poet"), "hi").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProviderError>(),
            Some(ProviderError::UnknownProvider { id, .. }) if id == "anthropic"
        ));

        let err = generate(&doc, &registry, Target::Agent("writer"), "  ").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_generate_without_providers() {
        let err = generate(
            &ConfigDocument::default(),
            &registry(),
            Target::Agent("writer"),
            "hi",
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::NotConfigured)
        ));
    }
}
