//! Provider and agent setup
//!
//! Values given as flags are validated and used as is; anything missing is
//! prompted for. Name conflicts are settled by a [`ConflictResolver`]: the
//! interactive one asks, the flag one follows `--update`.

use anyhow::{anyhow, Result};
use inquire::Select;
use std::collections::BTreeMap;
use tracing::debug;

use super::ui::{self, FormResult};
use super::{AgentArgs, ProviderArgs};
use crate::config::{
    upsert_agent, upsert_provider_config, Agent, AgentResolution, ConfigDocument, ConfigError,
    ConfigStore, ConflictResolver, ProviderConfig, ProviderKind, ProviderResolution,
    UpsertOutcome, Upserted,
};
use crate::providers::{find_provider_info, ProviderInfo, ProviderRegistry, CATALOG};

const UPDATE: &str = "Update";
const OVERWRITE: &str = "Overwrite";
const CHANGE_NAME: &str = "Change name";

// ============================================================================
// Conflict Resolvers
// ============================================================================

/// Asks the user whether to update in place or pick another name
pub struct InteractiveResolver;

impl InteractiveResolver {
    /// Returns true when the user keeps the existing name
    fn keep_name(&self, message: &str, keep: &'static str) -> Result<bool, ConfigError> {
        let choice = Select::new(message, vec![keep, CHANGE_NAME])
            .with_render_config(ui::minimal_render_config())
            .prompt()
            .map_err(ui::prompt_error)?;
        Ok(choice == keep)
    }

    fn new_name(&self, field: &str) -> Result<String, ConfigError> {
        match ui::required_text(field, None) {
            Ok(FormResult::Value(name)) => Ok(name),
            Ok(FormResult::Cancelled) => Err(ConfigError::Cancelled),
            Err(e) => Err(ConfigError::Prompt(e.to_string())),
        }
    }
}

impl ConflictResolver for InteractiveResolver {
    fn resolve_provider(
        &mut self,
        existing: &ProviderConfig,
        candidate: &ProviderConfig,
    ) -> Result<ProviderResolution, ConfigError> {
        let message = provider_conflict_message(existing, candidate);
        if self.keep_name(&message, UPDATE)? {
            Ok(ProviderResolution::Update)
        } else {
            Ok(ProviderResolution::Rename(self.new_name("config name")?))
        }
    }

    fn resolve_agent(
        &mut self,
        existing: &Agent,
        _candidate: &Agent,
    ) -> Result<AgentResolution, ConfigError> {
        let message = format!(
            "The agent {} already exists ({} via {}).",
            existing.name, existing.model, existing.provider_config_name
        );
        if self.keep_name(&message, OVERWRITE)? {
            Ok(AgentResolution::Overwrite)
        } else {
            Ok(AgentResolution::Rename(self.new_name("agent name")?))
        }
    }
}

/// Update in place keeps the existing provider and kind, so say so when the
/// candidate is for a different one
fn provider_conflict_message(existing: &ProviderConfig, candidate: &ProviderConfig) -> String {
    let same_provider = existing.provider.eq_ignore_ascii_case(&candidate.provider)
        && existing.kind() == candidate.kind();
    if same_provider {
        return format!(
            "The config {} for {} already exists with different settings.",
            existing.name, existing.provider
        );
    }
    format!(
        "The config {} already exists for {} ({}), not {} ({}). Updating keeps {}.",
        existing.name,
        existing.provider,
        existing.kind().as_str(),
        candidate.provider,
        candidate.kind().as_str(),
        existing.provider
    )
}

/// Settles conflicts from the `--update` flag alone
pub struct FlagResolver {
    pub update: bool,
}

impl ConflictResolver for FlagResolver {
    fn resolve_provider(
        &mut self,
        existing: &ProviderConfig,
        _candidate: &ProviderConfig,
    ) -> Result<ProviderResolution, ConfigError> {
        if self.update {
            Ok(ProviderResolution::Update)
        } else {
            Err(ConfigError::NameConflict {
                name: existing.name.clone(),
            })
        }
    }

    fn resolve_agent(
        &mut self,
        existing: &Agent,
        _candidate: &Agent,
    ) -> Result<AgentResolution, ConfigError> {
        if self.update {
            Ok(AgentResolution::Overwrite)
        } else {
            Err(ConfigError::NameConflict {
                name: existing.name.clone(),
            })
        }
    }
}

/// Prompt only when the user is already answering prompts
fn resolver_for(update: bool, prompted: bool) -> Box<dyn ConflictResolver> {
    if update || !prompted {
        Box::new(FlagResolver { update })
    } else {
        Box::new(InteractiveResolver)
    }
}

// ============================================================================
// Provider Setup
// ============================================================================

pub fn run_provider_setup(store: &ConfigStore, args: ProviderArgs) -> Result<()> {
    let mut doc = store.load();

    let Some((candidate, prompted)) = provider_candidate(&args)? else {
        ui::status("Cancelled.");
        return Ok(());
    };

    let mut resolver = resolver_for(args.update, prompted);
    save_provider(store, &mut doc, candidate, resolver.as_mut())?;
    Ok(())
}

/// Build a provider configuration from flags and prompts
///
/// Returns `None` when the user cancels, together with whether any prompt
/// was shown otherwise.
fn provider_candidate(args: &ProviderArgs) -> Result<Option<(ProviderConfig, bool)>> {
    let mut prompted = false;

    let info = match args.provider.as_deref() {
        Some(id) => lookup_provider(id)?,
        None => {
            prompted = true;
            match ui::select("Select an AI provider", CATALOG)? {
                FormResult::Value(idx) => &CATALOG[idx],
                FormResult::Cancelled => return Ok(None),
            }
        }
    };

    if prompted && !args.no_browser {
        open_setup_page(info);
    }

    let (api_key, host) = match info.kind {
        ProviderKind::Hosted => {
            let api_key = match args.api_key.as_deref() {
                Some(key) => {
                    ui::check_api_key(key).map_err(ConfigError::Validation)?;
                    key.trim().to_string()
                }
                None => {
                    prompted = true;
                    match ui::api_key_input()? {
                        FormResult::Value(key) => key,
                        FormResult::Cancelled => return Ok(None),
                    }
                }
            };
            let host = match args.host.as_deref() {
                Some(host) => validated_host(host)?,
                None => info.default_host.to_string(),
            };
            (api_key, host)
        }
        ProviderKind::Local => {
            if args.api_key.is_some() {
                ui::warning(&format!(
                    "{} does not use an API key; ignoring --api-key",
                    info.display_name
                ));
            }
            let host = match args.host.as_deref() {
                Some(host) => validated_host(host)?,
                None => {
                    prompted = true;
                    match ui::host_input("host", info.default_host)? {
                        FormResult::Value(host) => host,
                        FormResult::Cancelled => return Ok(None),
                    }
                }
            };
            (String::new(), host)
        }
    };

    let name = match args.name.as_deref() {
        Some(name) => {
            ui::check_name("config name", name).map_err(ConfigError::Validation)?;
            name.trim().to_string()
        }
        None => {
            prompted = true;
            let default = format!("{}-config", info.id);
            match ui::required_text("config name", Some(&default))? {
                FormResult::Value(name) => name,
                FormResult::Cancelled => return Ok(None),
            }
        }
    };

    let candidate = ProviderConfig::new(info.id, name, info.kind)
        .with_api_key(api_key)
        .with_host(host);
    Ok(Some((candidate, prompted)))
}

fn lookup_provider(id: &str) -> Result<&'static ProviderInfo, ConfigError> {
    find_provider_info(id).ok_or_else(|| {
        let known: Vec<&str> = CATALOG.iter().map(|p| p.id).collect();
        ConfigError::Validation(format!(
            "Unknown provider '{}'. Choose one of: {}",
            id,
            known.join(", ")
        ))
    })
}

fn validated_host(host: &str) -> Result<String, ConfigError> {
    ui::check_host(host).map_err(ConfigError::Validation)?;
    Ok(host.trim().to_string())
}

fn open_setup_page(info: &ProviderInfo) {
    let url = info.setup_url();
    if url.is_empty() {
        return;
    }
    ui::status(&format!("Opening {} ...", url));
    if let Err(e) = webbrowser::open(url) {
        ui::warning(&format!("Could not open a browser ({}). Visit {} instead.", e, url));
    }
}

/// Upsert a provider configuration and persist the result
///
/// Returns `None` when the user cancelled during conflict resolution.
pub fn save_provider(
    store: &ConfigStore,
    doc: &mut ConfigDocument,
    candidate: ProviderConfig,
    resolver: &mut dyn ConflictResolver,
) -> Result<Option<Upserted>> {
    let provider = candidate.provider.clone();

    let upserted = match upsert_provider_config(doc, candidate, resolver) {
        Ok(upserted) => upserted,
        Err(ConfigError::Cancelled) => {
            ui::status("Cancelled.");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    if !upserted.outcome.needs_save() {
        ui::status(&format!(
            "The config {} for {} already exists.",
            upserted.name, provider
        ));
        return Ok(Some(upserted));
    }

    store.save(doc)?;

    match &upserted.outcome {
        UpsertOutcome::RenamedAndAdded { requested } => ui::status(&format!(
            "The config name {} was taken; {} was added.",
            requested, upserted.name
        )),
        UpsertOutcome::Updated => {
            ui::status(&format!("The config name {} was updated.", upserted.name))
        }
        _ => ui::status(&format!("The config name {} was added.", upserted.name)),
    }
    Ok(Some(upserted))
}

// ============================================================================
// Agent Setup
// ============================================================================

pub fn run_agent_setup(
    store: &ConfigStore,
    registry: &ProviderRegistry,
    args: AgentArgs,
) -> Result<()> {
    let mut doc = store.load();
    if doc.providers.is_empty() {
        return Err(ConfigError::NotConfigured.into());
    }

    let mut prompted = false;

    let config = match args.config.as_deref() {
        Some(name) => doc.require_provider(name)?.clone(),
        None => {
            prompted = true;
            let labels: Vec<String> = doc
                .providers
                .iter()
                .map(|p| format!("{} {}", p.provider, p.name))
                .collect();
            match ui::select("Select a provider configuration", &labels)? {
                FormResult::Value(idx) => doc.providers[idx].clone(),
                FormResult::Cancelled => {
                    ui::status("Cancelled.");
                    return Ok(());
                }
            }
        }
    };

    let client = registry.get(&config.provider)?;

    let model = match args.model.as_deref() {
        Some(model) => {
            ui::check_name("model", model).map_err(ConfigError::Validation)?;
            model.trim().to_string()
        }
        None => {
            prompted = true;
            debug!(provider = %config.provider, config = %config.name, "fetching models");
            let models = client.get_models(&config.api_key, &config.host)?;
            if models.is_empty() {
                return Err(anyhow!(
                    "{} returned no models for the config {}",
                    client.name(),
                    config.name
                ));
            }
            match ui::select("Select a model", &models)? {
                FormResult::Value(idx) => models[idx].clone(),
                FormResult::Cancelled => {
                    ui::status("Cancelled.");
                    return Ok(());
                }
            }
        }
    };

    let name = match args.name.as_deref() {
        Some(name) => {
            ui::check_name("agent name", name).map_err(ConfigError::Validation)?;
            name.trim().to_string()
        }
        None => {
            prompted = true;
            match ui::required_text("agent name", None)? {
                FormResult::Value(name) => name,
                FormResult::Cancelled => {
                    ui::status("Cancelled.");
                    return Ok(());
                }
            }
        }
    };

    let options = parse_options(&args.options)?;
    let candidate = Agent::new(name, model, config.name).with_options(options);

    let mut resolver = resolver_for(args.update, prompted);
    save_agent(store, &mut doc, candidate, resolver.as_mut())?;
    Ok(())
}

/// Parse repeated `KEY=VALUE` flags
pub fn parse_options(raw: &[String]) -> Result<BTreeMap<String, String>, ConfigError> {
    let mut options = BTreeMap::new();
    for item in raw {
        let (key, value) = item
            .split_once('=')
            .filter(|(key, _)| !key.trim().is_empty())
            .ok_or_else(|| {
                ConfigError::Validation(format!("Invalid option '{}', expected KEY=VALUE", item))
            })?;
        options.insert(key.trim().to_string(), value.trim().to_string());
    }
    Ok(options)
}

/// Upsert an agent and persist the result
///
/// Returns `None` when the user cancelled during conflict resolution.
pub fn save_agent(
    store: &ConfigStore,
    doc: &mut ConfigDocument,
    candidate: Agent,
    resolver: &mut dyn ConflictResolver,
) -> Result<Option<Upserted>> {
    let upserted = match upsert_agent(doc, candidate, resolver) {
        Ok(upserted) => upserted,
        Err(ConfigError::Cancelled) => {
            ui::status("Cancelled.");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    store.save(doc)?;

    let verb = match upserted.outcome {
        UpsertOutcome::Updated => "updated",
        _ => "created",
    };
    ui::status(&format!("The agent {} was {}.", upserted.name, verb));
    Ok(Some(upserted))
}
