//! Adding and updating named entries
//!
//! Names are unique within providers and within agents. When a candidate's
//! name is already taken, a [`ConflictResolver`] decides between updating the
//! existing entry and trying another name. Renames are capped at
//! [`MAX_RENAME_ATTEMPTS`].

use tracing::{debug, info};

use super::error::ConfigError;
use super::types::{Agent, ConfigDocument, ProviderConfig, ProviderKind};

pub const MAX_RENAME_ATTEMPTS: usize = 5;

/// Answer to a provider configuration name conflict
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderResolution {
    /// Overwrite the existing entry's credentials
    Update,
    /// Retry with another name
    Rename(String),
}

/// Answer to an agent name conflict
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentResolution {
    Overwrite,
    Rename(String),
}

/// Decides what happens when a name is already taken
pub trait ConflictResolver {
    fn resolve_provider(
        &mut self,
        existing: &ProviderConfig,
        candidate: &ProviderConfig,
    ) -> Result<ProviderResolution, ConfigError>;

    fn resolve_agent(
        &mut self,
        existing: &Agent,
        candidate: &Agent,
    ) -> Result<AgentResolution, ConfigError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Added,
    /// Added under a new name after the requested one was taken
    RenamedAndAdded { requested: String },
    Updated,
    /// Identical entry already present; nothing to save
    Unchanged,
}

impl UpsertOutcome {
    pub fn needs_save(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Where an upsert ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upserted {
    pub outcome: UpsertOutcome,
    /// Final name of the entry, which differs from the requested one after a rename
    pub name: String,
}

impl Upserted {
    fn new(outcome: UpsertOutcome, name: impl Into<String>) -> Self {
        Self {
            outcome,
            name: name.into(),
        }
    }
}

/// Whether `candidate` carries a change for `existing`, judged only on the
/// field that matters for the candidate's kind.
fn provider_differs(existing: &ProviderConfig, candidate: &ProviderConfig) -> bool {
    let current = match candidate.kind() {
        ProviderKind::Local => &existing.host,
        ProviderKind::Hosted => &existing.api_key,
    };
    current != candidate.relevant_field()
}

fn next_name(name: String, renames: &mut usize) -> Result<String, ConfigError> {
    if *renames >= MAX_RENAME_ATTEMPTS {
        return Err(ConfigError::RenameLimitExceeded {
            attempts: MAX_RENAME_ATTEMPTS,
        });
    }
    *renames += 1;

    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(ConfigError::Validation("Name cannot be empty".into()));
    }
    Ok(name)
}

/// Insert or update a provider configuration by name
///
/// The document is only modified once a terminal state is reached, so an
/// error leaves it as it was.
pub fn upsert_provider_config(
    doc: &mut ConfigDocument,
    mut candidate: ProviderConfig,
    resolver: &mut dyn ConflictResolver,
) -> Result<Upserted, ConfigError> {
    let requested = candidate.name.clone();
    let mut renames = 0;

    loop {
        let Some(index) = doc.provider_index(&candidate.name) else {
            info!(name = %candidate.name, provider = %candidate.provider, "provider config added");
            let name = candidate.name.clone();
            doc.providers.push(candidate);
            let outcome = if renames == 0 {
                UpsertOutcome::Added
            } else {
                UpsertOutcome::RenamedAndAdded { requested }
            };
            return Ok(Upserted::new(outcome, name));
        };

        let existing = &doc.providers[index];
        if !provider_differs(existing, &candidate) {
            debug!(name = %candidate.name, "provider config unchanged");
            return Ok(Upserted::new(UpsertOutcome::Unchanged, candidate.name));
        }

        match resolver.resolve_provider(existing, &candidate)? {
            ProviderResolution::Update => {
                let entry = &mut doc.providers[index];
                entry.api_key = candidate.api_key;
                entry.host = candidate.host;
                entry.name = candidate.name;
                info!(name = %entry.name, "provider config updated");
                return Ok(Upserted::new(UpsertOutcome::Updated, entry.name.clone()));
            }
            ProviderResolution::Rename(name) => {
                candidate.name = next_name(name, &mut renames)?;
                debug!(name = %candidate.name, attempt = renames, "retrying under new name");
            }
        }
    }
}

/// Insert or overwrite an agent by name
///
/// Any name match goes to the resolver; there is no equality short-circuit.
/// The referenced provider configuration is not checked here.
pub fn upsert_agent(
    doc: &mut ConfigDocument,
    mut candidate: Agent,
    resolver: &mut dyn ConflictResolver,
) -> Result<Upserted, ConfigError> {
    let requested = candidate.name.clone();
    let mut renames = 0;

    loop {
        let Some(index) = doc.agent_index(&candidate.name) else {
            info!(name = %candidate.name, model = %candidate.model, "agent added");
            let name = candidate.name.clone();
            doc.agents.push(candidate);
            let outcome = if renames == 0 {
                UpsertOutcome::Added
            } else {
                UpsertOutcome::RenamedAndAdded { requested }
            };
            return Ok(Upserted::new(outcome, name));
        };

        match resolver.resolve_agent(&doc.agents[index], &candidate)? {
            AgentResolution::Overwrite => {
                let entry = &mut doc.agents[index];
                entry.model = candidate.model;
                entry.provider_config_name = candidate.provider_config_name;
                if !candidate.options.is_empty() {
                    entry.options = candidate.options;
                }
                info!(name = %entry.name, "agent updated");
                return Ok(Upserted::new(UpsertOutcome::Updated, entry.name.clone()));
            }
            AgentResolution::Rename(name) => {
                candidate.name = next_name(name, &mut renames)?;
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Replays canned answers; runs out as `Cancelled`
    #[derive(Default)]
    pub(crate) struct ScriptedResolver {
        pub provider: VecDeque<ProviderResolution>,
        pub agent: VecDeque<AgentResolution>,
        pub asked: usize,
    }

    impl ScriptedResolver {
        pub fn providers(answers: impl IntoIterator<Item = ProviderResolution>) -> Self {
            Self {
                provider: answers.into_iter().collect(),
                ..Default::default()
            }
        }

        pub fn agents(answers: impl IntoIterator<Item = AgentResolution>) -> Self {
            Self {
                agent: answers.into_iter().collect(),
                ..Default::default()
            }
        }
    }

    impl ConflictResolver for ScriptedResolver {
        fn resolve_provider(
            &mut self,
            _existing: &ProviderConfig,
            _candidate: &ProviderConfig,
        ) -> Result<ProviderResolution, ConfigError> {
            self.asked += 1;
            self.provider.pop_front().ok_or(ConfigError::Cancelled)
        }

        fn resolve_agent(
            &mut self,
            _existing: &Agent,
            _candidate: &Agent,
        ) -> Result<AgentResolution, ConfigError> {
            self.asked += 1;
            self.agent.pop_front().ok_or(ConfigError::Cancelled)
        }
    }

    fn hosted(name: &str, key: &str) -> ProviderConfig {
        ProviderConfig::new("openai", name, ProviderKind::Hosted)
            .with_api_key(key)
            .with_host("https://api.openai.com")
    }

    fn local(name: &str, host: &str) -> ProviderConfig {
        ProviderConfig::new("ollama", name, ProviderKind::Local).with_host(host)
    }

    #[test]
    fn test_add_to_empty_document() {
        let mut doc = ConfigDocument::default();
        let mut resolver = ScriptedResolver::default();

        let outcome =
            upsert_provider_config(&mut doc, hosted("o1", "key-0000000001"), &mut resolver)
                .unwrap()
                .outcome;

        assert_eq!(outcome, UpsertOutcome::Added);
        assert_eq!(doc.providers, vec![hosted("o1", "key-0000000001")]);
        assert_eq!(resolver.asked, 0);
    }

    #[test]
    fn test_identical_candidate_is_unchanged() {
        let mut doc = ConfigDocument::default();
        let mut resolver = ScriptedResolver::default();

        upsert_provider_config(&mut doc, hosted("o1", "key-0000000001"), &mut resolver).unwrap();
        let before = doc.clone();
        let outcome =
            upsert_provider_config(&mut doc, hosted("o1", "key-0000000001"), &mut resolver)
                .unwrap()
                .outcome;

        assert_eq!(outcome, UpsertOutcome::Unchanged);
        assert!(!outcome.needs_save());
        assert_eq!(doc, before);
        assert_eq!(resolver.asked, 0);
    }

    #[test]
    fn test_hosted_ignores_host_difference() {
        let mut doc = ConfigDocument {
            providers: vec![hosted("o1", "key-0000000001")],
            agents: vec![],
        };
        let candidate = hosted("o1", "key-0000000001").with_host("https://proxy.example");
        let mut resolver = ScriptedResolver::default();

        let outcome = upsert_provider_config(&mut doc, candidate, &mut resolver).unwrap().outcome;
        assert_eq!(outcome, UpsertOutcome::Unchanged);
    }

    #[test]
    fn test_local_compares_host_only() {
        let mut doc = ConfigDocument {
            providers: vec![local("box", "http://localhost:11434")],
            agents: vec![],
        };
        let mut resolver = ScriptedResolver::providers([ProviderResolution::Update]);

        let same = local("box", "http://localhost:11434").with_api_key("ignored-for-local");
        assert_eq!(
            upsert_provider_config(&mut doc, same, &mut resolver).unwrap().outcome,
            UpsertOutcome::Unchanged
        );

        let moved = local("box", "http://10.0.0.5:11434");
        assert_eq!(
            upsert_provider_config(&mut doc, moved, &mut resolver).unwrap().outcome,
            UpsertOutcome::Updated
        );
        assert_eq!(doc.providers[0].host, "http://10.0.0.5:11434");
    }

    #[test]
    fn test_update_replaces_only_matching_entry() {
        let mut doc = ConfigDocument {
            providers: vec![
                local("first", "http://localhost:11434"),
                hosted("o1", "key-0000000001"),
                hosted("last", "key-0000000009"),
            ],
            agents: vec![],
        };
        let mut resolver = ScriptedResolver::providers([ProviderResolution::Update]);

        let outcome =
            upsert_provider_config(&mut doc, hosted("o1", "key-changed-02"), &mut resolver)
                .unwrap()
                .outcome;

        assert_eq!(outcome, UpsertOutcome::Updated);
        assert_eq!(resolver.asked, 1);
        assert_eq!(doc.providers.len(), 3);
        assert_eq!(doc.providers[0], local("first", "http://localhost:11434"));
        assert_eq!(doc.providers[1].api_key, "key-changed-02");
        assert_eq!(doc.providers[1].name, "o1");
        assert_eq!(doc.providers[2], hosted("last", "key-0000000009"));
    }

    #[test]
    fn test_rename_adds_under_new_name() {
        let mut doc = ConfigDocument {
            providers: vec![hosted("o1", "key-0000000001")],
            agents: vec![],
        };
        let mut resolver = ScriptedResolver::providers([ProviderResolution::Rename("o2".into())]);

        let outcome =
            upsert_provider_config(&mut doc, hosted("o1", "key-0000000002"), &mut resolver)
                .unwrap()
                .outcome;

        assert_eq!(
            outcome,
            UpsertOutcome::RenamedAndAdded {
                requested: "o1".into()
            }
        );
        assert_eq!(doc.providers.len(), 2);
        assert_eq!(doc.providers[0].api_key, "key-0000000001");
        assert_eq!(doc.providers[1].name, "o2");
        assert_eq!(doc.providers[1].api_key, "key-0000000002");
    }

    #[test]
    fn test_rename_onto_another_taken_name_asks_again() {
        let mut doc = ConfigDocument {
            providers: vec![hosted("o1", "key-0000000001"), hosted("o2", "key-0000000002")],
            agents: vec![],
        };
        let mut resolver = ScriptedResolver::providers([
            ProviderResolution::Rename("o2".into()),
            ProviderResolution::Rename("o3".into()),
        ]);

        let outcome =
            upsert_provider_config(&mut doc, hosted("o1", "key-0000000003"), &mut resolver)
                .unwrap()
                .outcome;

        assert!(matches!(outcome, UpsertOutcome::RenamedAndAdded { .. }));
        assert_eq!(resolver.asked, 2);
        assert_eq!(doc.providers[2].name, "o3");
    }

    #[test]
    fn test_rename_is_bounded() {
        let mut doc = ConfigDocument {
            providers: vec![hosted("o1", "key-0000000001")],
            agents: vec![],
        };
        let answers = std::iter::repeat(ProviderResolution::Rename("o1".into()))
            .take(MAX_RENAME_ATTEMPTS + 3);
        let mut resolver = ScriptedResolver::providers(answers);
        let before = doc.clone();

        let err =
            upsert_provider_config(&mut doc, hosted("o1", "key-0000000002"), &mut resolver)
                .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::RenameLimitExceeded { attempts } if attempts == MAX_RENAME_ATTEMPTS
        ));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_rename_to_empty_name_rejected() {
        let mut doc = ConfigDocument {
            providers: vec![hosted("o1", "key-0000000001")],
            agents: vec![],
        };
        let mut resolver = ScriptedResolver::providers([ProviderResolution::Rename("  ".into())]);

        let err =
            upsert_provider_config(&mut doc, hosted("o1", "key-0000000002"), &mut resolver)
                .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_cancelled_resolution_leaves_document() {
        let mut doc = ConfigDocument {
            providers: vec![hosted("o1", "key-0000000001")],
            agents: vec![],
        };
        let before = doc.clone();
        let mut resolver = ScriptedResolver::default();

        let err =
            upsert_provider_config(&mut doc, hosted("o1", "key-0000000002"), &mut resolver)
                .unwrap_err();
        assert!(matches!(err, ConfigError::Cancelled));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_agent_added_without_provider_check() {
        let mut doc = ConfigDocument::default();
        let mut resolver = ScriptedResolver::default();

        let outcome =
            upsert_agent(&mut doc, Agent::new("writer", "gpt-4", "does-not-exist"), &mut resolver)
                .unwrap()
                .outcome;

        assert_eq!(outcome, UpsertOutcome::Added);
        assert_eq!(doc.agents[0].provider_config_name, "does-not-exist");
    }

    #[test]
    fn test_agent_match_always_asks() {
        let mut doc = ConfigDocument {
            providers: vec![],
            agents: vec![Agent::new("writer", "gpt-4", "o1")],
        };
        let mut resolver = ScriptedResolver::agents([AgentResolution::Overwrite]);

        let outcome =
            upsert_agent(&mut doc, Agent::new("writer", "gpt-4", "o1"), &mut resolver)
                .unwrap()
                .outcome;

        assert_eq!(outcome, UpsertOutcome::Updated);
        assert_eq!(resolver.asked, 1);
    }

    #[test]
    fn test_agent_overwrite_keeps_options_unless_given() {
        let mut options = std::collections::BTreeMap::new();
        options.insert("temperature".to_string(), "0.1".to_string());
        let mut doc = ConfigDocument {
            providers: vec![],
            agents: vec![
                Agent::new("writer", "gpt-4", "o1").with_options(options.clone()),
                Agent::new("coder", "llama3", "box"),
            ],
        };
        let mut resolver = ScriptedResolver::agents([AgentResolution::Overwrite]);

        upsert_agent(&mut doc, Agent::new("writer", "gpt-4o", "o2"), &mut resolver).unwrap();

        assert_eq!(doc.agents[0].model, "gpt-4o");
        assert_eq!(doc.agents[0].provider_config_name, "o2");
        assert_eq!(doc.agents[0].options, options);
        assert_eq!(doc.agents[1], Agent::new("coder", "llama3", "box"));
    }

    #[test]
    fn test_agent_rename() {
        let mut doc = ConfigDocument {
            providers: vec![],
            agents: vec![Agent::new("writer", "gpt-4", "o1")],
        };
        let mut resolver = ScriptedResolver::agents([AgentResolution::Rename("editor".into())]);

        let outcome =
            upsert_agent(&mut doc, Agent::new("writer", "llama3", "box"), &mut resolver)
                .unwrap()
                .outcome;

        assert_eq!(
            outcome,
            UpsertOutcome::RenamedAndAdded {
                requested: "writer".into()
            }
        );
        assert_eq!(doc.agents.len(), 2);
        assert_eq!(doc.agents[0].model, "gpt-4");
        assert_eq!(doc.agents[1].name, "editor");
    }
}
