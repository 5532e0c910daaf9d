//! Reading and writing the configuration document
//!
//! Besides the current layout, decoding accepts the older layout in which
//! `providers` is a map from provider identifier to its configurations:
//!
//! ```yaml
//! providers:
//!   openai:
//!     - name: work
//!       apiKey: sk-...
//!       host: ""
//! ```
//!
//! Such documents come back converted, with `migrated` set so the caller can
//! write the current layout back once.

use serde::de::Error as _;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use super::types::{Agent, ConfigDocument, ProviderConfig};

/// Result of decoding a configuration file
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub document: ConfigDocument,
    /// True when the input used the legacy layout
    pub migrated: bool,
}

#[derive(Deserialize)]
struct LegacyProviderEntry {
    #[serde(default)]
    name: String,
    #[serde(rename = "apiKey", default)]
    api_key: String,
    #[serde(default)]
    host: String,
}

/// Parse configuration text in either layout
pub fn decode(bytes: &[u8]) -> Result<Decoded, serde_yaml::Error> {
    let root: Value = serde_yaml::from_slice(bytes)?;

    if root.is_null() {
        return Ok(Decoded {
            document: ConfigDocument::default(),
            migrated: false,
        });
    }

    if let Some(Value::Mapping(providers)) = root.get("providers") {
        let document = migrate_legacy(providers, root.get("agents"))?;
        return Ok(Decoded {
            document,
            migrated: true,
        });
    }

    let document: ConfigDocument = serde_yaml::from_value(root)?;
    Ok(Decoded {
        document,
        migrated: false,
    })
}

/// Serialize a document in the current layout
pub fn encode(document: &ConfigDocument) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(document)
}

fn migrate_legacy(
    providers: &Mapping,
    agents: Option<&Value>,
) -> Result<ConfigDocument, serde_yaml::Error> {
    let mut document = ConfigDocument::default();

    for (key, entries) in providers {
        let provider = key
            .as_str()
            .ok_or_else(|| serde_yaml::Error::custom("provider identifiers must be strings"))?;

        // `openai:` with nothing under it parses as null
        if entries.is_null() {
            continue;
        }

        let entries: Vec<LegacyProviderEntry> = serde_yaml::from_value(entries.clone())?;
        for entry in entries {
            document.providers.push(ProviderConfig {
                provider: provider.to_string(),
                name: entry.name,
                api_key: entry.api_key,
                host: entry.host,
                kind: None,
            });
        }
    }

    if let Some(agents) = agents.filter(|v| !v.is_null()) {
        document.agents = serde_yaml::from_value::<Vec<Agent>>(agents.clone())?;
    }

    Ok(document)
}
