use anyhow::Result;

use crate::config::{ConfigDocument, ConfigError, ConfigStore};

pub fn run_list(store: &ConfigStore) -> Result<()> {
    let doc = store.load();
    for line in render_listing(&doc) {
        println!("{}", line);
    }
    Ok(())
}

/// Lines describing every provider configuration and agent, keys masked
pub fn render_listing(doc: &ConfigDocument) -> Vec<String> {
    if doc.providers.is_empty() {
        return vec![ConfigError::NotConfigured.to_string()];
    }

    let mut lines = vec!["Providers:".to_string()];
    for p in &doc.providers {
        let mut line = format!("  {}  {} ({})", p.name, p.provider, p.kind().as_str());
        if !p.host.is_empty() {
            line.push_str(&format!("  {}", p.host));
        }
        if !p.api_key.is_empty() {
            line.push_str(&format!("  key {}", p.masked_api_key()));
        }
        lines.push(line);
    }

    if doc.agents.is_empty() {
        return lines;
    }

    lines.push(String::new());
    lines.push("Agents:".to_string());
    for a in &doc.agents {
        let mut line = format!("  {}  {} via {}", a.name, a.model, a.provider_config_name);
        if doc.provider(&a.provider_config_name).is_none() {
            line.push_str("  (missing config)");
        }
        if !a.options.is_empty() {
            let options: Vec<String> = a
                .options
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            line.push_str(&format!("  [{}]", options.join(", ")));
        }
        lines.push(line);
    }
    lines
}
