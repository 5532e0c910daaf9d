//! Shared prompt primitives for aicraft
//!
//! Conventions:
//! - Prompts: lowercase with colon and space: `name: `
//! - Feedback: one short sentence: `The agent writer was created.`
//! - Escape or Ctrl-C at any prompt cancels the whole flow

use anyhow::Result;
use inquire::{
    ui::RenderConfig, validator::Validation, InquireError, Password, PasswordDisplayMode, Select,
    Text,
};

use crate::config::ConfigError;

/// Minimum accepted API key length
pub const MIN_API_KEY_LEN: usize = 10;

const PAGE_SIZE: usize = 10;

// ============================================================================
// Form Input Helpers
// ============================================================================

/// Result type for form inputs that can be cancelled
pub enum FormResult<T> {
    Value(T),
    Cancelled,
}

impl<T> FormResult<T> {
    fn from_prompt(result: Result<T, InquireError>) -> Result<Self> {
        match result {
            Ok(value) => Ok(FormResult::Value(value)),
            Err(InquireError::OperationCanceled) | Err(InquireError::OperationInterrupted) => {
                Ok(FormResult::Cancelled)
            }
            Err(e) => Err(e.into()),
        }
    }
}

pub fn minimal_render_config() -> RenderConfig<'static> {
    RenderConfig::default_colored()
        .with_prompt_prefix(inquire::ui::Styled::new(""))
        .with_answered_prompt_prefix(inquire::ui::Styled::new(""))
}

/// Display a selection menu and return the chosen index
pub fn select<T: ToString>(prompt: &str, options: &[T]) -> Result<FormResult<usize>> {
    if options.is_empty() {
        return Ok(FormResult::Cancelled);
    }

    let items: Vec<String> = options.iter().map(|o| o.to_string()).collect();

    let result = Select::new(prompt, items.clone())
        .with_render_config(minimal_render_config())
        .with_page_size(PAGE_SIZE.min(items.len()))
        .with_vim_mode(true)
        .prompt();

    Ok(match FormResult::from_prompt(result)? {
        FormResult::Value(selected) => {
            // Find the index of the selected item
            let idx = items.iter().position(|i| *i == selected).unwrap_or(0);
            FormResult::Value(idx)
        }
        FormResult::Cancelled => FormResult::Cancelled,
    })
}

/// Prompt for a non-empty value with an optional default
pub fn required_text(field: &str, default: Option<&str>) -> Result<FormResult<String>> {
    let prompt = format!("{}: ", field);
    let label = field.to_string();

    let mut builder = Text::new(&prompt)
        .with_render_config(minimal_render_config())
        .with_validator(move |input: &str| {
            Ok(match check_name(&label, input) {
                Ok(()) => Validation::Valid,
                Err(msg) => Validation::Invalid(msg.into()),
            })
        });

    if let Some(d) = default.filter(|d| !d.is_empty()) {
        builder = builder.with_default(d);
    }

    Ok(match FormResult::from_prompt(builder.prompt())? {
        FormResult::Value(v) => FormResult::Value(v.trim().to_string()),
        FormResult::Cancelled => FormResult::Cancelled,
    })
}

/// Prompt for a host URL
pub fn host_input(field: &str, default: &str) -> Result<FormResult<String>> {
    let prompt = format!("{}: ", field);

    let result = Text::new(&prompt)
        .with_render_config(minimal_render_config())
        .with_default(default)
        .with_validator(|input: &str| {
            Ok(match check_host(input) {
                Ok(()) => Validation::Valid,
                Err(msg) => Validation::Invalid(msg.into()),
            })
        })
        .prompt();

    Ok(match FormResult::from_prompt(result)? {
        FormResult::Value(v) => FormResult::Value(v.trim().to_string()),
        FormResult::Cancelled => FormResult::Cancelled,
    })
}

/// Prompt for an API key without echoing it
pub fn api_key_input() -> Result<FormResult<String>> {
    let result = Password::new("api key: ")
        .with_render_config(minimal_render_config())
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_validator(|input: &str| {
            Ok(match check_api_key(input) {
                Ok(()) => Validation::Valid,
                Err(msg) => Validation::Invalid(msg.into()),
            })
        })
        .prompt();

    Ok(match FormResult::from_prompt(result)? {
        FormResult::Value(v) => FormResult::Value(v.trim().to_string()),
        FormResult::Cancelled => FormResult::Cancelled,
    })
}

/// Map a prompt failure inside a config operation
pub fn prompt_error(e: InquireError) -> ConfigError {
    match e {
        InquireError::OperationCanceled | InquireError::OperationInterrupted => {
            ConfigError::Cancelled
        }
        other => ConfigError::Prompt(other.to_string()),
    }
}

// ============================================================================
// Validation
// ============================================================================

pub fn check_api_key(key: &str) -> Result<(), String> {
    if key.trim().chars().count() < MIN_API_KEY_LEN {
        return Err(format!(
            "API key must have at least {} characters",
            MIN_API_KEY_LEN
        ));
    }
    Ok(())
}

pub fn check_name(field: &str, name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err(format!("{} cannot be empty", field));
    }
    Ok(())
}

pub fn check_host(host: &str) -> Result<(), String> {
    match url::Url::parse(host.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(()),
        Ok(_) => Err("host must be an http:// or https:// URL".to_string()),
        Err(e) => Err(format!("invalid host URL: {}", e)),
    }
}

// ============================================================================
// Message Functions
// ============================================================================

/// Print a status message to stdout
#[inline]
pub fn status(msg: &str) {
    println!("{}", msg);
}

/// Print a warning message to stderr
#[inline]
pub fn warning(msg: &str) {
    eprintln!("Warning: {}", msg);
}
