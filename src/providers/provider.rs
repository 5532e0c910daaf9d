//! Model provider trait definition
//!
//! Defines the interface that all model providers must implement.

use super::{GenerateRequest, ProviderError};

/// A backend that can list models and generate text
pub trait ModelProvider: Send + Sync {
    /// Get the name of this provider for display purposes
    fn name(&self) -> &str;

    /// List the model identifiers available with these credentials
    ///
    /// Fails with [`ProviderError::MissingCredentials`] when the key or host
    /// this provider needs is empty.
    fn get_models(&self, api_key: &str, host: &str) -> Result<Vec<String>, ProviderError>;

    /// Generate a completion for a single prompt
    fn generate(&self, request: &GenerateRequest<'_>) -> Result<String, ProviderError>;
}
