pub mod cli;
pub mod config;
pub mod logging;
pub mod providers;

pub use config::ConfigStore;
pub use providers::ProviderRegistry;
