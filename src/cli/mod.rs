use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod list;
pub mod llm;
pub mod setup;
pub mod ui;

pub use list::run_list;
pub use llm::run_llm;
pub use setup::{run_agent_setup, run_provider_setup};

#[derive(Parser)]
#[command(name = "aicraft")]
#[command(about = "Configure AI providers and agents, and prompt them from the command line")]
#[command(version)]
pub struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
    /// Use this configuration file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    pub config_file: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Configure AI providers and agents
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Send a prompt to a model
    Llm(LlmArgs),
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Set up an AI provider
    Provider(ProviderArgs),
    /// Set up an AI agent
    Agent(AgentArgs),
    /// Show configured providers and agents
    List,
}

#[derive(Args, Default)]
pub struct ProviderArgs {
    /// Provider kind (openai, anthropic, google, deepseek, cohere, huggingface, ollama)
    #[arg(short, long)]
    pub provider: Option<String>,
    /// Name for this configuration
    #[arg(short, long)]
    pub name: Option<String>,
    #[arg(short = 'k', long)]
    pub api_key: Option<String>,
    /// Base URL of the provider or local server
    #[arg(long)]
    pub host: Option<String>,
    /// Update an existing configuration with the same name without asking
    #[arg(short, long)]
    pub update: bool,
    /// Don't open the provider's sign-up page
    #[arg(long)]
    pub no_browser: bool,
}

#[derive(Args, Default)]
pub struct AgentArgs {
    /// Provider configuration name
    #[arg(short, long)]
    pub config: Option<String>,
    #[arg(short, long)]
    pub model: Option<String>,
    /// Agent name
    #[arg(short, long)]
    pub name: Option<String>,
    /// Model option as KEY=VALUE (repeatable)
    #[arg(short = 'o', long = "option", value_name = "KEY=VALUE")]
    pub options: Vec<String>,
    /// Overwrite an existing agent with the same name without asking
    #[arg(short, long)]
    pub update: bool,
}

#[derive(Args, Default)]
pub struct LlmArgs {
    /// Agent to send the prompt through
    #[arg(
        short,
        long,
        conflicts_with_all = ["config", "model"],
        required_unless_present = "config"
    )]
    pub agent: Option<String>,
    /// Provider configuration name
    #[arg(short, long, requires = "model")]
    pub config: Option<String>,
    /// Model name
    #[arg(short, long, requires = "config")]
    pub model: Option<String>,
    /// Prompt to send to the model
    #[arg(short = 'q', long)]
    pub prompt: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_provider_flags() {
        let cli = Cli::parse_from([
            "aicraft",
            "config",
            "provider",
            "-p",
            "openai",
            "-n",
            "work",
            "-k",
            "sk-0123456789",
            "--update",
        ]);
        let Commands::Config(ConfigCommands::Provider(args)) = cli.command else {
            panic!("expected config provider");
        };
        assert_eq!(args.provider.as_deref(), Some("openai"));
        assert_eq!(args.name.as_deref(), Some("work"));
        assert!(args.update);
        assert!(!args.no_browser);
    }

    #[test]
    fn test_parse_agent_options() {
        let cli = Cli::parse_from([
            "aicraft",
            "config",
            "agent",
            "-c",
            "work",
            "-o",
            "temperature=0.2",
            "--option",
            "top_p=0.9",
        ]);
        let Commands::Config(ConfigCommands::Agent(args)) = cli.command else {
            panic!("expected config agent");
        };
        assert_eq!(args.options, ["temperature=0.2", "top_p=0.9"]);
    }

    #[test]
    fn test_llm_requires_agent_or_config_and_model() {
        assert!(Cli::try_parse_from(["aicraft", "llm", "-q", "hi"]).is_err());
        assert!(Cli::try_parse_from(["aicraft", "llm", "-c", "work", "-q", "hi"]).is_err());
        assert!(
            Cli::try_parse_from(["aicraft", "llm", "-a", "writer", "-c", "work", "-q", "hi"])
                .is_err()
        );
        assert!(Cli::try_parse_from(["aicraft", "llm", "-a", "writer", "-q", "hi"]).is_ok());
        assert!(
            Cli::try_parse_from(["aicraft", "llm", "-c", "work", "-m", "gpt-4", "-q", "hi"])
                .is_ok()
        );
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from([
            "aicraft",
            "config",
            "list",
            "--config-file",
            "/tmp/a.yaml",
            "-v",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.config_file, Some(PathBuf::from("/tmp/a.yaml")));
    }
}
