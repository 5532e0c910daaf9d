use aicraft::cli::{
    run_agent_setup, run_list, run_llm, run_provider_setup, Cli, Commands, ConfigCommands,
};
use aicraft::logging::init_logging;
use aicraft::{ConfigStore, ProviderRegistry};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let store = match cli.config_file {
        Some(path) => ConfigStore::open_at(path),
        None => ConfigStore::open()?,
    };
    tracing::debug!(path = %store.path().display(), "using config file");

    match cli.command {
        Commands::Config(ConfigCommands::Provider(args)) => {
            run_provider_setup(&store, args)?;
        }
        Commands::Config(ConfigCommands::Agent(args)) => {
            let registry = ProviderRegistry::builtin()?;
            run_agent_setup(&store, &registry, args)?;
        }
        Commands::Config(ConfigCommands::List) => {
            run_list(&store)?;
        }
        Commands::Llm(args) => {
            let registry = ProviderRegistry::builtin()?;
            run_llm(&store, &registry, args)?;
        }
    }

    Ok(())
}
