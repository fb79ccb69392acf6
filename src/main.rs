use anyhow::Result;
use clap::Parser;
use leadmap::cli::{Cli, Commands};
use leadmap::commands::{analyze, init, validate};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze {
            session,
            format,
            output,
            config,
            rules,
            resume,
            save_snapshot,
        } => analyze::analyze_session(analyze::AnalyzeConfig {
            session,
            format,
            output,
            config,
            rules,
            resume,
            save_snapshot,
        }),
        Commands::Init { force } => init::init_config(force),
        Commands::Validate { rules, config } => {
            validate::validate_setup(validate::ValidateConfig { rules, config })
        }
    }
}
