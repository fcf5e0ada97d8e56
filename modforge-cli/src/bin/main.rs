use clap::Parser;
use dotenvy::dotenv;
use modforge_cli::{Cli, Commands, handle_error, run_config_command, run_generate_command};

fn main() {
    dotenv().ok();

    let cli = Cli::parse();
    let verbose = cli.verbose;

    match cli.command {
        Commands::Generate { command } => {
            run_generate_command(command, verbose).unwrap_or_else(handle_error)
        }
        Commands::Config { command } => run_config_command(command).unwrap_or_else(handle_error),
    }
}
