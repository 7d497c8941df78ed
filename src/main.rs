//! claimcheck CLI entry point.

use clap::Parser;
use claimcheck::cli::{self, Cli, Commands, EXIT_ERROR};

fn main() {
    let cli = Cli::parse();
    cli::init_logging(&cli.global);

    let result = match &cli.command {
        Commands::Extract(args) => cli::run_extract(args, &cli.global),
        Commands::Validate(args) => cli::run_validate(args, &cli.global),
        Commands::Init(args) => cli::run_init(args),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
