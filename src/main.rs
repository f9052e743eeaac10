use clap::Parser;
use swarmwatch::cli::{check, output, run, CheckCommand, Cli, Commands};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Run(args) => run::execute(args).await,
        Commands::Check(CheckCommand::Config(arg)) => check::execute_config(&arg.config),
    };

    if let Err(e) = result {
        output::status(output::Status::Error, &e);
        std::process::exit(1);
    }
}
