use crate::commands::{
    run_batch, run_enrich, run_qualify, run_validate, BatchArgs, EnrichArgs, QualifyArgs,
    ValidateArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use lead_research::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Lead Research Assistant",
    about = "Qualify, plan enrichment for, and batch-score B2B leads against an ICP",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score every lead in a CSV file and write a JSON batch report
    Batch(BatchArgs),
    /// Print a data-quality report for a CSV lead file without scoring it
    Validate(ValidateArgs),
    /// Score a single company signal record against the ICP
    Qualify(QualifyArgs),
    /// Build an enrichment plan for a single lead
    Enrich(EnrichArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Batch(args) => run_batch(args).await,
        Command::Validate(args) => run_validate(args),
        Command::Qualify(args) => run_qualify(args),
        Command::Enrich(args) => run_enrich(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_arguments_parse() {
        let cli = Cli::try_parse_from([
            "lead-research-api",
            "batch",
            "--input",
            "leads.csv",
            "--output",
            "report.json",
            "--parallel",
            "5",
            "--progress-file",
            "progress.json",
            "--resume",
        ])
        .expect("arguments parse");

        match cli.command {
            Some(Command::Batch(args)) => {
                assert_eq!(args.parallel, Some(5));
                assert!(args.resume);
                assert!(!args.validate_only);
            }
            other => panic!("expected batch command, got {other:?}"),
        }
    }

    #[test]
    fn parallel_outside_pool_bounds_is_rejected() {
        let result = Cli::try_parse_from([
            "lead-research-api",
            "batch",
            "--input",
            "leads.csv",
            "--output",
            "report.json",
            "--parallel",
            "11",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["lead-research-api"]).expect("arguments parse");
        assert!(cli.command.is_none());
    }
}
