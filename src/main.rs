use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxalert::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Check the configured rate once and email an alert if warranted
    Run {
        /// Name of the schedule or event that triggered this run
        #[arg(short, long, default_value = "manual")]
        trigger: String,

        /// Log the alert instead of sending it, without touching the store
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fxalert::cli::setup::setup(),
        Some(Commands::Run { trigger, dry_run }) => {
            fxalert::run_command(
                fxalert::AppCommand::Run { trigger, dry_run },
                cli.config_path.as_deref(),
            )
            .await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
