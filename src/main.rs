use clap::Parser;
use liveprobe::cli::{load_settings, Cli, Commands};
use liveprobe::error::CliError;
use liveprobe::output;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Exit status for a run stopped by Ctrl-C.
const EXIT_CANCELLED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, finishing in-flight work");
            trigger.cancel();
        }
    });

    match run(cli, cancel).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let cancelled = matches!(
                e.downcast_ref::<CliError>(),
                Some(CliError::Pipeline(p)) if p.is_cancelled()
            );
            output::print_error(&format!("{e:#}"));
            if cancelled {
                ExitCode::from(EXIT_CANCELLED)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

async fn run(cli: Cli, cancel: CancellationToken) -> anyhow::Result<()> {
    let config = cli.config.as_deref();
    match &cli.command {
        Commands::Probe(cmd) => {
            let settings = load_settings(config)?;
            cmd.execute(settings, cli.quiet, cancel).await?;
        }
        Commands::Expand(cmd) => {
            let settings = load_settings(config)?;
            cmd.execute(settings, cancel).await?;
        }
        Commands::Proxies(cmd) => {
            let settings = load_settings(config)?;
            cmd.execute(&settings, cli.quiet)?;
        }
        Commands::Settings(cmd) => cmd.execute(config)?,
    }
    Ok(())
}

/// Logs go to stderr so stdout stays clean for reports and target lists.
fn init_tracing(verbose: bool, quiet: bool) {
    let default = if quiet {
        "error"
    } else if verbose {
        "warn,liveprobe=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
