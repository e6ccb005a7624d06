use anyhow::Context;
use clap::Parser;
use hush_config::HushConfig;
use hush_reconcile::{Reconciler, RetryPolicy};

mod bootstrap;
mod cli;
mod logging;
mod output;

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(error) => {
            eprintln!("hush error: {error:#}");
            std::process::exit(output::EXIT_FAILURE);
        }
    }
}

fn run() -> anyhow::Result<i32> {
    let cli = cli::Cli::parse();
    let flags = cli.global_flags();

    let Some(action) = cli.action() else {
        eprintln!("{}", cli::USAGE_HINT);
        return Ok(output::EXIT_USAGE);
    };

    let config = HushConfig::load().context("failed to load configuration")?;
    let session = logging::LogSession::init(&config.log, &flags)?;
    if let Some(path) = session.file() {
        tracing::debug!(path = %path.display(), "logging to file");
    }

    let machine = bootstrap::Machine::from_config(&config)?;
    let reconciler = Reconciler::new(machine.ports(), RetryPolicy::from_config(&config.exec));

    let result = hush_reconcile::run(action, &reconciler).context("invalid built-in plan")?;
    output::output(&result, flags.format)?;

    let code = output::exit_code(&result);
    drop(session);
    Ok(code)
}
