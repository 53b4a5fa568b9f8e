mod commands;
mod logging;
mod progress;
mod report;

use std::process;

use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands, FingerprintArgs, RunArgs};
use dir_reconcile_core::{
    AppConfig, ContentIdentity, HashAlgorithm, OutcomeKind, ReconcileEngine, RunSummary,
    SourceDisposition,
};
use dotenv::dotenv;
use progress::{display_or_empty, CliReporter};
use tracing::{error, info, warn};

/// Exit code when the merge ran but the source folder was left in place.
const EXIT_SOURCE_KEPT: i32 = 2;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let guard = logging::init_logger();

    let config = match dir_reconcile_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            drop(guard);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    let exit_code = match args.command {
        Some(Commands::Run(run_args)) => match run_reconcile(&config, &run_args) {
            Ok(summary) if summary.disposition.is_cleared() => 0,
            Ok(_) => EXIT_SOURCE_KEPT,
            Err(err) => {
                error!("Error: {}", err);
                1
            }
        },
        Some(Commands::Fingerprint(fp_args)) => match run_fingerprint(&config, &fp_args) {
            Ok(()) => 0,
            Err(err) => {
                error!("Error: {}", err);
                1
            }
        },
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
            0
        }
        None => {
            let _ = Cli::command().print_long_help();
            0
        }
    };

    // Flush the file logger before exiting.
    drop(guard);
    if exit_code != 0 {
        process::exit(exit_code);
    }

    Ok(())
}

fn run_reconcile(
    config: &AppConfig,
    args: &RunArgs,
) -> Result<RunSummary, Box<dyn std::error::Error>> {
    let mut options = config.reconcile_options(args.simulate);
    if args.keep_duplicates {
        options.remove_all_duplicates = false;
    }
    if let Some(identity) = args.identity {
        options.identity_policy = identity.into();
    }
    if let Some(algorithm) = args.algorithm {
        options.hash_algorithm = algorithm.into();
    }
    if let Some(block_size) = args.block_size {
        options.block_size = usize::try_from(block_size)?;
    }

    let engine = ReconcileEngine::new(options);
    let reporter = CliReporter::new();
    let summary = engine.reconcile(&args.dst, &args.src, &reporter)?;

    print_summary(&summary);

    if let Some(report_path) = &args.report {
        let rows = report::write_csv(&summary, report_path)?;
        info!("{} rows written to {}", rows, report_path.display());
    }

    Ok(summary)
}

fn print_summary(summary: &RunSummary) {
    println!();
    if summary.simulated {
        info!("{}", "Simulation only, nothing was changed".yellow());
    }
    info!(
        "Moved: {}, removed (in destination): {}, removed (internal): {}, conflicts: {}, duplicates: {}, errors: {} in {}",
        format!("{}", summary.count(OutcomeKind::MovedToDestination)).green(),
        format!("{}", summary.count(OutcomeKind::RemovedAsDestinationDuplicate)).green(),
        format!("{}", summary.count(OutcomeKind::RemovedAsInternalDuplicate)).green(),
        format!("{}", summary.count(OutcomeKind::FlaggedAsConflict)).red(),
        format!("{}", summary.count(OutcomeKind::FlaggedAsUnresolvedDuplicate)).yellow(),
        format!("{}", summary.errors.len()).red(),
        format!("{:.2}s", summary.duration.as_secs_f64()).green(),
    );

    let conflicts: Vec<_> = summary.conflicts().collect();
    if !conflicts.is_empty() {
        warn!("Please resolve these mismatch conflicts:");
        for conflict in conflicts {
            warn!("\t- {}", conflict.display());
        }
    }

    let unresolved: Vec<_> = summary.unresolved_duplicates().collect();
    if !unresolved.is_empty() {
        warn!("Please remove these duplicates:");
        for (duplicate, first_seen) in unresolved {
            warn!("\t- {}->{}", duplicate.display(), first_seen.display());
        }
    }

    let removed = summary.count(OutcomeKind::RemovedAsInternalDuplicate);
    if removed > 0 {
        info!("{} duplicates removed:", removed);
        for outcome in summary
            .outcomes
            .iter()
            .filter(|o| o.kind == OutcomeKind::RemovedAsInternalDuplicate)
        {
            info!(
                "\t- {}->{}",
                outcome.relative_path.display(),
                display_or_empty(outcome.duplicate_of.as_deref())
            );
        }
    }

    for file_error in &summary.errors {
        error!("\t- {}", file_error);
    }

    let source = summary.source.display();
    match &summary.disposition {
        SourceDisposition::Cleared => info!("{} {}", source, "cleared removed".green()),
        SourceDisposition::RemovalFailed { message } => {
            error!("Error: {} could not be removed {}", source, message)
        }
        other => warn!("{} {}", source, other.to_string().yellow()),
    }
}

fn run_fingerprint(
    config: &AppConfig,
    args: &FingerprintArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let algorithm = args
        .algorithm
        .map(HashAlgorithm::from)
        .unwrap_or(config.hash_algorithm);
    let identity = ContentIdentity::new(algorithm, config.block_size);

    for path in &args.paths {
        let fingerprint = identity.fingerprint(path)?;
        println!("{}  {}", fingerprint, path.display());
    }

    Ok(())
}
