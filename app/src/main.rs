use std::process::ExitCode;

use assetbridge_app::{AppError, Cli, Command, commands};
use assetbridge_core::{ImportStatus, MaterializeReport};
use clap::Parser;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Materialize { dirs, policy } => {
            let report =
                commands::materialize(&config, &dirs.bundle, &dirs.dest, policy.map(Into::into));
            print_report(&report);
        }
        Command::Import {
            dirs,
            purpose,
            cancel,
            file,
        } => {
            let run = commands::import(
                &config,
                &dirs.bundle,
                &dirs.dest,
                purpose.into(),
                &file,
                cancel,
            )?;
            print_report(&run.report);
            println!("ui state:    {}", run.ui_state_path.display());
            match run.status {
                ImportStatus::Cancelled => println!("import:      cancelled"),
                ImportStatus::Delivered(lease) => println!("import:      delivered {lease}"),
            }
            for delivery in &run.deliveries {
                println!(
                    "  {} <- {} bytes, extension {:?}",
                    delivery.purpose, delivery.len, delivery.extension
                );
            }
        }
    }
    Ok(())
}

fn print_report(report: &MaterializeReport) {
    println!("directories: {} created", report.directories_created);
    println!(
        "files:       {} copied ({} bytes), {} preserved",
        report.files_copied, report.bytes_copied, report.files_preserved
    );
    for failure in &report.failures {
        println!("  skipped {} ({}): {}", failure.path, failure.kind, failure.message);
    }
}
