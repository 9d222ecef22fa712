//! gcsafe CLI entry point

use clap::Parser;
use gcsafe::cli::check::CheckOptions;
use gcsafe::cli::common::{EXIT_ERROR, EXIT_SUCCESS};
use gcsafe::cli::init::InitOutcome;
use gcsafe::cli::{Command, args::Cli};
use std::process;
use tracing_subscriber::EnvFilter;

/// Log to stderr; `RUST_LOG` wins over `-v`
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "gcsafe=warn",
        1 => "gcsafe=debug",
        _ => "gcsafe=trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.config.as_deref();
    let exit_code = match cli.command {
        Command::Init { force } => match gcsafe::cli::init::run_init(force) {
            Ok(InitOutcome::Created) => {
                println!("Created gcsafe.toml.");
                EXIT_SUCCESS
            }
            Ok(InitOutcome::Overwritten) => {
                println!("Overwrote gcsafe.toml.");
                EXIT_SUCCESS
            }
            Ok(InitOutcome::Skipped) => {
                println!("gcsafe.toml already exists; use --force to overwrite.");
                EXIT_SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                EXIT_ERROR
            }
        },
        Command::Check {
            paths,
            format,
            warnings_as_errors,
            enable_members_on_stack_check,
            exclude,
        } => gcsafe::cli::check::run_check(&CheckOptions {
            paths,
            format,
            color: cli.color,
            config: cli.config.clone(),
            warnings_as_errors,
            enable_members_on_stack_check,
            exclude,
        }),
        Command::Classify { paths, format } => {
            gcsafe::cli::classify::run_classify(&paths, format, config)
        }
        Command::ApplyEdits { build_dir, filters } => {
            gcsafe::cli::apply_edits::run_apply_edits(&build_dir, &filters, config)
        }
    };

    process::exit(exit_code);
}
