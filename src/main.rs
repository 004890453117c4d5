use clap::Parser;
use dirs::config_dir;
use env_logger::Builder;
use evebuild::cli::Cli;
use evebuild::result::exit_code;
use log::LevelFilter;
use std::fs::OpenOptions;
use std::path::PathBuf;

/** Main entry point for evebuild
 *
 * # Process Flow
 * 1. Initialize logging with file output
 * 2. Parse command line arguments using Clap
 * 3. Run the configure/build/test pipeline
 * 4. Map the outcome to an exit code
 *
 * # Exit Codes
 * - 0 when every step succeeded
 * - 1 on the first failing step or any other error
 * - Clap's own code for usage errors
 */
#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_logging();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(e.exit_code());
        }
    };

    let result = cli.execute().await;
    if let Err(e) = &result {
        // Step failures have already been reported with their command line.
        if !e.is_step_failure() {
            eprintln!("Error: {}", e);
        }
        log::error!("evebuild failed: {}", e);
    }
    std::process::exit(exit_code(&result));
}

/** Initializes logging into the platform config directory
 *
 * - Log file: `<config dir>/evebuild/evebuild.log`, appended to
 * - Level: Info unless `RUST_LOG` says otherwise
 * - Falls back to stderr when the file cannot be opened
 */
fn init_logging() {
    let log_file = get_log_file_path();

    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent).ok();
    }

    let mut builder = Builder::new();

    match OpenOptions::new().create(true).append(true).open(&log_file) {
        Ok(file) => {
            builder
                .filter_level(LevelFilter::Info)
                .target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(_) => {
            // Keep the terminal clean when only stderr is available.
            builder
                .filter_level(LevelFilter::Warn)
                .target(env_logger::Target::Stderr);
        }
    }

    builder.parse_default_env();
    builder.init();
    log::info!("evebuild started");
}

fn get_log_file_path() -> PathBuf {
    if let Some(config_dir) = config_dir() {
        config_dir.join("evebuild").join("evebuild.log")
    } else {
        std::env::current_dir()
            .map(|p| p.join("evebuild.log"))
            .unwrap_or_else(|_| "evebuild.log".into())
    }
}
