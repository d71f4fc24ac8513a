use anyhow::Result;
use clap::ArgMatches;
use log::LevelFilter;
use std::path::PathBuf;

use kval_cli::cli::build_cli;
use kval_cli::validate::input::ValidateConfig;
use kval_cli::validate::output::write_outputs;
use kval_cli::validate::validator::run_validation;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("KVAL_LOG", "error,kval=info"))
        .init();

    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("validate", sub_m)) => handle_validate(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn handle_validate(matches: &ArgMatches) -> Result<()> {
    let config_path: Option<&PathBuf> = matches.get_one("config");
    match config_path {
        Some(path) => log::info!("[kval::validate] Using config: {:?}", path),
        None => log::info!("[kval::validate] No config provided; using defaults."),
    }

    let config = ValidateConfig::from_arguments(config_path.map(PathBuf::as_path), matches)?;
    log::debug!(
        "[kval::validate] Effective config:\n{}",
        serde_json::to_string_pretty(&config).unwrap_or_default()
    );

    match run_validation(&config).and_then(|outcome| write_outputs(&config, &outcome)) {
        Ok(written) => {
            eprintln!(
                "[kval::validate] Completed; wrote {} files to {}",
                written.len(),
                config.output_dir
            );
            Ok(())
        }
        Err(e) => {
            log::error!("Validation failed: {:#}", e);
            std::process::exit(1)
        }
    }
}
