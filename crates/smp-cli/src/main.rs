//! # smp-cli
//!
//! Command-line validator for Smart Manufacturing profile payloads.
//!
//! Exit codes: `0` valid, `1` valid with warnings, `2` invalid payload or a
//! document that could not be loaded.

mod config;

use anyhow::Context;
use clap::{Parser, Subcommand};
use config::{CliConfig, parse_reference};
use smp_profile::ProfileLoader;
use smp_validation::{
    DEFAULT_MAX_DEPTH, ProfileValidator, ReportFormat, ValidationReport, ValidationReporter,
    ValidationResult, ValidatorConfig,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const EXIT_VALID: u8 = 0;
const EXIT_WARNINGS: u8 = 1;
const EXIT_INVALID: u8 = 2;

#[derive(Parser)]
#[command(name = "smpv")]
#[command(about = "Validate JSON payloads against CESMII Smart Manufacturing profiles")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a payload against a profile
    Validate {
        /// Payload file path or URL (JSON or YAML)
        payload: String,

        /// Profile file path or URL
        #[arg(short, long)]
        profile: Option<String>,

        /// Referenced profile as `[<namespace>=]<source>`; repeatable
        #[arg(short, long = "reference")]
        references: Vec<String>,

        /// Report format (text or json)
        #[arg(short, long)]
        format: Option<ReportFormat>,

        /// Maximum nested-profile depth
        #[arg(long)]
        max_depth: Option<usize>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::from(EXIT_INVALID)
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<u8> {
    let loader = ProfileLoader::default();
    let config = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };

    match cli.command {
        Commands::Validate {
            payload,
            profile,
            references,
            format,
            max_depth,
        } => {
            let profile_source = profile.or(config.profile).context(
                "No profile given: pass --profile or set `profile` in the config file",
            )?;

            let mut sources: Vec<(Option<String>, String)> = config
                .references
                .into_iter()
                .map(|r| (r.namespace, r.source))
                .collect();
            sources.extend(references.iter().map(|r| parse_reference(r)));

            let options = ValidateOptions {
                format: format.or(config.format).unwrap_or_default(),
                max_depth: max_depth.or(config.max_depth).unwrap_or(DEFAULT_MAX_DEPTH),
            };
            validate(&loader, &payload, &profile_source, &sources, &options)
        }
    }
}

struct ValidateOptions {
    format: ReportFormat,
    max_depth: usize,
}

fn validate(
    loader: &ProfileLoader,
    payload_source: &str,
    profile_source: &str,
    references: &[(Option<String>, String)],
    options: &ValidateOptions,
) -> anyhow::Result<u8> {
    tracing::info!("Validating {} against {}", payload_source, profile_source);

    let profile = loader
        .load(profile_source)
        .with_context(|| format!("Failed to load profile '{profile_source}'"))?;
    let referenced = loader
        .load_referenced(references)
        .context("Failed to load referenced profiles")?;
    let payload = loader
        .load(payload_source)
        .with_context(|| format!("Failed to load payload '{payload_source}'"))?;

    tracing::debug!("Loaded {} referenced profile(s)", referenced.len());

    let validator = ProfileValidator::new(&profile)
        .with_referenced_profiles(referenced)
        .with_config(ValidatorConfig {
            max_depth: options.max_depth,
        });
    let result = validator.validate(&payload, "");

    let report = ValidationReport {
        subject: payload_source,
        profile: &validator.profile().namespace,
        result: &result,
    };
    let rendered = ValidationReporter::new(options.format).render(&report)?;
    println!("{rendered}");

    Ok(exit_code(&result))
}

fn exit_code(result: &ValidationResult) -> u8 {
    if !result.is_valid() {
        EXIT_INVALID
    } else if result.has_warnings() {
        EXIT_WARNINGS
    } else {
        EXIT_VALID
    }
}
