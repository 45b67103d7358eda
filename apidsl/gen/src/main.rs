//! apidsl Design Exporter
//!
//! Runs a bundled design and exports the resolved graph as JSON.

use std::path::PathBuf;
use std::process::ExitCode;

use apidsl_define::DesignConfig;
use apidsl_gen::errors::GeneratorError;
use apidsl_gen::export::{export, load_design};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// apidsl design exporter - resolves a design and writes it as JSON
#[derive(Parser, Debug)]
#[command(name = "apidsl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Design to run (e.g., "cellar", "org-chart")
    #[arg(short, long)]
    design: String,

    /// Output file for the resolved design (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Seed for example generation
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum number of items in generated arrays, collections and maps
    #[arg(long)]
    max_items: Option<usize>,

    /// Skip example generation
    #[arg(long)]
    no_examples: bool,

    /// Print the resolved design without writing files
    #[arg(long)]
    dry_run: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn config(&self) -> Result<DesignConfig, GeneratorError> {
        let mut config = DesignConfig {
            seed: self.seed,
            generate_examples: !self.no_examples,
            ..DesignConfig::default()
        };
        if let Some(max_items) = self.max_items {
            if max_items == 0 {
                return Err(GeneratorError::ConfigError(
                    "--max-items must be at least 1".to_string(),
                ));
            }
            config.max_collection_length = max_items;
        }
        Ok(config)
    }
}

/// Log directives for a verbosity level.
///
/// Collected design errors are reported by `main` once the run ends, so the
/// engine's per-error warnings only show from `-v` on. `-vv` adds the
/// finalize steps, `-vvv` the example generator's cycle placeholders.
fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "apidsl_gen=warn",
        1 => "apidsl_define=warn,apidsl_gen=info",
        2 => "apidsl_define=debug,apidsl_gen=debug",
        _ => "apidsl_define=trace,apidsl_gen=trace",
    }
}

/// Installs the stderr subscriber. `RUST_LOG` overrides `-v`.
fn init_tracing(verbose: u8, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_filter(verbose)));

    let json_layer = json.then(|| fmt::layer().json().with_writer(std::io::stderr));
    let text_layer = (!json).then(|| {
        fmt::layer()
            .with_target(verbose >= 2)
            .with_file(verbose >= 3)
            .with_line_number(verbose >= 3)
            .with_writer(std::io::stderr)
            .compact()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

fn run(cli: &Cli) -> Result<(), GeneratorError> {
    let mut design = load_design(&cli.design, cli.config()?)?;
    let json = export(&mut design, cli.output.as_deref(), cli.dry_run)?;

    if cli.output.is_none() || cli.dry_run {
        println!("{json}");
    } else if cli.verbose > 0 {
        if let Some(path) = &cli.output {
            eprintln!("Successfully exported {} to {}", cli.design, path.display());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(GeneratorError::DesignFailed(errors)) => {
            eprintln!(
                "{} design '{}' has {} error(s)",
                "error:".red().bold(),
                cli.design,
                errors.len()
            );
            for err in errors {
                eprintln!("  {} {}", format!("[{}]", err.kind).yellow(), err);
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_filters_parse() {
        for verbose in 0..5 {
            assert!(EnvFilter::try_new(log_filter(verbose)).is_ok());
        }
    }

    #[test]
    fn quiet_runs_hide_engine_warnings() {
        assert!(!log_filter(0).contains("apidsl_define"));
        assert!(log_filter(1).contains("apidsl_define=warn"));
    }

    #[test]
    fn zero_max_items_is_rejected() {
        let cli = Cli::parse_from(["apidsl", "--design", "cellar", "--max-items", "0"]);
        assert!(matches!(cli.config(), Err(GeneratorError::ConfigError(_))));
    }

    #[test]
    fn cli_flags_map_onto_config() {
        let cli = Cli::parse_from([
            "apidsl",
            "-d",
            "org-chart",
            "--seed",
            "9",
            "--max-items",
            "2",
            "--no-examples",
        ]);
        let config = cli.config().unwrap();
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.max_collection_length, 2);
        assert!(!config.generate_examples);
    }
}
