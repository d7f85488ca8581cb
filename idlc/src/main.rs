//! idlc binary
//!
//! Run with: `idlc compile [OPTIONS] <INPUTS>...`

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use idlc::{CompilationDriver, Config, InterfacesInfo, JsonReader};

#[derive(Parser)]
#[command(name = "idlc")]
#[command(about = "Merge interface dependencies and plan overload resolution")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile parsed declaration bundles
    Compile {
        /// Bundles (`<Interface>.json`) or directories to search for them
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,

        /// Configuration file path
        #[arg(short = 'c', long)]
        config: Option<PathBuf>,

        /// Dependency scan output (overrides the config file)
        #[arg(long, env = "IDLC_INTERFACES_INFO")]
        interfaces_info: Option<PathBuf>,

        /// Output directory (overrides the config file)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Keep compiling other units after a failure
        #[arg(short, long)]
        keep_going: bool,

        /// Write compact JSON
        #[arg(long)]
        compact: bool,
    },
    /// Print the default configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&Config::default())?);
            Ok(())
        }
        Commands::Compile {
            inputs,
            config,
            interfaces_info,
            output_dir,
            keep_going,
            compact,
        } => {
            let mut config = match config {
                Some(path) => Config::load(&path)?,
                None => Config::default(),
            };
            if interfaces_info.is_some() {
                config.interfaces_info = interfaces_info;
            }
            if let Some(output_dir) = output_dir {
                config.output_dir = output_dir;
            }
            if keep_going {
                config.fail_fast = false;
            }
            if compact {
                config.pretty = false;
            }
            cmd_compile(&config, &inputs)
        }
    }
}

fn cmd_compile(config: &Config, inputs: &[PathBuf]) -> Result<()> {
    let Some(info_path) = config.interfaces_info.as_deref() else {
        bail!("no dependency info given; pass --interfaces-info or set `interfaces_info` in the config");
    };
    let info = InterfacesInfo::load(info_path)
        .with_context(|| format!("Failed to load dependency info: {}", info_path.display()))?;
    info!("Loaded dependency info for {} interfaces", info.len());

    let units = collect_units(inputs)?;
    let driver = CompilationDriver::new(info, JsonReader::new()).with_fail_fast(config.fail_fast);
    let report = driver.compile_all(&units);

    let mut written = 0;
    for unit in report.generated() {
        let path = unit
            .write_to(&config.output_dir, config.pretty)
            .with_context(|| format!("Failed to emit `{}`", unit.interface_name))?;
        info!("Wrote {}", path.display());
        written += 1;
    }

    for (path, err) in report.failures() {
        error!("Error compiling {}: {}", path.display(), err);
    }

    info!(
        "Compiled {} units: {} written, {} skipped, {} failed, {} not attempted",
        units.len(),
        written,
        report.skipped_count(),
        report.failures().count(),
        report.not_attempted.len()
    );

    if report.has_failures() {
        std::process::exit(1);
    }
    Ok(())
}

/// Expand directories into the `*.json` bundles below them.
fn collect_units(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut units = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input).sort_by_file_name() {
                let entry = entry.with_context(|| format!("Failed to walk {}", input.display()))?;
                if entry.file_type().is_file() && is_bundle(entry.path()) {
                    units.push(entry.into_path());
                }
            }
        } else {
            units.push(input.clone());
        }
    }
    Ok(units)
}

fn is_bundle(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}
