//! Command line front end of the SVG to vector converter.
//!
//! The conversion flags (`--text-as-shape`, `--target`, ...) come from the
//! option metadata in `svg2vector::options`; the registry actions are declared
//! here. Every run starts with the error-code registry self-check, and every
//! failure exits with the negative code registered for it.

use anyhow::{Context, Result, bail};
use clap::error::ErrorKind;
use clap::{CommandFactory, FromArgMatches, Parser, ValueEnum};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use svg2vector::registry::codes::{
    CLI_CONFLICT, CLI_USAGE, OPTION_INVALID_VALUE, OUTPUT_DIRECTORY, OUTPUT_WRITE,
};
use svg2vector::check::{report_check, startup_check};
use svg2vector::registry::{ERROR_CODES, Registry};
use svg2vector::{APP_NAME, ConversionOptions, ENV_LOG, Failure, RegistryReport, exit_code};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(exit_code(&err).code());
    }
}

#[derive(Parser, Debug)]
#[command(name = "svg2vector", version)]
#[command(about = "Convert SVG graphics into other vector formats")]
struct Cli {
    /// Print the error code registry and exit.
    #[arg(long)]
    list_error_codes: bool,
    /// Format used by --list-error-codes.
    #[arg(long, value_enum, default_value_t = Format::Text, requires = "list_error_codes")]
    format: Format,
    /// Write the listing to PATH instead of stdout.
    #[arg(long, value_name = "PATH", requires = "list_error_codes")]
    output: Option<PathBuf>,
    /// Validate the error code registry and report every violation.
    #[arg(long, conflicts_with = "list_error_codes")]
    check_registry: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn run() -> Result<()> {
    let mut options = ConversionOptions::standard();
    let command = options.augment(Cli::command(), APP_NAME);
    let matches = match command.try_get_matches() {
        Ok(matches) => matches,
        Err(err) => return clap_failure(err),
    };
    let cli = Cli::from_arg_matches(&matches).map_err(|err| {
        Failure::new(CLI_USAGE, err.render().to_string().trim_end().to_string())
    })?;

    options.apply_matches(&matches)?;
    options.apply_env()?;
    init_tracing(&options);
    debug!(options = ?options.resolved(), "resolved options");

    let registry = Registry::builtin();
    if cli.check_registry {
        return report_check(registry, ERROR_CODES, &mut io::stdout().lock());
    }
    startup_check(registry, ERROR_CODES)?;

    if cli.list_error_codes {
        return list_error_codes(cli.format, cli.output.as_deref(), options.is_set("quiet"));
    }

    info!(
        text_as_shape = options.text_as_shape(),
        target_format = options.target().unwrap_or_default(),
        "handing options to the conversion pipeline"
    );
    println!("{}", serde_json::to_string_pretty(&options.resolved())?);
    Ok(())
}

/// Help and version requests succeed; everything else exits with a CLI code.
fn clap_failure(err: clap::Error) -> Result<()> {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            err.print().context("printing help")?;
            Ok(())
        }
        kind => {
            let code = match kind {
                ErrorKind::ArgumentConflict => CLI_CONFLICT,
                ErrorKind::InvalidValue => OPTION_INVALID_VALUE,
                _ => CLI_USAGE,
            };
            let rendered = err.render().to_string();
            Err(Failure::new(code, rendered.trim_end()).into())
        }
    }
}

fn init_tracing(options: &ConversionOptions) {
    let filter = if options.is_set("verbose") {
        EnvFilter::new("debug")
    } else if options.is_set("quiet") {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn list_error_codes(format: Format, output: Option<&Path>, quiet: bool) -> Result<()> {
    let report = RegistryReport::build(Registry::builtin(), ERROR_CODES);
    let rendered = match format {
        Format::Text => report.to_text(),
        Format::Json => report.to_json()? + "\n",
    };

    let Some(path) = output else {
        print!("{rendered}");
        return Ok(());
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.is_dir() {
            bail!(Failure::new(
                OUTPUT_DIRECTORY,
                format!("output directory {} does not exist", parent.display())
            ));
        }
    }
    fs::write(path, rendered)
        .with_context(|| Failure::new(OUTPUT_WRITE, format!("writing {}", path.display())))?;
    if !quiet {
        eprintln!("error code report written to {}", path.display());
    }
    Ok(())
}
