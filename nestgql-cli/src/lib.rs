#![forbid(unsafe_code)]

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use clap::{Args, Parser, Subcommand};
use nestgql_schema::{Datamodel, SchemaError};
use nestgql_syntax::{SyntaxError, ast::SourceFile, parse_source};
use nestgql_synth::{
    ExistingSources, GenerationOutput, GeneratorConfig, NoExistingSources, Orchestrator,
    naming::TargetPath,
};
use thiserror::Error;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// This environment variable is used to control logs.
const LOG_ENV_VAR: &str = "LOG";

/// nestgql - NestJS GraphQL declarations from a schema snapshot
#[derive(Parser)]
#[command(version, about, arg_required_else_help(true))]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate declaration files, merging into existing ones
    Generate(Generate),
    /// Report targets whose content on disk is out of date
    Check(Check),
    /// List every artifact with its target file
    Catalog(Catalog),
}

#[derive(Args)]
pub struct Input {
    /// Schema snapshot (JSON)
    #[arg(short, long)]
    pub schema: PathBuf,

    /// Generator configuration (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct Generate {
    #[command(flatten)]
    pub input: Input,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Remove existing .ts files from the output directory instead of merging into them
    #[arg(long)]
    pub purge: bool,
}

#[derive(Args)]
pub struct Check {
    #[command(flatten)]
    pub input: Input,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,
}

#[derive(Args)]
pub struct Catalog {
    #[command(flatten)]
    pub input: Input,
}

#[derive(Debug, Error)]
pub enum NestgqlError {
    #[error("{0}")]
    IO(#[from] io::Error),
    #[error("{0}")]
    Schema(#[from] SchemaError),
    #[error("invalid config {}: {error}", path.display())]
    Config {
        path: PathBuf,
        error: serde_json::Error,
    },
    #[error("{0} artifact(s) failed to generate")]
    GenerationFailed(usize),
    #[error("{0} target(s) out of date")]
    OutOfDate(usize),
}

pub fn run() -> Result<(), NestgqlError> {
    let cli = Cli::parse();
    init_tracing();

    if let Some(command) = cli.command {
        run_command(command)
    } else {
        Ok(())
    }
}

pub fn run_command(command: Command) -> Result<(), NestgqlError> {
    match command {
        Command::Generate(args) => {
            let (datamodel, config) = load(&args.input)?;

            let output = if args.purge {
                let purged = purge(&args.output)?;
                info!(purged, "purged output directory");
                Orchestrator::new(&datamodel, &config).run(&mut NoExistingSources)
            } else {
                Orchestrator::new(&datamodel, &config).run(&mut FsSources::new(&args.output))
            };

            let mut written = 0;
            for (path, text) in output.render() {
                let file = args.output.join(path.as_str());
                if let Some(parent) = file.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&file, text)?;
                written += 1;
            }
            info!(written, "wrote targets to {}", args.output.display());

            report_failures(&output)
        }
        Command::Check(args) => {
            let (datamodel, config) = load(&args.input)?;
            let output =
                Orchestrator::new(&datamodel, &config).run(&mut FsSources::new(&args.output));

            let mut out_of_date = 0;
            for (path, text) in output.render() {
                let file = args.output.join(path.as_str());
                let current = match fs::read_to_string(&file) {
                    Ok(current) => Some(current),
                    Err(error) if error.kind() == io::ErrorKind::NotFound => None,
                    Err(error) => return Err(error.into()),
                };
                if current.as_deref() != Some(text.as_str()) {
                    println!("{path}");
                    out_of_date += 1;
                }
            }

            report_failures(&output)?;
            if out_of_date > 0 {
                return Err(NestgqlError::OutOfDate(out_of_date));
            }
            println!("All targets are up to date.");

            Ok(())
        }
        Command::Catalog(args) => {
            let (datamodel, config) = load(&args.input)?;
            let (registry, failures) = Orchestrator::new(&datamodel, &config).register();

            for (name, artifact) in registry.iter() {
                println!("{name}\t{}\t{}", artifact.kind.describe(), artifact.target);
            }
            for failure in &failures {
                error!("{failure}");
            }
            if !failures.is_empty() {
                return Err(NestgqlError::GenerationFailed(failures.len()));
            }

            Ok(())
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var(LOG_ENV_VAR)
                .from_env_lossy(),
        )
        .init();
}

fn load(input: &Input) -> Result<(Datamodel, GeneratorConfig), NestgqlError> {
    let datamodel = Datamodel::from_json_str(&fs::read_to_string(&input.schema)?)?;
    let config = match &input.config {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?).map_err(|error| {
            NestgqlError::Config {
                path: path.clone(),
                error,
            }
        })?,
        None => GeneratorConfig::default(),
    };
    info!(
        models = datamodel.models.len(),
        enums = datamodel.enums.len(),
        "loaded schema {}",
        input.schema.display()
    );

    Ok((datamodel, config))
}

fn report_failures(output: &GenerationOutput) -> Result<(), NestgqlError> {
    for failure in &output.failures {
        error!("{failure}");
    }
    if output.failures.is_empty() {
        Ok(())
    } else {
        Err(NestgqlError::GenerationFailed(output.failures.len()))
    }
}

/// Remove every `.ts` file below `dir`, returning how many were removed.
fn purge(dir: &Path) -> io::Result<usize> {
    if !dir.is_dir() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            removed += purge(&path)?;
        } else if matches!(path.extension(), Some(ext) if ext == "ts") {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Existing targets read from the output directory.
struct FsSources<'a> {
    root: &'a Path,
}

impl<'a> FsSources<'a> {
    fn new(root: &'a Path) -> Self {
        Self { root }
    }
}

impl ExistingSources for FsSources<'_> {
    fn load(&mut self, path: &TargetPath) -> Result<Option<SourceFile>, SyntaxError> {
        match fs::read_to_string(self.root.join(path.as_str())) {
            Ok(text) => parse_source(&text).map(Some),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(SyntaxError::new(format!("unreadable file: {error}"), 0..0)),
        }
    }
}

#[cfg(test)]
mod tests;
