use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use argbind::args::{CommandLineParser, ParseFailure};
use argbind::config::ParserConfig;
use argbind::logging::init_tracing;
use argbind::schema::SchemaContainer;

#[derive(Debug, Parser)]
#[command(name = "argbind", version, about = "Validate and canonicalize command lines against an argument schema")]
struct Cli {
    /// Parser configuration file (defaults to the user config, if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse ARGS against a schema and print the canonical command line
    Check {
        /// TOML argument schema
        #[arg(long)]
        schema: PathBuf,

        /// Also render arguments left at their defaults
        #[arg(long)]
        with_defaults: bool,

        /// Command line to check
        #[arg(last = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Print the argument descriptors of a schema as JSON
    Describe {
        #[arg(long)]
        schema: PathBuf,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<ParserConfig> {
    let config = match path {
        Some(path) => ParserConfig::load_from(path)?,
        None => ParserConfig::load()?,
    };
    Ok(config)
}

fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();
    let parser = CommandLineParser::new(load_config(cli.config.as_ref())?);

    match cli.command {
        Command::Check {
            schema,
            with_defaults,
            args,
        } => {
            let mut container = SchemaContainer::load(&schema)
                .with_context(|| format!("loading schema {}", schema.display()))?;
            match parser.parse(&mut container, &args) {
                Ok(outcome) => {
                    for warning in &outcome.warnings {
                        eprintln!("warning: {}", warning);
                    }
                    if with_defaults {
                        println!("{}", outcome.command_line_with_defaults);
                    } else {
                        println!("{}", outcome.command_line);
                    }
                    Ok(ExitCode::SUCCESS)
                }
                Err(ParseFailure::Arguments {
                    errors,
                    warnings,
                    usage,
                }) => {
                    for warning in &warnings {
                        eprintln!("warning: {}", warning);
                    }
                    for error in &errors {
                        eprintln!("error[{}]: {}", error.kind(), error);
                    }
                    eprintln!("{}", usage);
                    Ok(ExitCode::FAILURE)
                }
                Err(err @ ParseFailure::Definition(_)) => Err(err.into()),
            }
        }
        Command::Describe { schema } => {
            let mut container = SchemaContainer::load(&schema)
                .with_context(|| format!("loading schema {}", schema.display()))?;
            let summaries = parser.describe(&mut container)?;
            println!("{}", serde_json::to_string_pretty(&summaries)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}
