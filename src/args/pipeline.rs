//! Pipeline: ties all argument processing stages together.

use thiserror::Error;

use crate::args::assembler::CommandLineAssembler;
use crate::args::binder::bind;
use crate::args::container::{ArgumentContainer, ArgumentGraph};
use crate::args::descriptor::DescriptorSummary;
use crate::args::tokenizer::tokenize;
use crate::args::usage::synopsis;
use crate::args::validator::validate;
use crate::config::ParserConfig;
use crate::error::{ArgError, DefinitionError, ErrorKind};

/// Result of a successful parse.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    /// Canonical command line, shell-quoted.
    pub command_line: String,
    /// The same command line as separate tokens.
    pub tokens: Vec<String>,
    /// Command line including every argument that holds a value.
    pub command_line_with_defaults: String,
    /// Advisory messages (deprecated arguments, recommended ranges, ...).
    pub warnings: Vec<String>,
    /// Long names of the arguments that were set from the command line.
    pub specified: Vec<String>,
}

/// Why a parse failed.
#[derive(Debug, Error)]
pub enum ParseFailure {
    /// The containers' declarations are inconsistent; no token was read.
    #[error("invalid argument definitions: {0}")]
    Definition(#[from] DefinitionError),

    /// The command line was rejected.
    #[error("{}", render_errors(.errors))]
    Arguments {
        errors: Vec<ArgError>,
        warnings: Vec<String>,
        usage: String,
    },
}

impl ParseFailure {
    /// User-input errors, in the order they were found (empty for definition errors).
    pub fn errors(&self) -> &[ArgError] {
        match self {
            Self::Definition(_) => &[],
            Self::Arguments { errors, .. } => errors,
        }
    }

    pub fn kinds(&self) -> Vec<ErrorKind> {
        match self {
            Self::Definition(err) => vec![err.kind()],
            Self::Arguments { errors, .. } => errors.iter().map(ArgError::kind).collect(),
        }
    }

    pub fn has_kind(&self, kind: ErrorKind) -> bool {
        self.kinds().contains(&kind)
    }

    pub fn usage(&self) -> Option<&str> {
        match self {
            Self::Definition(_) => None,
            Self::Arguments { usage, .. } => Some(usage.as_str()),
        }
    }
}

fn render_errors(errors: &[ArgError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Entry point: binds a command line into a container graph.
#[derive(Debug, Clone, Default)]
pub struct CommandLineParser {
    config: ParserConfig,
}

impl CommandLineParser {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse `args` into `root`.
    ///
    /// On failure the targets may be partially bound; the caller should
    /// discard the container.
    pub fn parse<C: ArgumentContainer + ?Sized>(
        &self,
        root: &mut C,
        args: &[String],
    ) -> Result<ParseOutcome, ParseFailure> {
        let mut graph = ArgumentGraph::build(root, &self.config)?;

        // Stage 1: Tokenize (no target is touched)
        let stream = tokenize(args, &graph, &self.config);
        if stream.aborted {
            return Err(ParseFailure::Arguments {
                errors: stream.errors,
                warnings: Vec::new(),
                usage: synopsis(&graph),
            });
        }
        let mut errors = stream.errors;

        // Stage 2: Bind values
        let bound = bind(&mut graph, stream.occurrences, &self.config);
        errors.extend(bound.errors);
        let mut warnings = bound.warnings;

        // Stage 3: Validate
        let validation = validate(&mut graph);
        errors.extend(validation.errors);
        warnings.extend(validation.warnings);

        if !errors.is_empty() {
            tracing::debug!(errors = errors.len(), "Command line rejected");
            return Err(ParseFailure::Arguments {
                errors,
                warnings,
                usage: synopsis(&graph),
            });
        }

        // Stage 4: Reconstruct
        let assembler = CommandLineAssembler::new(&graph, &self.config);
        let tokens = assembler.build();
        let command_line = shell_words::join(&tokens);
        let command_line_with_defaults = assembler.with_defaults(true).render();

        tracing::info!(
            container = %graph.container_name(),
            command_line = %command_line,
            warnings = warnings.len(),
            "Parsed command line"
        );

        Ok(ParseOutcome {
            command_line,
            tokens,
            command_line_with_defaults,
            warnings,
            specified: graph.specified_names(),
        })
    }

    /// Descriptor summaries of `root`, without parsing anything.
    pub fn describe<C: ArgumentContainer + ?Sized>(
        &self,
        root: &mut C,
    ) -> Result<Vec<DescriptorSummary>, DefinitionError> {
        Ok(ArgumentGraph::build(root, &self.config)?.summaries())
    }

    /// One-line usage synopsis of `root`.
    pub fn usage<C: ArgumentContainer + ?Sized>(
        &self,
        root: &mut C,
    ) -> Result<String, DefinitionError> {
        Ok(synopsis(&ArgumentGraph::build(root, &self.config)?))
    }
}
