//! Error types for argument definition and command-line binding.
//!
//! Two families are kept apart: [`DefinitionError`] describes a mistake in the
//! way containers declare their arguments and is raised before any token is
//! read; [`ArgError`] describes bad user input and is collected during a parse.

use std::path::PathBuf;
use thiserror::Error;

/// Classification of every error the engine can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Definition,
    MissingArgument,
    BadArgumentValue,
    OutOfRangeArgumentValue,
    MalformedTagExpression,
    MutexViolation,
    DanglingDependentArgument,
    DuplicateUse,
    UnknownArgument,
    ArgumentFile,
    InternalParserError,
}

impl ErrorKind {
    /// Stable identifier, suitable for machine-readable output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Definition => "definition_error",
            Self::MissingArgument => "missing_argument",
            Self::BadArgumentValue => "bad_argument_value",
            Self::OutOfRangeArgumentValue => "out_of_range_argument_value",
            Self::MalformedTagExpression => "malformed_tag_expression",
            Self::MutexViolation => "mutex_violation",
            Self::DanglingDependentArgument => "dangling_dependent_argument",
            Self::DuplicateUse => "duplicate_use",
            Self::UnknownArgument => "unknown_argument",
            Self::ArgumentFile => "argument_file",
            Self::InternalParserError => "internal_parser_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A programming mistake in an argument declaration.
///
/// These are never recovered: the graph is rejected before parsing starts.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DefinitionError {
    #[error("argument declared with an empty name")]
    EmptyName,

    #[error("argument name '{name}' is invalid: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("argument name '{name}' is used by both '{first}' and '{second}'")]
    NameCollision {
        name: String,
        first: String,
        second: String,
    },

    #[error("argument name '{name}' is reserved by the parser")]
    ReservedName { name: String },

    #[error("argument '{argument}' has incompatible roles: {reason}")]
    IncompatibleRoles { argument: String, reason: String },

    #[error("argument '{argument}' is {role} and must therefore be optional")]
    RequiredButConcealed { argument: String, role: &'static str },

    #[error("argument '{argument}' declares numeric bounds but its type is not numeric")]
    NonNumericBounds { argument: String },

    #[error("argument '{argument}' has min_elements ({min}) greater than max_elements ({max})")]
    ElementBounds {
        argument: String,
        min: usize,
        max: usize,
    },

    #[error("argument '{argument}' has a lower bound ({min}) greater than its upper bound ({max})")]
    ValueBounds { argument: String, min: f64, max: f64 },

    #[error("argument '{argument}' lists unknown mutex member '{member}'")]
    UnknownMutexMember { argument: String, member: String },

    #[error("only one positional argument may be declared, found '{first}' and '{second}'")]
    MultiplePositional { first: String, second: String },

    #[error("plugin name '{name}' in family '{family}' is claimed by both '{first}' and '{second}'")]
    DuplicatePlugin {
        family: String,
        name: String,
        first: String,
        second: String,
    },

    #[error("plugin family '{family}' has no candidate named '{name}'")]
    UnknownPlugin { family: String, name: String },

    #[error("plugin family '{family}' cannot instantiate discovered type '{type_id}'")]
    MissingFactory { family: String, type_id: String },
}

impl DefinitionError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Definition
    }
}

/// A problem with the user's command line.
#[derive(Debug, Error)]
pub enum ArgError {
    #[error("argument '--{argument}' is required")]
    MissingArgument { argument: String },

    #[error("argument '--{argument}' is missing its value")]
    MissingValue { argument: String },

    #[error("argument '--{argument}' has invalid value '{value}': {reason}")]
    BadValue {
        argument: String,
        value: String,
        reason: String,
    },

    #[error("argument '--{argument}' value {value} is outside the allowed range: {reason}")]
    OutOfRange {
        argument: String,
        value: f64,
        reason: String,
    },

    #[error("malformed argument '{token}': {reason}")]
    MalformedTag { token: String, reason: String },

    #[error("argument '--{argument}' does not accept tags")]
    TagsNotSupported { argument: String },

    #[error("arguments '--{first}' and '--{second}' are mutually exclusive")]
    MutexViolation { first: String, second: String },

    #[error("argument '--{argument}' requires plugin '{plugin}' to be selected with '--{family}'")]
    DanglingDependent {
        argument: String,
        plugin: String,
        family: String,
    },

    #[error("argument '--{argument}' belongs to plugin '{plugin}', which was removed from the selection")]
    GateRemoved { argument: String, plugin: String },

    #[error("argument '--{argument}' may only be specified once")]
    DuplicateUse { argument: String },

    #[error("argument '--{argument}' was already specified and may not be overridden from '{path}'")]
    DisallowedOverride { argument: String, path: PathBuf },

    #[error("arguments file '{path}' may not name another arguments file")]
    RecursiveArgumentsFile { path: PathBuf },

    #[error("failed to read '{path}': {source}")]
    ArgumentFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{token}' is not a recognized argument")]
    UnknownArgument { token: String },

    #[error("unexpected positional value '{value}'")]
    UnexpectedPositional { value: String },

    #[error("too many positional values: at most {max} allowed, {actual} given")]
    TooManyPositional { max: usize, actual: usize },

    #[error("argument '--{argument}' accepts at most {max} values, {actual} given")]
    TooManyValues {
        argument: String,
        max: usize,
        actual: usize,
    },

    #[error("argument '{argument}' needs at least {min} values, {actual} given")]
    TooFewValues {
        argument: String,
        min: usize,
        actual: usize,
    },

    #[error("internal parser error: {0}")]
    Internal(String),
}

impl ArgError {
    /// Map the variant onto the error taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingArgument { .. }
            | Self::GateRemoved { .. }
            | Self::TooFewValues { .. } => ErrorKind::MissingArgument,
            Self::MissingValue { .. }
            | Self::BadValue { .. }
            | Self::TooManyPositional { .. }
            | Self::TooManyValues { .. } => ErrorKind::BadArgumentValue,
            Self::OutOfRange { .. } => ErrorKind::OutOfRangeArgumentValue,
            Self::MalformedTag { .. } | Self::TagsNotSupported { .. } => {
                ErrorKind::MalformedTagExpression
            }
            Self::MutexViolation { .. } => ErrorKind::MutexViolation,
            Self::DanglingDependent { .. } => ErrorKind::DanglingDependentArgument,
            Self::DuplicateUse { .. } | Self::DisallowedOverride { .. } => ErrorKind::DuplicateUse,
            Self::RecursiveArgumentsFile { .. } | Self::ArgumentFile { .. } => {
                ErrorKind::ArgumentFile
            }
            Self::UnknownArgument { .. } | Self::UnexpectedPositional { .. } => {
                ErrorKind::UnknownArgument
            }
            Self::Internal(_) => ErrorKind::InternalParserError,
        }
    }
}
