//! Argument binding pipeline.
//!
//! Containers declare typed fields as arguments; a command line is bound
//! into them and the bound state can be turned back into a command line:
//!
//! ```text
//! Container → Graph → Tokenize → Bind → Validate → Reconstruct
//! ```
//!
//! Definition problems are reported before any token is read; user errors
//! are collected across the bind and validation stages.

mod assembler;
mod binder;
mod container;
mod descriptor;
mod pipeline;
mod plugin;
mod tag;
mod target;
mod tokenizer;
mod usage;
mod validator;
mod value;

pub use assembler::CommandLineAssembler;
pub use container::{ArgumentContainer, ArgumentGraph, Scope};
pub use descriptor::{ArgSpec, ArgumentDescriptor, DescriptorSummary, Gate};
pub use pipeline::{CommandLineParser, ParseFailure, ParseOutcome};
pub use plugin::{
    simple_name, PluginDiscovery, PluginFactory, PluginFamily, PluginRegistry, PluginSelection,
    Selection, SelectionValidator,
};
pub use tag::{name_part, parse_name_token, strip_prefix, NameToken};
pub use target::{ArgTarget, RenderedValue, TargetShape};
pub use usage::synopsis;
pub use value::{ArgValue, Tag, Taggable, TaggedValue, ValueKind};
