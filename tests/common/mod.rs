//! Shared test fixtures: argument containers and helpers.

#![allow(dead_code, unused_imports)]

use argbind::args::{
    ArgSpec, ArgumentContainer, CommandLineParser, PluginFamily, PluginRegistry, Scope,
    TaggedValue,
};
use argbind::config::{CollectionMode, ParserConfig};
use std::path::PathBuf;
use tempfile::TempDir;

/// Convert string literals into an owned argument vector.
pub fn args(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| t.to_string()).collect()
}

pub fn parser() -> CommandLineParser {
    CommandLineParser::new(ParserConfig::default())
}

pub fn append_parser() -> CommandLineParser {
    CommandLineParser::new(ParserConfig {
        collection_mode: CollectionMode::Append,
        ..ParserConfig::default()
    })
}

/// Write `content` to `name` inside `dir` and return the path as a string.
pub fn write_file(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write fixture file");
    path.to_string_lossy().into_owned()
}

// =============================================================================
// SortTool: scalars, flags, collections, positional
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct SortTool {
    pub input: Option<String>,
    pub output: Option<String>,
    pub threads: i32,
    pub verbose: bool,
    pub intervals: Vec<String>,
    pub list: Vec<String>,
    pub samples: Vec<String>,
    pub legacy: Option<String>,
    pub password: Option<String>,
    pub files: Vec<String>,
}

impl Default for SortTool {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            threads: 1,
            verbose: false,
            intervals: Vec::new(),
            list: vec!["foo".to_string(), "bar".to_string()],
            samples: Vec::new(),
            legacy: None,
            password: None,
            files: Vec::new(),
        }
    }
}

impl ArgumentContainer for SortTool {
    fn container_name(&self) -> &str {
        "SortTool"
    }

    fn declare<'a>(&'a mut self, scope: &mut Scope<'a>) {
        scope
            .argument(
                ArgSpec::new("input").short("I").doc("Input file"),
                &mut self.input,
            )
            .argument(
                ArgSpec::new("output").short("O").alias("out").optional(),
                &mut self.output,
            )
            .argument(
                ArgSpec::new("threads")
                    .range(Some(1.0), Some(64.0))
                    .recommended(Some(1.0), Some(16.0)),
                &mut self.threads,
            )
            .argument(ArgSpec::new("verbose").short("v"), &mut self.verbose)
            .argument(
                ArgSpec::new("intervals")
                    .short("L")
                    .optional()
                    .no_file_expansion(),
                &mut self.intervals,
            )
            .argument(ArgSpec::new("LIST").optional(), &mut self.list)
            .argument(
                ArgSpec::new("sample")
                    .optional()
                    .elements(Some(2), Some(3)),
                &mut self.samples,
            )
            .argument(
                ArgSpec::new("legacy").optional().deprecated(),
                &mut self.legacy,
            )
            .argument(
                ArgSpec::new("password").optional().sensitive(),
                &mut self.password,
            )
            .argument(ArgSpec::positional("FILES").optional(), &mut self.files);
    }
}

// =============================================================================
// TaggedTool: taggable scalar and collection
// =============================================================================

#[derive(Debug, Default)]
pub struct TaggedTool {
    pub scalar: Option<TaggedValue>,
    pub list: Vec<TaggedValue>,
    pub plain: Option<String>,
}

impl ArgumentContainer for TaggedTool {
    fn container_name(&self) -> &str {
        "TaggedTool"
    }

    fn declare<'a>(&'a mut self, scope: &mut Scope<'a>) {
        scope
            .argument(
                ArgSpec::new("tagged-scalar").short("tScalar").optional(),
                &mut self.scalar,
            )
            .argument(
                ArgSpec::new("tagged-list").short("tList").optional(),
                &mut self.list,
            )
            .argument(ArgSpec::new("plain").optional(), &mut self.plain);
    }
}

// =============================================================================
// MutexTool: A and B each exclude M, N, Y and Z
// =============================================================================

#[derive(Debug, Default)]
pub struct MutexTool {
    pub a: Option<String>,
    pub b: Option<String>,
    pub m: Option<String>,
    pub n: Option<String>,
    pub y: Option<String>,
    pub z: Option<String>,
}

impl ArgumentContainer for MutexTool {
    fn container_name(&self) -> &str {
        "MutexTool"
    }

    fn declare<'a>(&'a mut self, scope: &mut Scope<'a>) {
        let partners = ["M", "N", "Y", "Z"];
        scope
            .argument(ArgSpec::new("A").mutex(partners), &mut self.a)
            .argument(ArgSpec::new("B").mutex(partners), &mut self.b)
            .argument(ArgSpec::new("M").optional(), &mut self.m)
            .argument(ArgSpec::new("N").optional(), &mut self.n)
            .argument(ArgSpec::new("Y").optional(), &mut self.y)
            .argument(ArgSpec::new("Z").optional(), &mut self.z);
    }
}

// =============================================================================
// PairTool: exactly two positional values
// =============================================================================

#[derive(Debug, Default)]
pub struct PairTool {
    pub files: Vec<String>,
}

impl ArgumentContainer for PairTool {
    fn container_name(&self) -> &str {
        "PairTool"
    }

    fn declare<'a>(&'a mut self, scope: &mut Scope<'a>) {
        scope.argument(
            ArgSpec::positional("FILES").elements(Some(2), Some(2)),
            &mut self.files,
        );
    }
}

// =============================================================================
// Nested containers
// =============================================================================

#[derive(Debug, Default)]
pub struct OutputOptions {
    pub compress: bool,
    pub level: Option<u32>,
}

impl ArgumentContainer for OutputOptions {
    fn container_name(&self) -> &str {
        "OutputOptions"
    }

    fn declare<'a>(&'a mut self, scope: &mut Scope<'a>) {
        scope
            .argument(ArgSpec::new("compress"), &mut self.compress)
            .argument(
                ArgSpec::new("compression-level")
                    .optional()
                    .range(Some(0.0), Some(9.0)),
                &mut self.level,
            );
    }
}

#[derive(Debug, Default)]
pub struct ConvertTool {
    pub reference: Option<String>,
    pub output: OutputOptions,
    pub name: Option<String>,
}

impl ArgumentContainer for ConvertTool {
    fn container_name(&self) -> &str {
        "ConvertTool"
    }

    fn declare<'a>(&'a mut self, scope: &mut Scope<'a>) {
        scope
            .argument(ArgSpec::new("reference").short("R").optional(), &mut self.reference)
            .nested(&mut self.output)
            .argument(ArgSpec::new("name").optional(), &mut self.name);
    }
}

// =============================================================================
// Plugins: read filters
// =============================================================================

pub trait ReadFilter: ArgumentContainer {
    /// Short human-readable description of the configured filter.
    fn describe(&self) -> String;
}

#[derive(Debug, Default)]
pub struct LengthFilter {
    pub min_length: Option<i32>,
}

impl ArgumentContainer for LengthFilter {
    fn container_name(&self) -> &str {
        "LengthFilter"
    }

    fn declare<'a>(&'a mut self, scope: &mut Scope<'a>) {
        scope.argument(ArgSpec::new("min-length").optional(), &mut self.min_length);
    }
}

impl ReadFilter for LengthFilter {
    fn describe(&self) -> String {
        format!("LengthFilter(min={:?})", self.min_length)
    }
}

#[derive(Debug)]
pub struct MappingQualityFilter {
    pub min_mapping_quality: i32,
}

impl Default for MappingQualityFilter {
    fn default() -> Self {
        Self {
            min_mapping_quality: 20,
        }
    }
}

impl ArgumentContainer for MappingQualityFilter {
    fn container_name(&self) -> &str {
        "MappingQualityFilter"
    }

    fn declare<'a>(&'a mut self, scope: &mut Scope<'a>) {
        scope.argument(
            ArgSpec::new("min-mapping-quality").range(Some(0.0), None),
            &mut self.min_mapping_quality,
        );
    }
}

impl ReadFilter for MappingQualityFilter {
    fn describe(&self) -> String {
        format!("MappingQualityFilter(min={})", self.min_mapping_quality)
    }
}

#[derive(Debug, Default)]
pub struct DuplicateFilter;

impl ArgumentContainer for DuplicateFilter {
    fn container_name(&self) -> &str {
        "DuplicateFilter"
    }

    fn declare<'a>(&'a mut self, _scope: &mut Scope<'a>) {}
}

impl ReadFilter for DuplicateFilter {
    fn describe(&self) -> String {
        "DuplicateFilter".to_string()
    }
}

pub fn filter_registry() -> PluginRegistry<dyn ReadFilter> {
    let mut registry: PluginRegistry<dyn ReadFilter> = PluginRegistry::new();
    registry.register("org.reads.filters.LengthFilter", || -> Box<dyn ReadFilter> {
        Box::new(LengthFilter::default())
    });
    registry.register(
        "org.reads.filters.MappingQualityFilter",
        || -> Box<dyn ReadFilter> { Box::new(MappingQualityFilter::default()) },
    );
    registry.register("org.reads.filters.DuplicateFilter", || -> Box<dyn ReadFilter> {
        Box::new(DuplicateFilter)
    });
    registry.register("org.other.Unrelated", || -> Box<dyn ReadFilter> {
        Box::new(DuplicateFilter)
    });
    registry
}

pub struct FilterTool {
    pub input: Option<String>,
    pub filters: PluginFamily<dyn ReadFilter>,
}

impl FilterTool {
    pub fn new(defaults: &[&str]) -> Self {
        let registry = filter_registry();
        let mut filters = PluginFamily::new(ArgSpec::new("read-filter").short("RF").optional());
        filters
            .discover_registered(&registry, "org.reads.filters", &|_| true)
            .expect("Failed to discover filters");
        filters
            .set_defaults(defaults.iter().copied())
            .expect("Failed to set default filters");
        Self {
            input: None,
            filters,
        }
    }
}

impl ArgumentContainer for FilterTool {
    fn container_name(&self) -> &str {
        "FilterTool"
    }

    fn declare<'a>(&'a mut self, scope: &mut Scope<'a>) {
        scope
            .argument(ArgSpec::new("input").short("I").optional(), &mut self.input)
            .plugins(&mut self.filters);
    }
}
