//! Command-line assembler: bound graph back to tokens.
//!
//! The output is `[container, positional values..., named arguments...]`.
//! Named arguments are grouped by the container that declared them, in
//! declaration order. Parsing the output against a fresh container yields
//! the same bound state, sensitive values excepted.

use crate::args::container::ArgumentGraph;
use crate::args::descriptor::ArgumentDescriptor;
use crate::args::tag;
use crate::args::target::RenderedValue;
use crate::config::{CollectionMode, ParserConfig};

/// Builder for the canonical command line of a bound graph.
pub struct CommandLineAssembler<'g, 'a> {
    graph: &'g ArgumentGraph<'a>,
    config: &'g ParserConfig,
    include_defaults: bool,
}

impl<'g, 'a> CommandLineAssembler<'g, 'a> {
    pub fn new(graph: &'g ArgumentGraph<'a>, config: &'g ParserConfig) -> Self {
        Self {
            graph,
            config,
            include_defaults: false,
        }
    }

    /// Also render arguments that were never specified but hold a value.
    pub fn with_defaults(mut self, include: bool) -> Self {
        self.include_defaults = include;
        self
    }

    /// Build the token list.
    pub fn build(&self) -> Vec<String> {
        let mut tokens = vec![self.graph.container_name().to_string()];
        let mut trailing = Vec::new();

        if let Some(i) = self.graph.positional_index() {
            if self.should_render(i) {
                let values = self.positional_values(i);
                // Values that look like options must follow an end-of-options marker.
                if values.iter().any(|v| looks_like_option(v)) && self.config.end_of_options {
                    trailing.push("--".to_string());
                    trailing.extend(values);
                } else {
                    tokens.extend(values);
                }
            }
        }

        for i in self.named_order() {
            if self.should_render(i) {
                self.render_named(i, &mut tokens);
            }
        }

        tokens.extend(trailing);
        tokens
    }

    /// Build and join into one shell-quoted line.
    pub fn render(&self) -> String {
        shell_words::join(self.build())
    }

    fn should_render(&self, i: usize) -> bool {
        let descriptor = &self.graph.descriptors()[i];
        if descriptor.is_sensitive() || !self.graph.is_enabled(i) {
            return false;
        }
        self.graph.is_specified(i) || (self.include_defaults && self.graph.target(i).has_value())
    }

    /// Non-positional descriptors, grouped by first appearance of their group.
    fn named_order(&self) -> Vec<usize> {
        let descriptors = self.graph.descriptors();
        let mut groups: Vec<&str> = Vec::new();
        for descriptor in descriptors {
            if !groups.contains(&descriptor.group()) {
                groups.push(descriptor.group());
            }
        }
        let mut order: Vec<usize> = (0..descriptors.len())
            .filter(|&i| !descriptors[i].is_positional())
            .collect();
        order.sort_by_key(|&i| groups.iter().position(|g| *g == descriptors[i].group()));
        order
    }

    fn positional_values(&self, i: usize) -> Vec<String> {
        let descriptor = &self.graph.descriptors()[i];
        let values = self.graph.target(i).rendered();
        let values = match self.appended_suffix(i, descriptor, &values) {
            Some(suffix) => suffix.to_vec(),
            None => values,
        };
        for value in &values {
            self.warn_if_expandable(descriptor, &value.text);
        }
        values.into_iter().map(|v| v.text).collect()
    }

    /// In append mode, the values added after the defaults, if the defaults
    /// were kept intact.
    fn appended_suffix<'v>(
        &self,
        i: usize,
        descriptor: &ArgumentDescriptor,
        values: &'v [RenderedValue],
    ) -> Option<&'v [RenderedValue]> {
        let append = self.config.collection_mode == CollectionMode::Append;
        if !append || !self.graph.is_specified(i) {
            return None;
        }
        values.strip_prefix(descriptor.defaults())
    }

    fn render_named(&self, i: usize, tokens: &mut Vec<String>) {
        let descriptor = &self.graph.descriptors()[i];
        let name = format!("--{}", descriptor.long_name());
        let values = self.graph.target(i).rendered();
        let specified = self.graph.is_specified(i);

        if descriptor.is_flag() {
            match values.first().map(|v| v.text.as_str()) {
                Some("true") => tokens.push(name),
                Some(other) => {
                    tokens.push(name);
                    tokens.push(other.to_string());
                }
                None => self.push_clear(&name, tokens),
            }
            return;
        }

        let rendered = if descriptor.is_collection() {
            match self.appended_suffix(i, descriptor, &values) {
                Some(suffix) => suffix,
                None => {
                    let append = self.config.collection_mode == CollectionMode::Append;
                    if specified && (append || values.is_empty()) {
                        self.push_clear(&name, tokens);
                    }
                    &values[..]
                }
            }
        } else {
            if values.is_empty() {
                self.push_clear(&name, tokens);
            }
            &values[..]
        };

        for value in rendered {
            self.warn_if_expandable(descriptor, &value.text);
            match &value.tag {
                Some(tag) => tokens.push(format!("{}{}", name, tag.render())),
                None => tokens.push(name.clone()),
            }
            tokens.push(value.text.clone());
        }
    }

    /// A value that names a list file is re-expanded when the line is parsed
    /// again, so it does not round-trip.
    fn warn_if_expandable(&self, descriptor: &ArgumentDescriptor, text: &str) {
        if descriptor.expands_list_files() && self.config.is_list_file(text) {
            tracing::warn!(
                argument = %descriptor.long_name(),
                value = %text,
                "Reconstructed value will be read as a list file when parsed again"
            );
        }
    }

    fn push_clear(&self, name: &str, tokens: &mut Vec<String>) {
        if let Some(sentinel) = &self.config.null_sentinel {
            tokens.push(name.to_string());
            tokens.push(sentinel.clone());
        }
    }
}

fn looks_like_option(value: &str) -> bool {
    value == "--" || (tag::strip_prefix(value).is_some() && value.parse::<f64>().is_err())
}
