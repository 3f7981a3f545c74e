//! Argument descriptors: declared metadata for one bindable item.

use serde::Serialize;

use crate::args::target::{RenderedValue, TargetShape};
use crate::args::value::ValueKind;

/// Declaration of a single argument, built by a container.
///
/// Arguments are required unless marked [`ArgSpec::optional`]; a required
/// argument that already holds a value is nevertheless treated as optional
/// (see [`ArgumentDescriptor::is_optional`]).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgSpec {
    pub long_name: String,
    pub short_name: Option<String>,
    pub aliases: Vec<String>,
    pub doc: String,
    pub positional: bool,
    pub optional: bool,
    pub sensitive: bool,
    pub hidden: bool,
    pub advanced: bool,
    pub deprecated: bool,
    /// A second occurrence on the command line is an error.
    pub single_use: bool,
    /// List-file expansion never applies to this argument.
    pub no_file_expansion: bool,
    pub min_elements: Option<usize>,
    pub max_elements: Option<usize>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub min_recommended: Option<f64>,
    pub max_recommended: Option<f64>,
    /// Long names of arguments that may not be combined with this one.
    pub mutex: Vec<String>,
}

impl ArgSpec {
    /// A named argument (`--long-name`).
    pub fn new(long_name: impl Into<String>) -> Self {
        Self {
            long_name: long_name.into(),
            ..Self::default()
        }
    }

    /// The positional argument; `display_name` is used in usage output only.
    pub fn positional(display_name: impl Into<String>) -> Self {
        Self {
            long_name: display_name.into(),
            positional: true,
            ..Self::default()
        }
    }

    pub fn short(mut self, short_name: impl Into<String>) -> Self {
        self.short_name = Some(short_name.into());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn advanced(mut self) -> Self {
        self.advanced = true;
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    pub fn single_use(mut self) -> Self {
        self.single_use = true;
        self
    }

    pub fn no_file_expansion(mut self) -> Self {
        self.no_file_expansion = true;
        self
    }

    pub fn elements(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_elements = min;
        self.max_elements = max;
        self
    }

    pub fn range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_value = min;
        self.max_value = max;
        self
    }

    pub fn recommended(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_recommended = min;
        self.max_recommended = max;
        self
    }

    pub fn mutex<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mutex.extend(names.into_iter().map(Into::into));
        self
    }

    pub(crate) fn has_value_bounds(&self) -> bool {
        self.min_value.is_some()
            || self.max_value.is_some()
            || self.min_recommended.is_some()
            || self.max_recommended.is_some()
    }

    pub(crate) fn has_element_bounds(&self) -> bool {
        self.min_elements.is_some() || self.max_elements.is_some()
    }
}

/// Plugin gate: the argument is only legal once `plugin` is active in the
/// family controlled by `--family`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Gate {
    pub family: String,
    pub plugin: String,
}

/// A bindable item discovered while walking a container graph.
#[derive(Debug, Clone)]
pub struct ArgumentDescriptor {
    spec: ArgSpec,
    shape: TargetShape,
    kind: ValueKind,
    accepts_tags: bool,
    group: String,
    gate: Option<Gate>,
    optional: bool,
    defaults: Vec<RenderedValue>,
    plugin_controller: bool,
}

impl ArgumentDescriptor {
    pub(crate) fn new(
        spec: ArgSpec,
        shape: TargetShape,
        kind: ValueKind,
        accepts_tags: bool,
        group: String,
        gate: Option<Gate>,
        defaults: Vec<RenderedValue>,
    ) -> Self {
        let optional = spec.optional || !defaults.is_empty();
        Self {
            spec,
            shape,
            kind,
            accepts_tags,
            group,
            gate,
            optional,
            defaults,
            plugin_controller: false,
        }
    }

    pub(crate) fn mark_plugin_controller(&mut self) {
        self.plugin_controller = true;
    }

    /// Recompute optionality from the bound state.
    pub(crate) fn resolve_optional(&mut self, has_value: bool) {
        self.optional = self.spec.optional || has_value;
    }

    pub fn spec(&self) -> &ArgSpec {
        &self.spec
    }

    pub fn long_name(&self) -> &str {
        &self.spec.long_name
    }

    pub fn short_name(&self) -> Option<&str> {
        self.spec.short_name.as_deref()
    }

    /// Every alternative name: the short name followed by declared aliases.
    pub fn synonyms(&self) -> Vec<&str> {
        self.spec
            .short_name
            .iter()
            .chain(self.spec.aliases.iter())
            .map(String::as_str)
            .collect()
    }

    /// All names this descriptor answers to on the command line.
    pub(crate) fn names(&self) -> Vec<&str> {
        if self.spec.positional {
            return Vec::new();
        }
        let mut names = vec![self.spec.long_name.as_str()];
        names.extend(self.synonyms());
        names
    }

    pub fn doc(&self) -> &str {
        &self.spec.doc
    }

    pub fn shape(&self) -> TargetShape {
        self.shape
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn accepts_tags(&self) -> bool {
        self.accepts_tags
    }

    pub fn is_positional(&self) -> bool {
        self.spec.positional
    }

    pub fn is_collection(&self) -> bool {
        self.shape == TargetShape::Collection
    }

    pub fn is_flag(&self) -> bool {
        self.shape == TargetShape::Flag
    }

    /// Declared optional, or already holding a value.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn is_sensitive(&self) -> bool {
        self.spec.sensitive
    }

    pub fn is_hidden(&self) -> bool {
        self.spec.hidden
    }

    pub fn is_advanced(&self) -> bool {
        self.spec.advanced
    }

    pub fn is_deprecated(&self) -> bool {
        self.spec.deprecated
    }

    pub fn is_plugin_controller(&self) -> bool {
        self.plugin_controller
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn gate(&self) -> Option<&Gate> {
        self.gate.as_ref()
    }

    pub fn mutex(&self) -> &[String] {
        &self.spec.mutex
    }

    /// Contents of the target before any token was bound.
    pub fn defaults(&self) -> &[RenderedValue] {
        &self.defaults
    }

    /// Whether list-file expansion may apply to this descriptor's values.
    pub(crate) fn expands_list_files(&self) -> bool {
        self.is_collection() && !self.spec.no_file_expansion && !self.plugin_controller
    }

    pub fn summary(&self) -> DescriptorSummary {
        DescriptorSummary {
            long_name: self.spec.long_name.clone(),
            synonyms: self.synonyms().into_iter().map(String::from).collect(),
            doc: self.spec.doc.clone(),
            group: self.group.clone(),
            kind: self.kind,
            shape: self.shape,
            positional: self.spec.positional,
            optional: self.optional,
            sensitive: self.spec.sensitive,
            hidden: self.spec.hidden,
            advanced: self.spec.advanced,
            deprecated: self.spec.deprecated,
            taggable: self.accepts_tags,
            min_elements: self.spec.min_elements,
            max_elements: self.spec.max_elements,
            min_value: self.spec.min_value,
            max_value: self.spec.max_value,
            min_recommended: self.spec.min_recommended,
            max_recommended: self.spec.max_recommended,
            mutex: self.spec.mutex.clone(),
            gate: self.gate.clone(),
            defaults: self.defaults.iter().map(|d| d.text.clone()).collect(),
        }
    }
}

/// Read-only view of a descriptor for documentation tooling.
#[derive(Debug, Clone, Serialize)]
pub struct DescriptorSummary {
    pub long_name: String,
    pub synonyms: Vec<String>,
    pub doc: String,
    pub group: String,
    pub kind: ValueKind,
    pub shape: TargetShape,
    pub positional: bool,
    pub optional: bool,
    pub sensitive: bool,
    pub hidden: bool,
    pub advanced: bool,
    pub deprecated: bool,
    pub taggable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_elements: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_elements: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_recommended: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_recommended: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mutex: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gate: Option<Gate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub defaults: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(spec: ArgSpec, defaults: Vec<RenderedValue>) -> ArgumentDescriptor {
        ArgumentDescriptor::new(
            spec,
            TargetShape::Scalar,
            ValueKind::Text,
            false,
            "Tool".to_string(),
            None,
            defaults,
        )
    }

    #[test]
    fn test_synonyms_include_short_and_aliases() {
        let d = descriptor(ArgSpec::new("input").short("I").alias("in"), Vec::new());
        assert_eq!(d.synonyms(), vec!["I", "in"]);
        assert_eq!(d.names(), vec!["input", "I", "in"]);
    }

    #[test]
    fn test_required_with_default_is_optional() {
        let default = RenderedValue {
            text: "x".to_string(),
            tag: None,
        };
        assert!(descriptor(ArgSpec::new("a"), vec![default]).is_optional());
        assert!(!descriptor(ArgSpec::new("b"), Vec::new()).is_optional());
    }

    #[test]
    fn test_positional_has_no_command_line_names() {
        let d = descriptor(ArgSpec::positional("FILES"), Vec::new());
        assert!(d.names().is_empty());
    }
}
