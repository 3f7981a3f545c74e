//! Declarative containers: argument definitions loaded from TOML.
//!
//! ```toml
//! name = "SortReads"
//!
//! [[argument]]
//! name = "input"
//! short = "I"
//! required = true
//! taggable = true
//!
//! [[group]]
//! name = "Filtering"
//!
//! [[group.argument]]
//! name = "min-quality"
//! kind = "integer"
//! default = 20
//! min_value = 0
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::args::{
    ArgSpec, ArgTarget, ArgumentContainer, RenderedValue, Scope, Tag, TaggedValue, TargetShape,
    ValueKind,
};

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Failed to read schema '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse schema: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid schema argument '{argument}': {reason}")]
    InvalidArgument { argument: String, reason: String },
}

fn default_kind() -> ValueKind {
    ValueKind::Text
}

/// One `[[argument]]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArgumentDef {
    pub name: String,
    pub short: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub doc: String,
    #[serde(default = "default_kind")]
    pub kind: ValueKind,
    #[serde(default)]
    pub collection: bool,
    #[serde(default)]
    pub positional: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub taggable: bool,
    #[serde(default)]
    pub sensitive: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub advanced: bool,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub single_use: bool,
    #[serde(default)]
    pub no_file_expansion: bool,
    pub default: Option<toml::Value>,
    pub min_elements: Option<usize>,
    pub max_elements: Option<usize>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub min_recommended: Option<f64>,
    pub max_recommended: Option<f64>,
    #[serde(default)]
    pub mutex: Vec<String>,
}

impl ArgumentDef {
    fn spec(&self) -> ArgSpec {
        let mut spec = if self.positional {
            ArgSpec::positional(&self.name)
        } else {
            ArgSpec::new(&self.name)
        };
        spec.short_name = self.short.clone();
        spec.aliases = self.aliases.clone();
        spec.doc = self.doc.clone();
        spec.optional = !self.required;
        spec.sensitive = self.sensitive;
        spec.hidden = self.hidden;
        spec.advanced = self.advanced;
        spec.deprecated = self.deprecated;
        spec.single_use = self.single_use;
        spec.no_file_expansion = self.no_file_expansion;
        spec.min_elements = self.min_elements;
        spec.max_elements = self.max_elements;
        spec.min_value = self.min_value;
        spec.max_value = self.max_value;
        spec.min_recommended = self.min_recommended;
        spec.max_recommended = self.max_recommended;
        spec.mutex = self.mutex.clone();
        spec
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GroupDef {
    name: String,
    #[serde(default, rename = "argument")]
    arguments: Vec<ArgumentDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaDef {
    name: String,
    #[serde(default, rename = "argument")]
    arguments: Vec<ArgumentDef>,
    #[serde(default, rename = "group")]
    groups: Vec<GroupDef>,
}

/// Storage for one schema-declared argument.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaValue {
    Flag(bool),
    Text(Option<String>),
    Tagged(Option<TaggedValue>),
    Integer(Option<i64>),
    Float(Option<f64>),
    TextList(Vec<String>),
    TaggedList(Vec<TaggedValue>),
    IntegerList(Vec<i64>),
    FloatList(Vec<f64>),
    BooleanList(Vec<bool>),
}

macro_rules! dispatch {
    ($value:expr, $target:ident => $body:expr) => {
        match $value {
            SchemaValue::Flag($target) => $body,
            SchemaValue::Text($target) => $body,
            SchemaValue::Tagged($target) => $body,
            SchemaValue::Integer($target) => $body,
            SchemaValue::Float($target) => $body,
            SchemaValue::TextList($target) => $body,
            SchemaValue::TaggedList($target) => $body,
            SchemaValue::IntegerList($target) => $body,
            SchemaValue::FloatList($target) => $body,
            SchemaValue::BooleanList($target) => $body,
        }
    };
}

impl SchemaValue {
    fn empty(def: &ArgumentDef) -> Result<Self, SchemaError> {
        let invalid = |reason: &str| SchemaError::InvalidArgument {
            argument: def.name.clone(),
            reason: reason.to_string(),
        };
        if def.taggable && def.kind != ValueKind::Text {
            return Err(invalid("only text arguments can be taggable"));
        }
        let collection = def.collection || def.positional;
        Ok(match (def.kind, collection, def.taggable) {
            (ValueKind::Boolean, false, _) => Self::Flag(false),
            (ValueKind::Boolean, true, _) => Self::BooleanList(Vec::new()),
            (ValueKind::Text, false, false) => Self::Text(None),
            (ValueKind::Text, false, true) => Self::Tagged(None),
            (ValueKind::Text, true, false) => Self::TextList(Vec::new()),
            (ValueKind::Text, true, true) => Self::TaggedList(Vec::new()),
            (ValueKind::Integer, false, _) => Self::Integer(None),
            (ValueKind::Integer, true, _) => Self::IntegerList(Vec::new()),
            (ValueKind::Float, false, _) => Self::Float(None),
            (ValueKind::Float, true, _) => Self::FloatList(Vec::new()),
        })
    }

    /// Storage for `def`, pre-populated with its default.
    fn for_definition(def: &ArgumentDef) -> Result<Self, SchemaError> {
        let mut value = Self::empty(def)?;
        let Some(default) = &def.default else {
            return Ok(value);
        };
        let items: Vec<&toml::Value> = match default {
            toml::Value::Array(items) => items.iter().collect(),
            single => vec![single],
        };
        if items.len() > 1 && value.shape() != TargetShape::Collection {
            return Err(SchemaError::InvalidArgument {
                argument: def.name.clone(),
                reason: "only collections can have several default values".to_string(),
            });
        }
        for item in items {
            let raw = match item {
                toml::Value::String(s) => s.clone(),
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                other => {
                    return Err(SchemaError::InvalidArgument {
                        argument: def.name.clone(),
                        reason: format!("unsupported default value {}", other),
                    })
                }
            };
            value
                .push(&raw, None)
                .map_err(|reason| SchemaError::InvalidArgument {
                    argument: def.name.clone(),
                    reason: format!("bad default '{}': {}", raw, reason),
                })?;
        }
        Ok(value)
    }
}

impl ArgTarget for SchemaValue {
    fn shape(&self) -> TargetShape {
        dispatch!(self, t => t.shape())
    }

    fn kind(&self) -> ValueKind {
        dispatch!(self, t => t.kind())
    }

    fn accepts_tags(&self) -> bool {
        dispatch!(self, t => t.accepts_tags())
    }

    fn has_value(&self) -> bool {
        dispatch!(self, t => t.has_value())
    }

    fn len(&self) -> usize {
        dispatch!(self, t => ArgTarget::len(t))
    }

    fn push(&mut self, raw: &str, tag: Option<&Tag>) -> Result<(), String> {
        dispatch!(self, t => ArgTarget::push(t, raw, tag))
    }

    fn clear(&mut self) -> Result<(), String> {
        dispatch!(self, t => ArgTarget::clear(t))
    }

    fn rendered(&self) -> Vec<RenderedValue> {
        dispatch!(self, t => t.rendered())
    }

    fn numbers(&self) -> Vec<f64> {
        dispatch!(self, t => t.numbers())
    }
}

/// A named set of schema arguments.
#[derive(Debug, Clone)]
pub struct SchemaGroup {
    name: String,
    arguments: Vec<(ArgSpec, SchemaValue)>,
}

impl ArgumentContainer for SchemaGroup {
    fn container_name(&self) -> &str {
        &self.name
    }

    fn declare<'a>(&'a mut self, scope: &mut Scope<'a>) {
        for (spec, value) in self.arguments.iter_mut() {
            scope.argument(spec.clone(), value);
        }
    }
}

/// Root container built from a TOML schema.
#[derive(Debug, Clone)]
pub struct SchemaContainer {
    root: SchemaGroup,
    groups: Vec<SchemaGroup>,
}

impl SchemaContainer {
    pub fn from_toml_str(content: &str) -> Result<Self, SchemaError> {
        let def: SchemaDef = toml::from_str(content)?;
        let root = build_group(def.name, &def.arguments)?;
        let groups = def
            .groups
            .into_iter()
            .map(|group| build_group(group.name, &group.arguments))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { root, groups })
    }

    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let content = fs::read_to_string(path).map_err(|e| SchemaError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&content)
    }

    /// Current value of an argument by long name.
    pub fn value(&self, name: &str) -> Option<&SchemaValue> {
        std::iter::once(&self.root)
            .chain(self.groups.iter())
            .flat_map(|group| group.arguments.iter())
            .find(|(spec, _)| spec.long_name == name)
            .map(|(_, value)| value)
    }

    /// Rendered values of every argument, keyed by long name.
    pub fn values(&self) -> BTreeMap<String, Vec<String>> {
        std::iter::once(&self.root)
            .chain(self.groups.iter())
            .flat_map(|group| group.arguments.iter())
            .map(|(spec, value)| {
                let texts = value.rendered().into_iter().map(|r| r.text).collect();
                (spec.long_name.clone(), texts)
            })
            .collect()
    }
}

fn build_group(name: String, defs: &[ArgumentDef]) -> Result<SchemaGroup, SchemaError> {
    let arguments = defs
        .iter()
        .map(|def| Ok((def.spec(), SchemaValue::for_definition(def)?)))
        .collect::<Result<Vec<_>, SchemaError>>()?;
    Ok(SchemaGroup { name, arguments })
}

impl ArgumentContainer for SchemaContainer {
    fn container_name(&self) -> &str {
        &self.root.name
    }

    fn declare<'a>(&'a mut self, scope: &mut Scope<'a>) {
        self.root.declare(scope);
        for group in self.groups.iter_mut() {
            scope.nested(group);
        }
    }
}
