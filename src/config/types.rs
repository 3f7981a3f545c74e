use serde::{Deserialize, Serialize};

/// How newly supplied values combine with a collection's default contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionMode {
    /// Command-line values replace the defaults entirely.
    #[default]
    Replace,
    /// Command-line values are appended after the defaults.
    Append,
}

/// Parser-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Suffixes that mark a collection value as a list file (e.g. ".list").
    /// An empty list disables list-file expansion.
    #[serde(default = "default_list_extensions")]
    pub list_extensions: Vec<String>,
    /// Merge behavior for collection arguments.
    #[serde(default)]
    pub collection_mode: CollectionMode,
    /// Value that clears a collection (or nullable scalar) instead of binding.
    /// `None` makes every value literal.
    #[serde(default = "default_null_sentinel")]
    pub null_sentinel: Option<String>,
    /// Long name of the argument whose value is a file of further arguments.
    #[serde(default = "default_arguments_file")]
    pub arguments_file: String,
    /// Treat a bare `--` as the end of named arguments.
    #[serde(default = "default_end_of_options")]
    pub end_of_options: bool,
}

fn default_list_extensions() -> Vec<String> {
    vec![".list".to_string(), ".args".to_string()]
}

fn default_null_sentinel() -> Option<String> {
    Some("null".to_string())
}

fn default_arguments_file() -> String {
    "arguments_file".to_string()
}

fn default_end_of_options() -> bool {
    true
}

impl ParserConfig {
    /// Whether `value` names a list file under this configuration.
    pub fn is_list_file(&self, value: &str) -> bool {
        self.list_extensions
            .iter()
            .any(|ext| value.len() > ext.len() && value.ends_with(ext.as_str()))
    }

    /// Whether `value` is the clear instruction.
    pub fn is_null_sentinel(&self, value: &str) -> bool {
        self.null_sentinel.as_deref() == Some(value)
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            list_extensions: default_list_extensions(),
            collection_mode: CollectionMode::default(),
            null_sentinel: default_null_sentinel(),
            arguments_file: default_arguments_file(),
            end_of_options: default_end_of_options(),
        }
    }
}
