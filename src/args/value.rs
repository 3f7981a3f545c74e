//! Value conversion: raw token → typed element.

use std::collections::BTreeMap;
use std::path::PathBuf;

/// Broad type category of a bindable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Text,
    Integer,
    Float,
    Boolean,
}

impl ValueKind {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }

    /// Placeholder used in usage synopses.
    pub fn placeholder(&self) -> &'static str {
        match self {
            Self::Text => "<TEXT>",
            Self::Integer => "<INTEGER>",
            Self::Float => "<FLOAT>",
            Self::Boolean => "<BOOLEAN>",
        }
    }
}

/// Tag attached to one occurrence of an argument: `--name:tag,key=value`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag {
    pub name: Option<String>,
    pub attributes: BTreeMap<String, String>,
}

impl Tag {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.attributes.is_empty()
    }

    /// Render as the suffix of a name token (`:tag,key=value`), attributes sorted by key.
    pub fn render(&self) -> String {
        let mut parts = Vec::with_capacity(self.attributes.len() + 1);
        if let Some(name) = &self.name {
            parts.push(name.clone());
        }
        for (key, value) in &self.attributes {
            parts.push(format!("{}={}", key, value));
        }
        format!(":{}", parts.join(","))
    }
}

/// Capability for element types that can carry a [`Tag`].
pub trait Taggable {
    fn tag_name(&self) -> Option<&str>;
    fn set_tag_name(&mut self, name: Option<String>);
    fn tag_attributes(&self) -> &BTreeMap<String, String>;
    fn set_tag_attributes(&mut self, attributes: BTreeMap<String, String>);

    fn tag(&self) -> Option<Tag> {
        let tag = Tag {
            name: self.tag_name().map(String::from),
            attributes: self.tag_attributes().clone(),
        };
        (!tag.is_empty()).then_some(tag)
    }

    fn set_tag(&mut self, tag: &Tag) {
        self.set_tag_name(tag.name.clone());
        self.set_tag_attributes(tag.attributes.clone());
    }
}

/// A string value that accepts a tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaggedValue {
    raw_value: String,
    tag_name: Option<String>,
    attributes: BTreeMap<String, String>,
}

impl TaggedValue {
    pub fn new(raw_value: impl Into<String>) -> Self {
        Self {
            raw_value: raw_value.into(),
            tag_name: None,
            attributes: BTreeMap::new(),
        }
    }

    pub fn raw_value(&self) -> &str {
        &self.raw_value
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

impl Taggable for TaggedValue {
    fn tag_name(&self) -> Option<&str> {
        self.tag_name.as_deref()
    }

    fn set_tag_name(&mut self, name: Option<String>) {
        self.tag_name = name;
    }

    fn tag_attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    fn set_tag_attributes(&mut self, attributes: BTreeMap<String, String>) {
        self.attributes = attributes;
    }
}

/// An element type that can be parsed from one command-line token.
///
/// Types opt into tagging by overriding [`ArgValue::TAGGABLE`] and the two
/// `as_taggable` accessors.
pub trait ArgValue: Sized {
    const KIND: ValueKind;
    const TAGGABLE: bool = false;

    fn parse_arg(raw: &str) -> Result<Self, String>;

    fn render_arg(&self) -> String;

    fn as_f64(&self) -> Option<f64> {
        None
    }

    fn as_taggable(&self) -> Option<&dyn Taggable> {
        None
    }

    fn as_taggable_mut(&mut self) -> Option<&mut dyn Taggable> {
        None
    }
}

impl ArgValue for String {
    const KIND: ValueKind = ValueKind::Text;

    fn parse_arg(raw: &str) -> Result<Self, String> {
        Ok(raw.to_string())
    }

    fn render_arg(&self) -> String {
        self.clone()
    }
}

impl ArgValue for PathBuf {
    const KIND: ValueKind = ValueKind::Text;

    fn parse_arg(raw: &str) -> Result<Self, String> {
        Ok(PathBuf::from(raw))
    }

    fn render_arg(&self) -> String {
        self.to_string_lossy().into_owned()
    }
}

impl ArgValue for TaggedValue {
    const KIND: ValueKind = ValueKind::Text;
    const TAGGABLE: bool = true;

    fn parse_arg(raw: &str) -> Result<Self, String> {
        Ok(TaggedValue::new(raw))
    }

    fn render_arg(&self) -> String {
        self.raw_value.clone()
    }

    fn as_taggable(&self) -> Option<&dyn Taggable> {
        Some(self)
    }

    fn as_taggable_mut(&mut self) -> Option<&mut dyn Taggable> {
        Some(self)
    }
}

impl ArgValue for bool {
    const KIND: ValueKind = ValueKind::Boolean;

    fn parse_arg(raw: &str) -> Result<Self, String> {
        parse_bool(raw).ok_or_else(|| "expected 'true' or 'false'".to_string())
    }

    fn render_arg(&self) -> String {
        self.to_string()
    }
}

/// Boolean literal recognition shared by flags and boolean values.
pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

macro_rules! numeric_value {
    ($kind:expr, $label:literal, $($ty:ty),+) => {
        $(
            impl ArgValue for $ty {
                const KIND: ValueKind = $kind;

                fn parse_arg(raw: &str) -> Result<Self, String> {
                    raw.trim()
                        .parse::<$ty>()
                        .map_err(|e| format!("expected {}: {}", $label, e))
                }

                fn render_arg(&self) -> String {
                    self.to_string()
                }

                fn as_f64(&self) -> Option<f64> {
                    Some(*self as f64)
                }
            }
        )+
    };
}

numeric_value!(ValueKind::Integer, "an integer", i32, i64, u32, u64, usize);
numeric_value!(ValueKind::Float, "a number", f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_render_sorts_attributes() {
        let mut tag = Tag {
            name: Some("tumor".to_string()),
            attributes: BTreeMap::new(),
        };
        tag.attributes.insert("z".to_string(), "1".to_string());
        tag.attributes.insert("a".to_string(), "x=y".to_string());
        assert_eq!(tag.render(), ":tumor,a=x=y,z=1");
    }

    #[test]
    fn test_tag_render_without_name() {
        let mut tag = Tag::default();
        tag.attributes.insert("k".to_string(), "v".to_string());
        assert_eq!(tag.render(), ":k=v");
    }

    #[test]
    fn test_numeric_parse_error_mentions_type() {
        let err = i32::parse_arg("abc").unwrap_err();
        assert!(err.contains("integer"));
        assert_eq!(f64::parse_arg("2.5").unwrap().as_f64(), Some(2.5));
    }

    #[test]
    fn test_bool_literals_are_case_insensitive() {
        assert_eq!(bool::parse_arg("TRUE"), Ok(true));
        assert_eq!(bool::parse_arg("False"), Ok(false));
        assert!(bool::parse_arg("yes").is_err());
    }

    #[test]
    fn test_tagged_value_roundtrips_tag() {
        let mut value = TaggedValue::new("tumor.bam");
        let mut tag = Tag {
            name: Some("ScalarTag".to_string()),
            attributes: BTreeMap::new(),
        };
        tag.attributes.insert("aScalar".to_string(), "27".to_string());
        value.set_tag(&tag);
        assert_eq!(value.tag(), Some(tag));
        assert_eq!(value.attribute("aScalar"), Some("27"));
    }
}
