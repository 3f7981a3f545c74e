//! Bindable slots: the typed storage a descriptor writes into.
//!
//! A container hands the parser `&mut` references to its fields; each field
//! type implements [`ArgTarget`]. Plain values (`String`, `i32`, `bool`, ...)
//! always hold a value, `Option<T>` may be null, and `Vec`, `VecDeque`,
//! `HashSet` and `BTreeSet` hold zero or more elements.

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::hash::Hash;
use std::path::PathBuf;

use crate::args::value::{ArgValue, Tag, TaggedValue, ValueKind};

/// Cardinality of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetShape {
    /// Boolean scalar; takes no value token.
    Flag,
    /// Exactly one value.
    Scalar,
    /// Zero or more values.
    Collection,
}

/// One element of a target as it would appear on a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedValue {
    pub text: String,
    pub tag: Option<Tag>,
}

/// A slot the parser can write values into.
pub trait ArgTarget {
    fn shape(&self) -> TargetShape;

    fn kind(&self) -> ValueKind;

    /// Whether elements can carry a tag.
    fn accepts_tags(&self) -> bool;

    /// Non-null scalar, or non-empty collection.
    fn has_value(&self) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bind one raw value. Scalars are replaced, collections grow by one.
    fn push(&mut self, raw: &str, tag: Option<&Tag>) -> Result<(), String>;

    /// Apply the clear instruction.
    fn clear(&mut self) -> Result<(), String>;

    /// Current contents, in a deterministic order.
    fn rendered(&self) -> Vec<RenderedValue>;

    /// Numeric view of the current contents (empty for non-numeric kinds).
    fn numbers(&self) -> Vec<f64>;
}

fn parse_element<T: ArgValue>(raw: &str, tag: Option<&Tag>) -> Result<T, String> {
    let mut value = T::parse_arg(raw)?;
    if let Some(tag) = tag {
        match value.as_taggable_mut() {
            Some(taggable) => taggable.set_tag(tag),
            None => return Err("values of this type cannot be tagged".to_string()),
        }
    }
    Ok(value)
}

fn render_element<T: ArgValue>(value: &T) -> RenderedValue {
    RenderedValue {
        text: value.render_arg(),
        tag: value.as_taggable().and_then(|t| t.tag()),
    }
}

fn scalar_shape(kind: ValueKind) -> TargetShape {
    if kind == ValueKind::Boolean {
        TargetShape::Flag
    } else {
        TargetShape::Scalar
    }
}

impl<T: ArgValue> ArgTarget for Option<T> {
    fn shape(&self) -> TargetShape {
        scalar_shape(T::KIND)
    }

    fn kind(&self) -> ValueKind {
        T::KIND
    }

    fn accepts_tags(&self) -> bool {
        T::TAGGABLE
    }

    fn has_value(&self) -> bool {
        self.is_some()
    }

    fn len(&self) -> usize {
        usize::from(self.is_some())
    }

    fn push(&mut self, raw: &str, tag: Option<&Tag>) -> Result<(), String> {
        *self = Some(parse_element(raw, tag)?);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), String> {
        *self = None;
        Ok(())
    }

    fn rendered(&self) -> Vec<RenderedValue> {
        self.iter().map(render_element).collect()
    }

    fn numbers(&self) -> Vec<f64> {
        self.iter().filter_map(ArgValue::as_f64).collect()
    }
}

macro_rules! plain_target {
    ($($ty:ty),+) => {
        $(
            impl ArgTarget for $ty {
                fn shape(&self) -> TargetShape {
                    scalar_shape(<$ty as ArgValue>::KIND)
                }

                fn kind(&self) -> ValueKind {
                    <$ty as ArgValue>::KIND
                }

                fn accepts_tags(&self) -> bool {
                    <$ty as ArgValue>::TAGGABLE
                }

                fn has_value(&self) -> bool {
                    true
                }

                fn len(&self) -> usize {
                    1
                }

                fn push(&mut self, raw: &str, tag: Option<&Tag>) -> Result<(), String> {
                    *self = parse_element(raw, tag)?;
                    Ok(())
                }

                fn clear(&mut self) -> Result<(), String> {
                    Err("this argument cannot be null".to_string())
                }

                fn rendered(&self) -> Vec<RenderedValue> {
                    vec![render_element(self)]
                }

                fn numbers(&self) -> Vec<f64> {
                    self.as_f64().into_iter().collect()
                }
            }
        )+
    };
}

plain_target!(String, PathBuf, TaggedValue, bool, i32, i64, u32, u64, usize, f32, f64);

macro_rules! collection_target {
    ($coll:ident, $insert:ident, $sorted:expr, $($bound:ident),*) => {
        impl<T: ArgValue $(+ $bound)*> ArgTarget for $coll<T> {
            fn shape(&self) -> TargetShape {
                TargetShape::Collection
            }

            fn kind(&self) -> ValueKind {
                T::KIND
            }

            fn accepts_tags(&self) -> bool {
                T::TAGGABLE
            }

            fn has_value(&self) -> bool {
                !$coll::is_empty(self)
            }

            fn len(&self) -> usize {
                $coll::len(self)
            }

            fn push(&mut self, raw: &str, tag: Option<&Tag>) -> Result<(), String> {
                $coll::$insert(self, parse_element(raw, tag)?);
                Ok(())
            }

            fn clear(&mut self) -> Result<(), String> {
                $coll::clear(self);
                Ok(())
            }

            fn rendered(&self) -> Vec<RenderedValue> {
                let mut values: Vec<RenderedValue> = self.iter().map(render_element).collect();
                if $sorted {
                    values.sort_by(|a, b| a.text.cmp(&b.text).then_with(|| a.tag.cmp(&b.tag)));
                }
                values
            }

            fn numbers(&self) -> Vec<f64> {
                self.iter().filter_map(ArgValue::as_f64).collect()
            }
        }
    };
}

collection_target!(Vec, push, false,);
collection_target!(VecDeque, push_back, false,);
collection_target!(HashSet, insert, true, Eq, Hash);
collection_target!(BTreeSet, insert, false, Ord);
