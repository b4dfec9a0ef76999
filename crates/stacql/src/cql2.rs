//! CQL2-JSON document model and text rendering.
//!
//! A [`FilterDocument`] is the envelope; [`Node`] is one `{"op", "args"}`
//! object. Field names serialize in the order CQL2 readers expect:
//! `filter-lang`, `filter`, `limit`, `sortby`.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::ser::PrettyFormatter;

use crate::error::Result;
use crate::op::Op;
use crate::sort::SortBy;
use crate::value::Literal;

/// `{"property": name}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyRef {
    pub property: String,
}

impl PropertyRef {
    pub fn new(name: impl Into<String>) -> Self {
        PropertyRef {
            property: name.into(),
        }
    }
}

/// One entry of a node's `args` array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Arg {
    Property(PropertyRef),
    Literal(Literal),
    List(Vec<Literal>),
    Geometry(geojson::Geometry),
    Node(Node),
}

/// An `{"op": ..., "args": [...]}` object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub op: Op,
    pub args: Vec<Arg>,
}

impl Node {
    pub fn new(op: Op, args: Vec<Arg>) -> Self {
        Node { op, args }
    }

    /// `{"op": op, "args": [{"property": name}, value]}`.
    pub fn predicate(op: Op, property: &str, value: Arg) -> Self {
        Node::new(op, vec![Arg::Property(PropertyRef::new(property)), value])
    }

    /// `{"op": "isNull", "args": [{"property": name}]}`.
    pub fn is_null(property: &str) -> Self {
        Node::new(Op::IsNull, vec![Arg::Property(PropertyRef::new(property))])
    }

    /// Logical node over the given children.
    pub fn logical(op: Op, children: Vec<Node>) -> Self {
        Node::new(op, children.into_iter().map(Arg::Node).collect())
    }

    /// `{"op": "not", "args": [inner]}`.
    pub fn not(inner: Node) -> Self {
        Node::new(Op::Not, vec![Arg::Node(inner)])
    }
}

/// The only `filter-lang` this crate writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FilterLang {
    #[serde(rename = "cql2-json")]
    Cql2Json,
}

/// Top-level request body fragment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterDocument {
    #[serde(rename = "filter-lang", skip_serializing_if = "Option::is_none")]
    pub filter_lang: Option<FilterLang>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sortby: Vec<SortBy>,
}

impl FilterDocument {
    /// Renders the document as JSON text.
    pub fn to_json(&self, options: &DumpOptions) -> Result<String> {
        render(self, options)
    }
}

/// Options for assembling and rendering a document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct DumpOptions {
    /// Join top-level arguments with `or` instead of `and`.
    pub top_level_is_or: bool,
    /// Pretty-print with this many spaces per level. Compact when `None`.
    pub indent: Option<usize>,
    /// Emit object keys in lexicographic order.
    pub sort_keys: bool,
}

impl DumpOptions {
    pub fn or() -> Self {
        DumpOptions {
            top_level_is_or: true,
            ..Default::default()
        }
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = Some(indent);
        self
    }

    pub fn with_sorted_keys(mut self) -> Self {
        self.sort_keys = true;
        self
    }
}

/// Serializes any value as JSON text according to `options`.
pub(crate) fn render<T: Serialize>(value: &T, options: &DumpOptions) -> Result<String> {
    if options.sort_keys {
        let tree = serde_json::to_value(value)?;
        write_text(&SortedKeys(&tree), options.indent)
    } else {
        write_text(value, options.indent)
    }
}

fn write_text<T: Serialize + ?Sized>(value: &T, indent: Option<usize>) -> Result<String> {
    match indent {
        None => Ok(serde_json::to_string(value)?),
        Some(width) => {
            let spaces = vec![b' '; width];
            let mut out = Vec::new();
            let mut ser = serde_json::Serializer::with_formatter(
                &mut out,
                PrettyFormatter::with_indent(&spaces),
            );
            value.serialize(&mut ser)?;
            // serde_json only writes valid UTF-8
            Ok(String::from_utf8_lossy(&out).into_owned())
        }
    }
}

/// Serializes a JSON tree with object keys in sorted order, regardless of
/// how `serde_json::Map` orders them.
struct SortedKeys<'a>(&'a serde_json::Value);

impl Serialize for SortedKeys<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::{SerializeMap, SerializeSeq};
        use serde_json::Value;

        match self.0 {
            Value::Object(map) => {
                let mut entries: Vec<_> = map.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));
                let mut out = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    out.serialize_entry(key, &SortedKeys(value))?;
                }
                out.end()
            }
            Value::Array(items) => {
                let mut out = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    out.serialize_element(&SortedKeys(item))?;
                }
                out.end()
            }
            other => other.serialize(serializer),
        }
    }
}
