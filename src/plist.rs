//! Property-list reading
//!
//! Parses the XML property-list dialect used by sprite-packing tools into a
//! [`Value`] tree. Only the element kinds a sprite-sheet manifest needs are
//! understood (`string`, `true`, `false`, `real`, `integer`, `dict`, `array`).
//!
//! Navigation on a [`Value`] never fails: a missing key, an out-of-range index
//! or a type mismatch yields [`Value::Null`] or a zero value, so optional
//! manifest fields can be read without ceremony.

use crate::diagnostics::Warning;
use std::collections::BTreeMap;
use std::ops::Index;
use thiserror::Error;

/// Shared `Null` returned by lookups that miss.
static NULL: Value = Value::Null;

/// Error type for markup that is not well-formed.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("malformed plist markup: {message}")]
pub struct ParseError {
    pub message: String,
}

/// A node of a parsed property list.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    String(String),
    Boolean(bool),
    Real(f64),
    Integer(i64),
    Dict(BTreeMap<String, Value>),
    Array(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Look up `key` in a dict. Returns `Null` for non-dicts and missing keys.
    pub fn get(&self, key: &str) -> &Value {
        match self {
            Value::Dict(map) => map.get(key).unwrap_or(&NULL),
            _ => &NULL,
        }
    }

    /// Look up `index` in an array. Returns `Null` for non-arrays and out-of-range indices.
    pub fn at(&self, index: usize) -> &Value {
        match self {
            Value::Array(items) => items.get(index).unwrap_or(&NULL),
            _ => &NULL,
        }
    }

    /// String content, or `""` for any other variant.
    pub fn as_str(&self) -> &str {
        match self {
            Value::String(s) => s,
            _ => "",
        }
    }

    /// Integer content, or `0` for any other variant.
    pub fn as_int(&self) -> i64 {
        match self {
            Value::Integer(i) => *i,
            _ => 0,
        }
    }

    /// Real content, or `0.0` for any other variant.
    pub fn as_real(&self) -> f64 {
        match self {
            Value::Real(r) => *r,
            _ => 0.0,
        }
    }

    /// Boolean content, or `false` for any other variant.
    pub fn as_bool(&self) -> bool {
        match self {
            Value::Boolean(b) => *b,
            _ => false,
        }
    }

    /// Number of entries of an array or dict; 0 for everything else.
    pub fn count(&self) -> usize {
        match self {
            Value::Array(items) => items.len(),
            Value::Dict(map) => map.len(),
            _ => 0,
        }
    }

    /// Iterate the entries of a dict in key order. Empty for other variants.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        let map = match self {
            Value::Dict(map) => Some(map),
            _ => None,
        };
        map.into_iter().flat_map(|m| m.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// Iterate the items of an array. Empty for other variants.
    pub fn items(&self) -> std::slice::Iter<'_, Value> {
        match self {
            Value::Array(items) => items.iter(),
            _ => <&[Value]>::default().iter(),
        }
    }
}

impl Index<&str> for Value {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        self.get(key)
    }
}

impl Index<usize> for Value {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        self.at(index)
    }
}

/// A parsed property list together with the problems skipped while reading it.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub root: Value,
    pub warnings: Vec<Warning>,
}

/// Parse property-list markup.
///
/// The meaningful root is the first child element of the `<plist>` document
/// element. Unknown elements and unparsable numbers become `Null` and are
/// recorded in [`Document::warnings`]; only markup that is not well-formed XML
/// is an error.
pub fn parse(text: &str) -> Result<Document, ParseError> {
    let options = roxmltree::ParsingOptions { allow_dtd: true, ..Default::default() };
    let xml = roxmltree::Document::parse_with_options(text, options)
        .map_err(|e| ParseError { message: e.to_string() })?;

    let mut warnings = Vec::new();
    let root = match xml.root_element().children().find(|n| n.is_element()) {
        Some(node) => decode_node(node, &mut warnings),
        None => Value::Null,
    };

    Ok(Document { root, warnings })
}

fn decode_node(node: roxmltree::Node<'_, '_>, warnings: &mut Vec<Warning>) -> Value {
    let tag = node.tag_name().name();
    match tag {
        "string" => Value::String(inner_text(node)),
        "true" => Value::Boolean(true),
        "false" => Value::Boolean(false),
        "real" => {
            let text = inner_text(node);
            match text.trim().parse::<f64>() {
                Ok(r) => Value::Real(r),
                Err(_) => {
                    warnings.push(Warning::new(format!("invalid real '{}'", text.trim())));
                    Value::Null
                }
            }
        }
        "integer" => {
            let text = inner_text(node);
            match text.trim().parse::<i64>() {
                Ok(i) => Value::Integer(i),
                Err(_) => {
                    warnings.push(Warning::new(format!("invalid integer '{}'", text.trim())));
                    Value::Null
                }
            }
        }
        "dict" => decode_dict(node, warnings),
        "array" => Value::Array(
            node.children().filter(|n| n.is_element()).map(|n| decode_node(n, warnings)).collect(),
        ),
        _ => {
            warnings.push(Warning::new(format!("unsupported element <{}>", tag)));
            Value::Null
        }
    }
}

/// Pair every `<key>` with the element that immediately follows it.
fn decode_dict(node: roxmltree::Node<'_, '_>, warnings: &mut Vec<Warning>) -> Value {
    let mut map = BTreeMap::new();
    let mut children = node.children().filter(|n| n.is_element()).peekable();

    while let Some(child) = children.next() {
        if child.tag_name().name() != "key" {
            warnings.push(Warning::new(format!(
                "<{}> inside <dict> without a preceding <key>",
                child.tag_name().name()
            )));
            continue;
        }

        let key = inner_text(child);
        let value = match children.next_if(|n| n.tag_name().name() != "key") {
            Some(value_node) => decode_node(value_node, warnings),
            None => {
                warnings.push(Warning::new(format!("key '{}' has no value", key)));
                Value::Null
            }
        };
        map.insert(key, value);
    }

    Value::Dict(map)
}

fn inner_text(node: roxmltree::Node<'_, '_>) -> String {
    node.descendants().filter(|n| n.is_text()).filter_map(|n| n.text()).collect()
}
